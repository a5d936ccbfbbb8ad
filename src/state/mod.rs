mod catalog;
mod persistence;

pub use catalog::{FoodCatalog, FoodContext, FoodSource, ResolvedFood};
pub use persistence::{
    bulk_update_pairs, load_catalog, load_request, save_response, write_updates_csv, FileCatalog,
    RowUpdate,
};
