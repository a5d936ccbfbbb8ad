pub mod food;
pub mod ingredient;
pub mod lenient;
pub mod macros;
pub mod outcome;
pub mod request;

pub use food::{FoodGroup, FoodId, FoodNutrition, UnitKind};
pub use ingredient::{IngredientIdentity, IngredientInput, MacroRole};
pub use macros::{MacroTargets, Macros};
pub use outcome::{
    BalanceOutcome, BalanceReport, BalanceResponse, BalancedIngredient, RecipeOutcome,
    RecipeResult, RequestShape,
};
pub use request::{
    referenced_food_ids, BalanceOptions, BalanceRequest, IngredientLine, RawIngredient, RawRecipe,
    RecipeLines,
};
