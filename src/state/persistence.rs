use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{BalanceError, Result};
use crate::models::lenient::parse_f64;
use crate::models::{
    BalanceRequest, BalanceResponse, BalancedIngredient, FoodGroup, FoodId, FoodNutrition,
    MacroRole, UnitKind,
};
use crate::state::catalog::{FoodCatalog, FoodContext, FoodSource};

/// JSON catalog: either `{"foods": [...]}` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Wrapped { foods: Vec<FoodNutrition> },
    Bare(Vec<FoodNutrition>),
}

/// One CSV catalog row. Columns: id,name,protein,carbs,fat,unit,role,groups
/// with groups written as `id:name;id:name`.
#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    protein: String,
    #[serde(default)]
    carbs: String,
    #[serde(default)]
    fat: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    groups: String,
}

fn parse_groups(field: &str, food_id: FoodId) -> Vec<FoodGroup> {
    field
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let parsed = part.split_once(':').and_then(|(id, name)| {
                let id = id.trim().parse().ok()?;
                Some(FoodGroup::new(id, name.trim()))
            });
            if parsed.is_none() {
                warn!(food_id, group = part, "skipping malformed group link");
            }
            parsed
        })
        .collect()
}

impl CatalogRow {
    fn into_food(self, line: usize) -> Result<FoodNutrition> {
        let id = self.id.trim().parse().map_err(|_| {
            BalanceError::InvalidInput(format!("catalog row {}: invalid food id '{}'", line, self.id))
        })?;
        let role = self.role.trim();
        Ok(FoodNutrition {
            id,
            name: self.name,
            protein: parse_f64(&self.protein),
            carbs: parse_f64(&self.carbs),
            fat: parse_f64(&self.fat),
            unit: UnitKind::from_label(&self.unit),
            role: (!role.is_empty()).then(|| MacroRole::from_tag(role)),
            groups: parse_groups(&self.groups, id),
        })
    }
}

fn load_catalog_csv(path: &Path) -> Result<Vec<FoodNutrition>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut foods = Vec::new();
    for (i, row) in rdr.deserialize::<CatalogRow>().enumerate() {
        // Header is line 1.
        foods.push(row?.into_food(i + 2)?);
    }
    Ok(foods)
}

fn load_catalog_json(path: &Path) -> Result<Vec<FoodNutrition>> {
    let content = fs::read_to_string(path)?;
    let file: CatalogFile = serde_json::from_str(&content)?;
    Ok(match file {
        CatalogFile::Wrapped { foods } | CatalogFile::Bare(foods) => foods,
    })
}

/// Load a food catalog from a `.csv` file or a JSON file.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<FoodCatalog> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let foods = if is_csv {
        load_catalog_csv(path)?
    } else {
        load_catalog_json(path)?
    };
    Ok(FoodCatalog::new(foods))
}

/// A catalog file read at lookup time.
///
/// Any failure to read it is a lookup failure and aborts the request.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl FoodSource for FileCatalog {
    fn lookup(&self, ids: &BTreeSet<FoodId>) -> Result<FoodContext> {
        let catalog = load_catalog(&self.path).map_err(|e| {
            BalanceError::FoodLookup(format!("{}: {}", self.path.display(), e))
        })?;
        catalog.lookup(ids)
    }
}

/// Load a balance request from a JSON file.
pub fn load_request<P: AsRef<Path>>(path: P) -> Result<BalanceRequest> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write a response as pretty JSON.
pub fn save_response<P: AsRef<Path>>(path: P, response: &BalanceResponse) -> Result<()> {
    let json = serde_json::to_string_pretty(response)?;
    fs::write(path, json)?;
    Ok(())
}

/// One row of the bulk update handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowUpdate {
    /// `ingredient_row` when `id` is an ingredient row id, `food` otherwise.
    pub key: &'static str,
    pub id: i64,
    pub recipe_id: Option<i64>,
    pub grams: f64,
}

/// Flat (identifier, grams) pairs for a bulk update.
pub fn bulk_update_pairs(balanced: &[BalancedIngredient]) -> Vec<RowUpdate> {
    balanced
        .iter()
        .map(|b| match b.ingredient_row_id {
            Some(row_id) => RowUpdate {
                key: "ingredient_row",
                id: row_id,
                recipe_id: b.recipe_id,
                grams: b.grams,
            },
            None => RowUpdate {
                key: "food",
                id: b.food_id,
                recipe_id: b.recipe_id,
                grams: b.grams,
            },
        })
        .collect()
}

/// Write bulk-update rows to a CSV file.
pub fn write_updates_csv<P: AsRef<Path>>(path: P, updates: &[RowUpdate]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for update in updates {
        wtr.serialize(update)?;
    }
    wtr.flush()?;
    Ok(())
}
