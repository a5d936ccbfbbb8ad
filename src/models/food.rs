use serde::{Deserialize, Serialize};

use crate::models::ingredient::MacroRole;
use crate::models::lenient::{de_f64, de_id};
use crate::models::macros::Macros;

/// Catalog identifier of a food.
pub type FoodId = i64;

/// How a food's quantity is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UnitKind {
    /// Continuous grams; densities are per 100 g.
    #[default]
    Grams,
    /// Discrete units (eggs, slices, pieces); densities are per unit.
    Units,
}

impl UnitKind {
    /// Interpret a catalog unit label. Anything not unit-like is grams.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "unit" | "units" | "piece" | "pieces" | "pc" | "pcs" | "each" | "ud" | "uds" => {
                UnitKind::Units
            }
            _ => UnitKind::Grams,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UnitKind::Grams => "g",
            UnitKind::Units => "unit",
        }
    }

    /// Divisor turning a catalog density into a per-gram or per-unit amount.
    pub fn density_divisor(self) -> f64 {
        match self {
            UnitKind::Grams => 100.0,
            UnitKind::Units => 1.0,
        }
    }
}

impl From<String> for UnitKind {
    fn from(label: String) -> Self {
        UnitKind::from_label(&label)
    }
}

impl From<UnitKind> for String {
    fn from(kind: UnitKind) -> Self {
        kind.label().to_string()
    }
}

/// A classification group linked to a food.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodGroup {
    #[serde(deserialize_with = "de_id")]
    pub id: i64,
    pub name: String,
}

impl FoodGroup {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

/// Nutrition facts and group links for one catalog food.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodNutrition {
    #[serde(alias = "food_id", deserialize_with = "de_id")]
    pub id: FoodId,

    #[serde(default)]
    pub name: String,

    /// Protein per 100 g (grams foods) or per unit (unit foods).
    #[serde(default, alias = "proteins", deserialize_with = "de_f64")]
    pub protein: f64,

    #[serde(default, alias = "carbohydrates", deserialize_with = "de_f64")]
    pub carbs: f64,

    #[serde(default, alias = "fats", deserialize_with = "de_f64")]
    pub fat: f64,

    #[serde(default)]
    pub unit: UnitKind,

    /// Default macro role when a recipe line does not specify one.
    #[serde(default, alias = "macro_role", skip_serializing_if = "Option::is_none")]
    pub role: Option<MacroRole>,

    #[serde(default)]
    pub groups: Vec<FoodGroup>,
}

impl FoodNutrition {
    /// Macro density as stored in the catalog.
    pub fn density(&self) -> Macros {
        Macros::new(self.protein, self.carbs, self.fat).sanitized()
    }

    /// Debug string for logging.
    pub fn debug_string(&self) -> String {
        format!(
            "#{} {}: P:{} C:{} F:{} per {}",
            self.id,
            self.name,
            self.protein,
            self.carbs,
            self.fat,
            match self.unit {
                UnitKind::Grams => "100g",
                UnitKind::Units => "unit",
            }
        )
    }
}
