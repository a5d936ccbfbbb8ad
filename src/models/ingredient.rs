use serde::{Deserialize, Serialize};

use crate::models::food::{FoodId, UnitKind};
use crate::models::macros::Macros;

/// Coarse nutritional function of an ingredient within a recipe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MacroRole {
    Protein,
    Carb,
    Fat,
    #[default]
    Mixed,
}

impl MacroRole {
    /// Parse a role tag. Unknown tags are `Mixed`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "protein" | "proteins" => MacroRole::Protein,
            "carb" | "carbs" | "carbohydrate" | "carbohydrates" => MacroRole::Carb,
            "fat" | "fats" => MacroRole::Fat,
            _ => MacroRole::Mixed,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            MacroRole::Protein => "protein",
            MacroRole::Carb => "carb",
            MacroRole::Fat => "fat",
            MacroRole::Mixed => "mixed",
        }
    }
}

impl From<String> for MacroRole {
    fn from(tag: String) -> Self {
        MacroRole::from_tag(&tag)
    }
}

impl From<MacroRole> for String {
    fn from(role: MacroRole) -> Self {
        role.tag().to_string()
    }
}

/// Fields that tie a balanced line back to its source row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngredientIdentity {
    pub ingredient_row_id: Option<i64>,
    pub recipe_id: Option<i64>,
    pub is_private: Option<bool>,
}

/// One recipe line ready for model building: request fields plus the
/// food's nutrition and resolved group.
#[derive(Debug, Clone)]
pub struct IngredientInput {
    pub food_id: FoodId,
    /// Current quantity in grams or units.
    pub quantity: f64,
    pub locked: bool,
    pub min_qty: Option<f64>,
    pub max_qty: Option<f64>,
    pub role: MacroRole,
    /// Resolved food-group name, `None` when the food is ungrouped.
    pub group_name: Option<String>,
    /// Macros per 100 g for grams foods, per unit for unit foods.
    pub density: Macros,
    pub unit: UnitKind,
    pub identity: IngredientIdentity,
}

impl IngredientInput {
    /// A grams-based, unlocked, unbounded input. Mostly useful in tests.
    pub fn grams(food_id: FoodId, quantity: f64, role: MacroRole, density: Macros) -> Self {
        Self {
            food_id,
            quantity,
            locked: false,
            min_qty: None,
            max_qty: None,
            role,
            group_name: None,
            density,
            unit: UnitKind::Grams,
            identity: IngredientIdentity::default(),
        }
    }

    pub fn with_group(mut self, group_name: &str) -> Self {
        self.group_name = Some(group_name.to_string());
        self
    }

    pub fn with_unit(mut self, unit: UnitKind) -> Self {
        self.unit = unit;
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn with_bounds(mut self, min_qty: Option<f64>, max_qty: Option<f64>) -> Self {
        self.min_qty = min_qty;
        self.max_qty = max_qty;
        self
    }
}
