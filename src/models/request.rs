//! Request shapes accepted by the balancer and their normalization.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::balancer::config::Profile;
use crate::error::{BalanceError, Result};
use crate::models::food::FoodId;
use crate::models::ingredient::{IngredientIdentity, MacroRole};
use crate::models::lenient::{coerce_bool, coerce_f64, coerce_id, coerce_opt_f64, de_opt_count, de_opt_f64};
use crate::models::macros::Macros;
use crate::models::outcome::RequestShape;

/// Optional tuning passed with a request (or from the command line).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,

    #[serde(
        default,
        alias = "step_grams",
        deserialize_with = "de_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub step_grams: Option<f64>,

    #[serde(
        default,
        alias = "max_iterations",
        deserialize_with = "de_opt_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_iterations: Option<usize>,
}

impl BalanceOptions {
    /// Fields set on `self` win over those on `base`.
    pub fn overriding(&self, base: &BalanceOptions) -> BalanceOptions {
        BalanceOptions {
            profile: self.profile.or(base.profile),
            step_grams: self.step_grams.or(base.step_grams),
            max_iterations: self.max_iterations.or(base.max_iterations),
        }
    }
}

/// One ingredient as sent by a caller, before normalization.
///
/// Field names vary between callers (`quantity` vs `grams`, flat `food_id`
/// vs a nested `food` reference), so everything is accepted loosely here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIngredient {
    #[serde(default, alias = "foodId")]
    pub food_id: Option<Value>,

    /// Nested food reference: `{"id": 12}` or a bare id.
    #[serde(default)]
    pub food: Option<Value>,

    #[serde(default)]
    pub quantity: Option<Value>,

    #[serde(default)]
    pub grams: Option<Value>,

    #[serde(default)]
    pub locked: Option<Value>,

    #[serde(default, alias = "minQty")]
    pub min_qty: Option<Value>,

    #[serde(default, alias = "maxQty")]
    pub max_qty: Option<Value>,

    #[serde(default, alias = "groupName")]
    pub group_name: Option<String>,

    #[serde(default, alias = "macroRole", alias = "role")]
    pub macro_role: Option<String>,

    #[serde(default, alias = "id", alias = "ingredientRowId")]
    pub ingredient_row_id: Option<Value>,

    #[serde(default, alias = "recipeId")]
    pub recipe_id: Option<Value>,

    #[serde(default, alias = "isPrivate")]
    pub is_private: Option<Value>,
}

/// A normalized recipe line; nutrition is attached later from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientLine {
    pub food_id: FoodId,
    pub quantity: f64,
    pub locked: bool,
    pub min_qty: Option<f64>,
    pub max_qty: Option<f64>,
    pub group_name: Option<String>,
    pub macro_role: Option<MacroRole>,
    pub identity: IngredientIdentity,
}

impl RawIngredient {
    fn food_ref(&self) -> Option<FoodId> {
        if let Some(id) = self.food_id.as_ref().and_then(coerce_id) {
            return Some(id);
        }
        match self.food.as_ref()? {
            Value::Object(map) => map
                .get("id")
                .or_else(|| map.get("food_id"))
                .and_then(coerce_id),
            other => coerce_id(other),
        }
    }

    /// Normalize into an [`IngredientLine`]. `position` is only used for
    /// error messages.
    pub fn normalize(&self, position: usize) -> Result<IngredientLine> {
        let food_id = self.food_ref().ok_or_else(|| {
            BalanceError::InvalidInput(format!("ingredient {} has no food reference", position))
        })?;

        let quantity = self
            .quantity
            .as_ref()
            .filter(|v| !v.is_null())
            .or(self.grams.as_ref())
            .map(coerce_f64)
            .unwrap_or(0.0)
            .max(0.0);

        Ok(IngredientLine {
            food_id,
            quantity,
            locked: self.locked.as_ref().is_some_and(coerce_bool),
            min_qty: coerce_opt_f64(self.min_qty.as_ref()).map(|v| v.max(0.0)),
            max_qty: coerce_opt_f64(self.max_qty.as_ref()).map(|v| v.max(0.0)),
            group_name: self
                .group_name
                .as_ref()
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty()),
            macro_role: self
                .macro_role
                .as_deref()
                .filter(|r| !r.trim().is_empty())
                .map(MacroRole::from_tag),
            identity: IngredientIdentity {
                ingredient_row_id: self.ingredient_row_id.as_ref().and_then(coerce_id),
                recipe_id: self.recipe_id.as_ref().and_then(coerce_id),
                is_private: self
                    .is_private
                    .as_ref()
                    .filter(|v| !v.is_null())
                    .map(coerce_bool),
            },
        })
    }
}

/// One recipe inside a batch request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecipe {
    #[serde(default, alias = "recipeId")]
    pub recipe_id: Option<Value>,

    #[serde(default, alias = "isPrivate")]
    pub is_private: Option<Value>,

    #[serde(default)]
    pub ingredients: Vec<RawIngredient>,
}

/// Either a single ingredient list or a batch of recipes sharing one target.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BalanceRequest {
    Batch {
        recipes: Vec<RawRecipe>,
        #[serde(default)]
        targets: Option<Macros>,
        #[serde(default)]
        options: Option<BalanceOptions>,
    },
    Single {
        ingredients: Vec<RawIngredient>,
        #[serde(default)]
        targets: Option<Macros>,
        #[serde(default)]
        options: Option<BalanceOptions>,
    },
}

/// Normalized lines of one recipe plus the identity it is reported under.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeLines {
    pub recipe_id: Option<i64>,
    pub is_private: Option<bool>,
    pub lines: Vec<IngredientLine>,
}

impl RecipeLines {
    pub fn food_ids(&self) -> impl Iterator<Item = FoodId> + '_ {
        self.lines.iter().map(|l| l.food_id)
    }
}

impl BalanceRequest {
    pub fn shape(&self) -> RequestShape {
        match self {
            BalanceRequest::Batch { .. } => RequestShape::Batch,
            BalanceRequest::Single { .. } => RequestShape::Single,
        }
    }

    /// The shared macro target; a request without one is rejected.
    pub fn targets(&self) -> Result<Macros> {
        let targets = match self {
            BalanceRequest::Batch { targets, .. } | BalanceRequest::Single { targets, .. } => {
                targets
            }
        };
        targets.ok_or(BalanceError::MissingTargets)
    }

    pub fn options(&self) -> BalanceOptions {
        match self {
            BalanceRequest::Batch { options, .. } | BalanceRequest::Single { options, .. } => {
                options.clone().unwrap_or_default()
            }
        }
    }

    /// Validate and normalize every recipe in the request.
    ///
    /// A single request with no ingredients, or a batch where no recipe has
    /// any, is rejected. Batch lines inherit their recipe's identity when
    /// they carry none of their own.
    pub fn normalize(&self) -> Result<Vec<RecipeLines>> {
        match self {
            BalanceRequest::Single { ingredients, .. } => {
                if ingredients.is_empty() {
                    return Err(BalanceError::EmptyIngredients);
                }
                let lines = normalize_lines(ingredients)?;
                Ok(vec![RecipeLines {
                    recipe_id: None,
                    is_private: None,
                    lines,
                }])
            }
            BalanceRequest::Batch { recipes, .. } => {
                if recipes.iter().all(|r| r.ingredients.is_empty()) {
                    return Err(BalanceError::EmptyIngredients);
                }
                recipes
                    .iter()
                    .map(|recipe| {
                        let recipe_id = recipe.recipe_id.as_ref().and_then(coerce_id);
                        let is_private = recipe
                            .is_private
                            .as_ref()
                            .filter(|v| !v.is_null())
                            .map(coerce_bool);
                        let mut lines = normalize_lines(&recipe.ingredients)?;
                        for line in &mut lines {
                            line.identity.recipe_id = line.identity.recipe_id.or(recipe_id);
                            line.identity.is_private = line.identity.is_private.or(is_private);
                        }
                        Ok(RecipeLines {
                            recipe_id,
                            is_private,
                            lines,
                        })
                    })
                    .collect()
            }
        }
    }
}

fn normalize_lines(ingredients: &[RawIngredient]) -> Result<Vec<IngredientLine>> {
    ingredients
        .iter()
        .enumerate()
        .map(|(i, raw)| raw.normalize(i))
        .collect()
}

/// Union of food ids referenced by all recipes.
pub fn referenced_food_ids(recipes: &[RecipeLines]) -> BTreeSet<FoodId> {
    recipes.iter().flat_map(|r| r.food_ids()).collect()
}
