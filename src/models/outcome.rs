use serde::Serialize;

use crate::models::food::FoodId;
use crate::models::macros::Macros;

/// One balanced ingredient line.
///
/// `quantity` and `grams` always hold the same value; callers read either.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalancedIngredient {
    pub food_id: FoodId,
    pub quantity: f64,
    pub grams: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredient_row_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
}

/// Result of balancing one ingredient list.
#[derive(Debug, Clone, Default)]
pub struct BalanceOutcome {
    pub ingredients: Vec<BalancedIngredient>,
    /// Optimizer passes that applied a move.
    pub iterations: usize,
    pub converged: bool,
    /// Macro totals of the emitted quantities.
    pub totals: Macros,
}

/// Which request shape produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    Single,
    Batch,
}

/// A balanced recipe tagged with its identity.
#[derive(Debug, Clone)]
pub struct RecipeOutcome {
    pub recipe_id: Option<i64>,
    pub is_private: Option<bool>,
    pub outcome: BalanceOutcome,
}

/// Everything produced by one orchestrated call.
#[derive(Debug, Clone)]
pub struct BalanceReport {
    pub shape: RequestShape,
    pub targets: Macros,
    pub recipes: Vec<RecipeOutcome>,
}

/// Wire shape of a batch entry.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeResult {
    pub recipe_id: Option<i64>,
    pub is_private: Option<bool>,
    #[serde(rename = "balancedIngredients")]
    pub balanced_ingredients: Vec<BalancedIngredient>,
}

/// Wire shape returned to callers.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BalanceResponse {
    Single {
        #[serde(rename = "balancedIngredients")]
        balanced_ingredients: Vec<BalancedIngredient>,
    },
    Batch {
        results: Vec<RecipeResult>,
    },
}

impl BalanceReport {
    pub fn to_response(&self) -> BalanceResponse {
        match self.shape {
            RequestShape::Single => BalanceResponse::Single {
                balanced_ingredients: self
                    .recipes
                    .first()
                    .map(|r| r.outcome.ingredients.clone())
                    .unwrap_or_default(),
            },
            RequestShape::Batch => BalanceResponse::Batch {
                results: self
                    .recipes
                    .iter()
                    .map(|r| RecipeResult {
                        recipe_id: r.recipe_id,
                        is_private: r.is_private,
                        balanced_ingredients: r.outcome.ingredients.clone(),
                    })
                    .collect(),
            },
        }
    }

    /// Every balanced line across all recipes.
    pub fn all_ingredients(&self) -> impl Iterator<Item = &BalancedIngredient> {
        self.recipes.iter().flat_map(|r| r.outcome.ingredients.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(food_id: FoodId, grams: f64) -> BalancedIngredient {
        BalancedIngredient {
            food_id,
            quantity: grams,
            grams,
            ingredient_row_id: None,
            recipe_id: None,
            is_private: None,
        }
    }

    #[test]
    fn test_single_response_shape() {
        let report = BalanceReport {
            shape: RequestShape::Single,
            targets: Macros::default(),
            recipes: vec![RecipeOutcome {
                recipe_id: None,
                is_private: None,
                outcome: BalanceOutcome {
                    ingredients: vec![line(1, 120.0)],
                    ..Default::default()
                },
            }],
        };

        let json = serde_json::to_value(report.to_response()).unwrap();
        assert_eq!(json["balancedIngredients"][0]["food_id"], 1);
        assert_eq!(json["balancedIngredients"][0]["grams"], 120.0);
        assert!(json["balancedIngredients"][0].get("recipe_id").is_none());
    }

    #[test]
    fn test_batch_response_shape() {
        let report = BalanceReport {
            shape: RequestShape::Batch,
            targets: Macros::default(),
            recipes: vec![
                RecipeOutcome {
                    recipe_id: Some(4),
                    is_private: Some(false),
                    outcome: BalanceOutcome {
                        ingredients: vec![line(1, 50.0)],
                        ..Default::default()
                    },
                },
                RecipeOutcome {
                    recipe_id: Some(5),
                    is_private: Some(true),
                    outcome: BalanceOutcome::default(),
                },
            ],
        };

        let json = serde_json::to_value(report.to_response()).unwrap();
        assert_eq!(json["results"][0]["recipe_id"], 4);
        assert_eq!(json["results"][1]["is_private"], true);
        assert_eq!(json["results"][0]["balancedIngredients"][0]["quantity"], 50.0);
        assert_eq!(report.all_ingredients().count(), 1);
    }
}
