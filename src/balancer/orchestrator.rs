use tracing::{info, warn};

use crate::balancer::config::BalancerConfig;
use crate::balancer::finalize::{finalize, finalized_totals};
use crate::balancer::model::build_work_ingredients;
use crate::balancer::optimizer::balance_ingredients;
use crate::balancer::tolerance::Tolerances;
use crate::error::Result;
use crate::models::request::{referenced_food_ids, RecipeLines};
use crate::models::{
    BalanceOptions, BalanceOutcome, BalanceReport, BalanceRequest, IngredientInput,
    IngredientLine, MacroRole, Macros, RecipeOutcome, UnitKind,
};
use crate::state::{FoodContext, FoodSource};

/// Join request lines with their food data.
///
/// Role comes from the line, then the catalog, then `Mixed`. Group name
/// comes from the line, then the classified catalog group. A food missing
/// from the context contributes no macros.
pub fn resolve_inputs(lines: &[IngredientLine], context: &FoodContext) -> Vec<IngredientInput> {
    lines
        .iter()
        .map(|line| {
            let food = context.get(line.food_id);
            if food.is_none() {
                warn!(food_id = line.food_id, "no nutrition data; treating as zero macros");
            }

            let role = line
                .macro_role
                .or_else(|| food.and_then(|f| f.nutrition.role))
                .unwrap_or(MacroRole::Mixed);
            let group_name = line
                .group_name
                .clone()
                .or_else(|| food.and_then(|f| f.group_name()).map(str::to_string));

            IngredientInput {
                food_id: line.food_id,
                quantity: line.quantity,
                locked: line.locked,
                min_qty: line.min_qty,
                max_qty: line.max_qty,
                role,
                group_name,
                density: food.map(|f| f.nutrition.density()).unwrap_or_default(),
                unit: food.map(|f| f.nutrition.unit).unwrap_or(UnitKind::Grams),
                identity: line.identity,
            }
        })
        .collect()
}

/// Balance one ingredient list toward `targets`.
///
/// Output order matches input order. `converged` reflects the emitted
/// quantities, after final rounding.
pub fn balance_recipe(
    inputs: &[IngredientInput],
    targets: &Macros,
    config: &BalancerConfig,
) -> BalanceOutcome {
    if inputs.is_empty() {
        return BalanceOutcome::default();
    }

    let mut work = build_work_ingredients(inputs, config);
    let run = balance_ingredients(&mut work, targets, config);
    let ingredients = finalize(&work);
    let totals = finalized_totals(&work, &ingredients);

    let targets = targets.sanitized();
    let converged = Tolerances::for_targets(&targets).is_met(&totals, &targets);

    BalanceOutcome {
        ingredients,
        iterations: run.iterations,
        converged,
        totals,
    }
}

fn balance_lines(
    recipe: &RecipeLines,
    context: &FoodContext,
    targets: &Macros,
    config: &BalancerConfig,
) -> RecipeOutcome {
    let inputs = resolve_inputs(&recipe.lines, context);
    let outcome = balance_recipe(&inputs, targets, config);

    info!(
        recipe_id = recipe.recipe_id,
        ingredients = outcome.ingredients.len(),
        iterations = outcome.iterations,
        converged = outcome.converged,
        "balanced recipe"
    );

    RecipeOutcome {
        recipe_id: recipe.recipe_id,
        is_private: recipe.is_private,
        outcome,
    }
}

/// Validate a request, fetch its foods once, and balance every recipe.
///
/// `overrides` win over options carried in the request. Each recipe in a
/// batch is balanced against the full target independently.
pub fn balance_request<S: FoodSource + ?Sized>(
    request: &BalanceRequest,
    source: &S,
    overrides: &BalanceOptions,
) -> Result<BalanceReport> {
    let targets = request.targets()?;
    let recipes = request.normalize()?;

    let options = overrides.overriding(&request.options());
    let config = BalancerConfig::default().with_options(&options);
    info!(recipes = recipes.len(), config = %config.display(), "balancing request");

    let context = source.lookup(&referenced_food_ids(&recipes))?;

    let outcomes = recipes
        .iter()
        .map(|recipe| balance_lines(recipe, &context, &targets, &config))
        .collect();

    Ok(BalanceReport {
        shape: request.shape(),
        targets,
        recipes: outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use crate::error::BalanceError;
    use crate::models::{FoodGroup, FoodId, FoodNutrition, RequestShape};
    use crate::state::FoodCatalog;

    fn food(id: FoodId, p: f64, c: f64, f: f64, role: Option<MacroRole>, groups: Vec<FoodGroup>) -> FoodNutrition {
        FoodNutrition {
            id,
            name: format!("food {}", id),
            protein: p,
            carbs: c,
            fat: f,
            unit: UnitKind::Grams,
            role,
            groups,
        }
    }

    fn catalog() -> FoodCatalog {
        FoodCatalog::new(vec![
            food(1, 2.7, 28.0, 0.3, Some(MacroRole::Carb), vec![FoodGroup::new(2, "Grains")]),
            food(2, 31.0, 0.0, 3.6, Some(MacroRole::Protein), vec![]),
            food(3, 0.0, 0.0, 100.0, Some(MacroRole::Fat), vec![]),
            food(4, 2.9, 3.6, 0.4, None, vec![FoodGroup::new(6, "Vegetables")]),
        ])
    }

    struct FailingSource;

    impl FoodSource for FailingSource {
        fn lookup(&self, _ids: &BTreeSet<FoodId>) -> Result<FoodContext> {
            Err(BalanceError::FoodLookup("connection refused".to_string()))
        }
    }

    fn single_request() -> BalanceRequest {
        serde_json::from_str(
            r#"{
                "ingredients": [
                    {"food_id": 1, "quantity": 100},
                    {"food_id": 2, "quantity": 150},
                    {"food_id": 3, "quantity": 10}
                ],
                "targets": {"proteins": 40, "carbohydrates": 50, "fats": 15}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_inputs_fallbacks() {
        let ids: BTreeSet<FoodId> = [1, 4].into_iter().collect();
        let context = catalog().lookup(&ids).unwrap();
        let lines = vec![
            IngredientLine {
                food_id: 1,
                quantity: 100.0,
                locked: false,
                min_qty: None,
                max_qty: None,
                group_name: None,
                macro_role: Some(MacroRole::Mixed),
                identity: Default::default(),
            },
            IngredientLine {
                food_id: 4,
                quantity: 80.0,
                locked: false,
                min_qty: None,
                max_qty: None,
                group_name: None,
                macro_role: None,
                identity: Default::default(),
            },
            IngredientLine {
                food_id: 99,
                quantity: 5.0,
                locked: false,
                min_qty: None,
                max_qty: None,
                group_name: Some("Fruits".to_string()),
                macro_role: None,
                identity: Default::default(),
            },
        ];

        let inputs = resolve_inputs(&lines, &context);

        // Line role beats catalog role.
        assert_eq!(inputs[0].role, MacroRole::Mixed);
        assert_eq!(inputs[0].group_name.as_deref(), Some("Grains"));
        assert_eq!(inputs[0].density, Macros::new(2.7, 28.0, 0.3));

        assert_eq!(inputs[1].role, MacroRole::Mixed);
        assert_eq!(inputs[1].group_name.as_deref(), Some("Vegetables"));

        // Unknown food: zero density, line group kept.
        assert_eq!(inputs[2].density, Macros::default());
        assert_eq!(inputs[2].unit, UnitKind::Grams);
        assert_eq!(inputs[2].group_name.as_deref(), Some("Fruits"));
    }

    #[test]
    fn test_balance_recipe_empty() {
        let outcome = balance_recipe(&[], &Macros::new(40.0, 50.0, 15.0), &BalancerConfig::default());
        assert!(outcome.ingredients.is_empty());
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn test_balance_request_single() {
        let report = balance_request(&single_request(), &catalog(), &BalanceOptions::default()).unwrap();

        assert_eq!(report.shape, RequestShape::Single);
        assert_eq!(report.recipes.len(), 1);

        let outcome = &report.recipes[0].outcome;
        assert!(outcome.converged);
        let quantities: Vec<f64> = outcome.ingredients.iter().map(|b| b.quantity).collect();
        assert!(quantities[0] > 100.0);
        assert!(quantities[1] >= 50.0);
        for b in &outcome.ingredients {
            assert_eq!(b.quantity, b.grams);
            assert_eq!(b.quantity % 5.0, 0.0);
        }
    }

    #[test]
    fn test_balance_request_batch_keeps_identity() {
        let request: BalanceRequest = serde_json::from_str(
            r#"{
                "recipes": [
                    {"recipe_id": 7, "is_private": true, "ingredients": [
                        {"food_id": 1, "quantity": 100, "ingredient_row_id": 70},
                        {"food_id": 2, "quantity": 150, "ingredient_row_id": 71}
                    ]},
                    {"recipe_id": 8, "ingredients": []}
                ],
                "targets": {"proteins": 40, "carbohydrates": 50, "fats": 15}
            }"#,
        )
        .unwrap();

        let report = balance_request(&request, &catalog(), &BalanceOptions::default()).unwrap();

        assert_eq!(report.shape, RequestShape::Batch);
        assert_eq!(report.recipes.len(), 2);
        assert_eq!(report.recipes[0].recipe_id, Some(7));
        assert_eq!(report.recipes[0].outcome.ingredients[0].ingredient_row_id, Some(70));
        assert_eq!(report.recipes[0].outcome.ingredients[1].recipe_id, Some(7));
        assert_eq!(report.recipes[0].outcome.ingredients[1].is_private, Some(true));
        assert!(report.recipes[1].outcome.ingredients.is_empty());
    }

    #[test]
    fn test_missing_targets_rejected() {
        let request: BalanceRequest =
            serde_json::from_str(r#"{"ingredients": [{"food_id": 1, "quantity": 100}]}"#).unwrap();
        assert!(matches!(
            balance_request(&request, &catalog(), &BalanceOptions::default()),
            Err(BalanceError::MissingTargets)
        ));
    }

    #[test]
    fn test_lookup_failure_aborts() {
        assert!(matches!(
            balance_request(&single_request(), &FailingSource, &BalanceOptions::default()),
            Err(BalanceError::FoodLookup(_))
        ));
    }

    #[test]
    fn test_overrides_apply() {
        let overrides = BalanceOptions {
            max_iterations: Some(1),
            ..Default::default()
        };
        let report = balance_request(&single_request(), &catalog(), &overrides).unwrap();
        assert!(report.recipes[0].outcome.iterations <= 1);
    }
}
