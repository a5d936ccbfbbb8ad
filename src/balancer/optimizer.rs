use tracing::{debug, warn};

use crate::balancer::config::BalancerConfig;
use crate::balancer::model::WorkIngredient;
use crate::balancer::scoring::{best_candidate, squared_error, Snapshot};
use crate::balancer::tolerance::Tolerances;
use crate::models::Macros;

/// Summary of one optimizer run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceRun {
    /// Passes that applied a move or relaxed caps.
    pub iterations: usize,
    pub converged: bool,
    /// Macro totals of the working quantities at exit.
    pub totals: Macros,
}

/// Sum of every ingredient's macros at its working quantity.
pub fn current_totals(work: &[WorkIngredient]) -> Macros {
    work.iter()
        .fold(Macros::default(), |acc, w| acc.add(&w.macros()))
}

/// Widen every unlocked cap. Returns whether any cap grew.
fn relax_caps(work: &mut [WorkIngredient]) -> bool {
    work.iter_mut()
        .fold(false, |grew, w| w.relax_cap() || grew)
}

/// Greedy coordinate descent toward the macro targets.
///
/// Each pass applies the single lowest-scoring move across all unlocked
/// ingredients. A pass with no usable move relaxes the caps instead; if no
/// cap can grow any further the run has stalled and stops. The pass budget
/// is `config.max_iterations`, so the loop always terminates.
///
/// When the budget runs out before the tolerances are met, the working
/// quantities are reset to the lowest-error state visited.
pub fn balance_ingredients(
    work: &mut [WorkIngredient],
    targets: &Macros,
    config: &BalancerConfig,
) -> BalanceRun {
    let targets = targets.sanitized();
    let tolerances = Tolerances::for_targets(&targets);

    let mut totals = current_totals(work);
    let mut iterations = 0;
    let mut converged = false;

    let mut best_error = squared_error(&totals, &targets);
    let mut best_quantities: Vec<f64> = work.iter().map(|w| w.quantity).collect();

    for _ in 0..config.max_iterations {
        if tolerances.is_met(&totals, &targets) {
            converged = true;
            break;
        }

        let snapshot = Snapshot::new(work, totals, targets, &tolerances, config.profile);
        let chosen = best_candidate(&snapshot);

        iterations += 1;

        match chosen {
            Some(candidate) => {
                let ingredient = &mut work[candidate.index];
                let from = ingredient.quantity;
                ingredient.quantity = candidate.new_quantity;
                let food_id = ingredient.food_id;

                totals = current_totals(work);
                let error = squared_error(&totals, &targets);

                debug!(
                    iteration = iterations,
                    food_id,
                    from,
                    to = candidate.new_quantity,
                    score = candidate.score,
                    error,
                    "applied move"
                );

                if error < best_error {
                    best_error = error;
                    for (slot, w) in best_quantities.iter_mut().zip(work.iter()) {
                        *slot = w.quantity;
                    }
                }
            }
            None => {
                if relax_caps(work) {
                    debug!(iteration = iterations, "no usable move; relaxed caps");
                } else {
                    debug!(iteration = iterations, "no usable move and caps at ceiling; stopping");
                    break;
                }
            }
        }
    }

    if !converged && tolerances.is_met(&totals, &targets) {
        converged = true;
    }

    if !converged {
        if best_error < squared_error(&totals, &targets) {
            for (w, quantity) in work.iter_mut().zip(&best_quantities) {
                w.quantity = *quantity;
            }
            totals = current_totals(work);
        }
        warn!(
            iterations,
            proteins = totals.proteins,
            carbohydrates = totals.carbohydrates,
            fats = totals.fats,
            "balancer did not reach tolerance; returning best state"
        );
    }

    BalanceRun {
        iterations,
        converged,
        totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balancer::constants::GRAM_MOVE_CAP_MAX;
    use crate::balancer::model::build_work_ingredients;
    use crate::models::{IngredientInput, MacroRole};

    fn scenario_inputs() -> Vec<IngredientInput> {
        vec![
            IngredientInput::grams(1, 100.0, MacroRole::Carb, Macros::new(2.7, 28.0, 0.3)),
            IngredientInput::grams(2, 150.0, MacroRole::Protein, Macros::new(31.0, 0.0, 3.6)),
            IngredientInput::grams(3, 10.0, MacroRole::Fat, Macros::new(0.0, 0.0, 100.0)),
        ]
    }

    #[test]
    fn test_scenario_converges() {
        let config = BalancerConfig::default();
        let mut work = build_work_ingredients(&scenario_inputs(), &config);
        let targets = Macros::new(40.0, 50.0, 15.0);

        let run = balance_ingredients(&mut work, &targets, &config);

        assert!(run.converged);
        assert!(run.iterations <= config.max_iterations);
        assert!(Tolerances::for_targets(&targets).is_met(&run.totals, &targets));
        assert!(work[0].quantity > 100.0, "grain should grow");
        assert!(work[1].quantity >= 50.0, "protein floor");
        assert!(work[2].quantity >= 10.0, "oil should not shrink");
    }

    #[test]
    fn test_already_balanced_runs_zero_iterations() {
        let config = BalancerConfig::default();
        let mut work = build_work_ingredients(&scenario_inputs(), &config);
        let totals = current_totals(&work);

        let run = balance_ingredients(&mut work, &totals, &config);

        assert!(run.converged);
        assert_eq!(run.iterations, 0);
        assert_eq!(work[0].quantity, 100.0);
    }

    #[test]
    fn test_empty_input() {
        let config = BalancerConfig::default();
        let mut work: Vec<WorkIngredient> = Vec::new();
        let run = balance_ingredients(&mut work, &Macros::new(10.0, 10.0, 10.0), &config);
        assert!(!run.converged);
        assert_eq!(run.totals, Macros::default());
    }

    #[test]
    fn test_respects_iteration_budget() {
        let config = BalancerConfig {
            max_iterations: 2,
            ..Default::default()
        };
        let mut work = build_work_ingredients(&scenario_inputs(), &config);
        let run = balance_ingredients(&mut work, &Macros::new(200.0, 400.0, 100.0), &config);
        assert!(run.iterations <= 2);
        assert!(!run.converged);
    }

    #[test]
    fn test_all_locked_stalls_without_spinning() {
        let config = BalancerConfig::default();
        let inputs: Vec<IngredientInput> =
            scenario_inputs().into_iter().map(|i| i.locked()).collect();
        let mut work = build_work_ingredients(&inputs, &config);

        let run = balance_ingredients(&mut work, &Macros::new(80.0, 80.0, 30.0), &config);

        assert!(!run.converged);
        // One pass finds nothing to move and nothing to relax.
        assert_eq!(run.iterations, 1);
        assert_eq!(work[0].quantity, 100.0);
        assert_eq!(work[1].quantity, 150.0);
        assert_eq!(work[2].quantity, 10.0);
    }

    #[test]
    fn test_caps_relax_when_blocked() {
        let config = BalancerConfig::default();
        // Max bound blocks every move, so passes can only relax caps.
        let inputs = vec![
            IngredientInput::grams(1, 100.0, MacroRole::Carb, Macros::new(2.7, 28.0, 0.3))
                .with_bounds(None, Some(100.0)),
        ];
        let mut work = build_work_ingredients(&inputs, &config);

        let run = balance_ingredients(&mut work, &Macros::new(10.0, 200.0, 5.0), &config);

        assert!(!run.converged);
        assert_eq!(work[0].cap, GRAM_MOVE_CAP_MAX);
        assert_eq!(work[0].quantity, 100.0);
        // Eight relaxations reach the ceiling, the ninth pass stalls.
        assert_eq!(run.iterations, 9);
    }

    #[test]
    fn test_locked_ingredient_untouched() {
        let config = BalancerConfig::default();
        let mut inputs = scenario_inputs();
        inputs[0] = inputs[0].clone().locked();
        let mut work = build_work_ingredients(&inputs, &config);

        balance_ingredients(&mut work, &Macros::new(40.0, 50.0, 15.0), &config);

        assert_eq!(work[0].quantity, 100.0);
    }
}
