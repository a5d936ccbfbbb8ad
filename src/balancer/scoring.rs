//! Candidate moves and their scores.
//!
//! Everything here is a pure function of an immutable [`Snapshot`]; the
//! optimizer decides which candidate to apply.

use std::cmp::Ordering;

use tracing::trace;

use crate::balancer::config::Profile;
use crate::balancer::constants::*;
use crate::balancer::model::WorkIngredient;
use crate::balancer::tolerance::Tolerances;
use crate::models::{MacroRole, Macros, UnitKind};

/// Read-only view of the optimizer state at the start of an iteration.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub ingredients: &'a [WorkIngredient],
    pub totals: Macros,
    pub targets: Macros,
    pub profile: Profile,
    /// `targets - totals`.
    pub deviation: Macros,
    /// Role of the macro most in need of correction.
    pub deficient: MacroRole,
}

impl<'a> Snapshot<'a> {
    pub fn new(
        ingredients: &'a [WorkIngredient],
        totals: Macros,
        targets: Macros,
        tolerances: &Tolerances,
        profile: Profile,
    ) -> Self {
        Self {
            ingredients,
            totals,
            targets,
            profile,
            deviation: targets.sub(&totals),
            deficient: tolerances.most_deficient(&totals, &targets),
        }
    }
}

/// A scored single-ingredient move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub new_quantity: f64,
    /// Applied change after clamping and rounding.
    pub delta: f64,
    /// Squared macro error after the move.
    pub error: f64,
    /// `error` plus all penalties; lower is better.
    pub score: f64,
}

/// Snap a signed move onto the step grid.
///
/// A nonzero move smaller than one step becomes exactly one step in the
/// same direction; anything else rounds to the nearest multiple.
pub fn quantize(amount: f64, step: f64) -> f64 {
    if amount == 0.0 || !amount.is_finite() {
        return 0.0;
    }
    if amount.abs() < step {
        return step.copysign(amount);
    }
    (amount / step).round() * step
}

/// Least-squares optimal move for one ingredient in isolation, capped and
/// quantized.
pub fn proposed_move(ingredient: &WorkIngredient, deviation: &Macros) -> f64 {
    let raw = deviation.dot(&ingredient.per_unit) / (ingredient.norm_sq + NORM_EPSILON);
    let capped = raw.clamp(-ingredient.cap, ingredient.cap);
    let quantized = quantize(capped, ingredient.step);

    // Rounding up may overshoot the cap by part of a step.
    let limit = (ingredient.cap / ingredient.step).floor().max(1.0) * ingredient.step;
    quantized.clamp(-limit, limit)
}

/// Preservation penalty: priority score times |change|.
pub fn preservation_penalty(ingredient: &WorkIngredient, delta: f64) -> f64 {
    PRESERVATION_WEIGHT * f64::from(ingredient.priority) * delta.abs()
}

/// Penalty for moving an ingredient whose role is not the deficient macro.
pub fn role_mismatch_penalty(ingredient: &WorkIngredient, delta: f64, deficient: MacroRole) -> f64 {
    if ingredient.role == deficient {
        0.0
    } else {
        ROLE_MISMATCH_WEIGHT * delta.abs()
    }
}

fn anchor_weight(ingredient: &WorkIngredient) -> f64 {
    match ingredient.role {
        MacroRole::Protein => ANCHOR_WEIGHT_PROTEIN,
        MacroRole::Fat => ANCHOR_WEIGHT_FAT,
        MacroRole::Carb => ANCHOR_WEIGHT_CARB,
        MacroRole::Mixed if ingredient.is_vegetable() => ANCHOR_WEIGHT_VEGETABLE,
        MacroRole::Mixed => ANCHOR_WEIGHT_GENERIC,
    }
}

/// Role-weighted squared relative drift from the original quantity.
pub fn anchor_penalty(ingredient: &WorkIngredient, new_quantity: f64) -> f64 {
    let reference = ingredient.baseline.max(ingredient.step);
    let drift = (new_quantity - ingredient.baseline) / reference;
    anchor_weight(ingredient) * drift * drift
}

/// Quadratic penalty for grams-based vegetables above the profile's soft cap.
pub fn vegetable_cap_penalty(ingredient: &WorkIngredient, new_quantity: f64, profile: Profile) -> f64 {
    if ingredient.unit != UnitKind::Grams || !ingredient.is_vegetable() {
        return 0.0;
    }
    let over = new_quantity - profile.vegetable_soft_cap();
    if over <= 0.0 {
        0.0
    } else {
        VEGETABLE_CAP_WEIGHT * over * over
    }
}

/// Build and score the move for one ingredient. `None` when the ingredient
/// cannot move or the move rounds away to nothing.
pub fn evaluate_move(snapshot: &Snapshot, index: usize) -> Option<Candidate> {
    let ingredient = snapshot.ingredients.get(index)?;
    if !ingredient.is_movable() {
        return None;
    }

    let step = proposed_move(ingredient, &snapshot.deviation);
    if step == 0.0 {
        return None;
    }

    let new_quantity = ingredient.project(ingredient.quantity + step);
    let delta = new_quantity - ingredient.quantity;
    if delta.abs() <= f64::EPSILON * ingredient.step.max(1.0) {
        return None;
    }

    let after = snapshot.totals.add(&ingredient.per_unit.scale(delta));
    let error = snapshot.targets.sub(&after).norm_sq();

    let score = error
        + preservation_penalty(ingredient, delta)
        + role_mismatch_penalty(ingredient, delta, snapshot.deficient)
        + anchor_penalty(ingredient, new_quantity)
        + vegetable_cap_penalty(ingredient, new_quantity, snapshot.profile);

    trace!(
        food_id = ingredient.food_id,
        delta,
        new_quantity,
        error,
        score,
        "scored candidate"
    );

    Some(Candidate {
        index,
        new_quantity,
        delta,
        error,
        score,
    })
}

/// Lowest-scoring move across all ingredients; ties keep the earliest.
pub fn best_candidate(snapshot: &Snapshot) -> Option<Candidate> {
    (0..snapshot.ingredients.len())
        .filter_map(|i| evaluate_move(snapshot, i))
        .min_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal))
}

/// Squared distance between totals and targets.
pub fn squared_error(totals: &Macros, targets: &Macros) -> f64 {
    targets.sub(totals).norm_sq()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balancer::config::BalancerConfig;
    use crate::balancer::model::build_work_ingredients;
    use crate::models::IngredientInput;

    fn scenario() -> Vec<WorkIngredient> {
        let inputs = vec![
            IngredientInput::grams(1, 100.0, MacroRole::Carb, Macros::new(2.7, 28.0, 0.3)),
            IngredientInput::grams(2, 150.0, MacroRole::Protein, Macros::new(31.0, 0.0, 3.6)),
            IngredientInput::grams(3, 10.0, MacroRole::Fat, Macros::new(0.0, 0.0, 100.0)),
        ];
        build_work_ingredients(&inputs, &BalancerConfig::default())
    }

    fn totals(work: &[WorkIngredient]) -> Macros {
        work.iter().fold(Macros::default(), |acc, w| acc.add(&w.macros()))
    }

    fn snapshot(work: &[WorkIngredient]) -> Snapshot<'_> {
        let targets = Macros::new(40.0, 50.0, 15.0);
        Snapshot::new(
            work,
            totals(work),
            targets,
            &Tolerances::for_targets(&targets),
            Profile::Balanced,
        )
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(0.0, 5.0), 0.0);
        assert_eq!(quantize(0.7, 5.0), 5.0);
        assert_eq!(quantize(-0.7, 5.0), -5.0);
        assert_eq!(quantize(12.4, 5.0), 10.0);
        assert_eq!(quantize(12.6, 5.0), 15.0);
        assert_eq!(quantize(-1.3, 0.5), -1.5);
        assert_eq!(quantize(f64::NAN, 5.0), 0.0);
    }

    #[test]
    fn test_proposed_move_capped() {
        let work = scenario();
        let snap = snapshot(&work);
        // Grain wants ~74.7 g more; capped at 75 then quantized.
        assert_eq!(proposed_move(&work[0], &snap.deviation), 75.0);
        // Oil only needs -0.7 g: snaps to one full step.
        assert_eq!(proposed_move(&work[2], &snap.deviation), -5.0);
    }

    #[test]
    fn test_proposed_move_respects_cap_after_rounding() {
        let mut work = scenario();
        work[0].step = 10.0;
        let deviation = Macros::new(0.0, 1000.0, 0.0);
        // 75 rounds to 80 on a 10 g grid; the move is held at 70.
        assert_eq!(proposed_move(&work[0], &deviation), 70.0);
    }

    #[test]
    fn test_best_candidate_first_iteration() {
        let work = scenario();
        let snap = snapshot(&work);
        assert_eq!(snap.deficient, MacroRole::Carb);

        let best = best_candidate(&snap).unwrap();
        assert_eq!(best.index, 0);
        assert_eq!(best.new_quantity, 175.0);
        assert_eq!(best.delta, 75.0);
    }

    #[test]
    fn test_locked_never_proposed() {
        let mut work = scenario();
        work[0].locked = true;
        let snap = snapshot(&work);
        assert!(evaluate_move(&snap, 0).is_none());
        assert_ne!(best_candidate(&snap).unwrap().index, 0);
    }

    #[test]
    fn test_move_blocked_by_bounds_is_skipped() {
        let mut work = scenario();
        work[0].max_qty = 100.0;
        let snap = snapshot(&work);
        assert!(evaluate_move(&snap, 0).is_none());
    }

    #[test]
    fn test_zero_norm_skipped() {
        let mut work = scenario();
        work[2].per_unit = Macros::default();
        work[2].norm_sq = 0.0;
        let snap = snapshot(&work);
        assert!(evaluate_move(&snap, 2).is_none());
    }

    #[test]
    fn test_penalties() {
        let mut work = scenario();
        work[0].priority = 5;
        assert!((preservation_penalty(&work[0], -20.0) - 10.0).abs() < 1e-9);

        assert_eq!(role_mismatch_penalty(&work[0], 20.0, MacroRole::Carb), 0.0);
        assert!((role_mismatch_penalty(&work[1], 20.0, MacroRole::Carb) - 1.0).abs() < 1e-9);

        assert_eq!(anchor_penalty(&work[1], 150.0), 0.0);
        let drift = anchor_penalty(&work[1], 75.0);
        assert!((drift - ANCHOR_WEIGHT_PROTEIN * 0.25).abs() < 1e-9);
        // Same drift costs less on a carb source than on a protein source.
        assert!(anchor_penalty(&work[0], 50.0) < anchor_penalty(&work[1], 75.0));
    }

    #[test]
    fn test_vegetable_cap_penalty() {
        let mut work = scenario();
        work[0].group = Some(crate::balancer::classifier::FoodGroupKind::Vegetables);
        assert_eq!(vegetable_cap_penalty(&work[0], 380.0, Profile::Balanced), 0.0);
        assert!(vegetable_cap_penalty(&work[0], 380.0, Profile::HighCarb) > 0.0);
        assert!((vegetable_cap_penalty(&work[0], 420.0, Profile::Balanced) - 20.0).abs() < 1e-9);
        // Only vegetables are capped.
        assert_eq!(vegetable_cap_penalty(&work[1], 900.0, Profile::HighCarb), 0.0);
    }
}
