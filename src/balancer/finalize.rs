use crate::balancer::model::WorkIngredient;
use crate::models::{BalancedIngredient, Macros};

/// Project a working quantity into its emitted value.
///
/// Round, clamp, re-round. A preserved ingredient that started above zero
/// is never emitted at zero. Locked ingredients come back exactly as sent.
pub fn final_quantity(ingredient: &WorkIngredient) -> f64 {
    if ingredient.locked {
        return ingredient.baseline;
    }

    let mut quantity = ingredient.snap(ingredient.clamp(ingredient.snap(ingredient.quantity)));

    if ingredient.preserve && ingredient.baseline > 0.0 && quantity == 0.0 {
        quantity = ingredient.min_qty.max(ingredient.step);
    }

    // -0.0 from rounding a tiny negative.
    if quantity == 0.0 { 0.0 } else { quantity }
}

/// Emit output records for a finished working set.
pub fn finalize(work: &[WorkIngredient]) -> Vec<BalancedIngredient> {
    work.iter()
        .map(|w| {
            let quantity = final_quantity(w);
            BalancedIngredient {
                food_id: w.food_id,
                quantity,
                grams: quantity,
                ingredient_row_id: w.identity.ingredient_row_id,
                recipe_id: w.identity.recipe_id,
                is_private: w.identity.is_private,
            }
        })
        .collect()
}

/// Macro totals of the emitted quantities.
pub fn finalized_totals(work: &[WorkIngredient], balanced: &[BalancedIngredient]) -> Macros {
    work.iter()
        .zip(balanced)
        .fold(Macros::default(), |acc, (w, b)| acc.add(&w.macros_at(b.quantity)))
}
