use crate::balancer::constants::*;
use crate::models::{MacroRole, Macros};

/// Acceptable absolute deviation per macro for a given target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub proteins: f64,
    pub carbohydrates: f64,
    pub fats: f64,
}

impl Tolerances {
    /// Protein and fat: max(2 g, 5%). Carbs: max(5 g, 5%).
    pub fn for_targets(targets: &Macros) -> Self {
        Self {
            proteins: PROTEIN_TOLERANCE_MIN.max(MACRO_TOLERANCE_PCT * targets.proteins.abs()),
            carbohydrates: CARB_TOLERANCE_MIN
                .max(MACRO_TOLERANCE_PCT * targets.carbohydrates.abs()),
            fats: FAT_TOLERANCE_MIN.max(MACRO_TOLERANCE_PCT * targets.fats.abs()),
        }
    }

    /// Both stop conditions: every macro within tolerance and calories within
    /// 5% of the target calories.
    pub fn is_met(&self, totals: &Macros, targets: &Macros) -> bool {
        let dev = targets.sub(totals);
        let macros_ok = dev.proteins.abs() <= self.proteins
            && dev.carbohydrates.abs() <= self.carbohydrates
            && dev.fats.abs() <= self.fats;

        let target_cal = targets.calories();
        let calories_ok = (totals.calories() - target_cal).abs() <= CALORIE_TOLERANCE_PCT * target_cal.abs();

        macros_ok && calories_ok
    }

    /// The macro most in need of correction, as a role.
    ///
    /// Prefers the largest shortfall (relative to tolerance); when nothing
    /// is below target, the largest overshoot.
    pub fn most_deficient(&self, totals: &Macros, targets: &Macros) -> MacroRole {
        let dev = targets.sub(totals);
        let scaled = [
            (MacroRole::Protein, dev.proteins / self.proteins),
            (MacroRole::Carb, dev.carbohydrates / self.carbohydrates),
            (MacroRole::Fat, dev.fats / self.fats),
        ];

        let shortfall = scaled
            .iter()
            .filter(|(_, d)| *d > 0.0)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        match shortfall {
            Some((role, _)) => *role,
            None => scaled
                .iter()
                .max_by(|a, b| {
                    a.1.abs()
                        .partial_cmp(&b.1.abs())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(role, _)| *role)
                .unwrap_or(MacroRole::Mixed),
        }
    }
}
