use crate::balancer::classifier::FoodGroupKind;
use crate::balancer::config::BalancerConfig;
use crate::balancer::constants::*;
use crate::models::{FoodId, IngredientIdentity, IngredientInput, MacroRole, Macros, UnitKind};

/// Slack used when snapping bounds so float noise does not push a bound
/// one step past where it belongs.
const GRID_SLACK: f64 = 1e-9;

/// Internal working representation of one ingredient during a balancing call.
///
/// Built fresh per call and discarded after finalization. Only `quantity`
/// and `cap` change while the optimizer runs; `cap` only ever grows (see
/// [`WorkIngredient::relax_cap`]).
#[derive(Debug, Clone)]
pub struct WorkIngredient {
    pub food_id: FoodId,
    pub identity: IngredientIdentity,
    pub role: MacroRole,
    /// `None` when the food is ungrouped.
    pub group: Option<FoodGroupKind>,
    pub unit: UnitKind,
    /// Macros contributed by one gram or one unit.
    pub per_unit: Macros,
    /// Squared norm of `per_unit`.
    pub norm_sq: f64,
    pub step: f64,
    pub cap: f64,
    pub priority: u8,
    pub preserve: bool,
    pub locked: bool,
    /// Quantity the caller sent; the anchor for drift penalties.
    pub baseline: f64,
    pub quantity: f64,
    pub min_qty: f64,
    pub max_qty: f64,
}

impl WorkIngredient {
    /// Macros contributed at the current quantity.
    #[inline]
    pub fn macros(&self) -> Macros {
        self.macros_at(self.quantity)
    }

    #[inline]
    pub fn macros_at(&self, quantity: f64) -> Macros {
        self.per_unit.scale(quantity)
    }

    /// Round to the nearest multiple of the step.
    #[inline]
    pub fn snap(&self, quantity: f64) -> f64 {
        (quantity / self.step).round() * self.step
    }

    #[inline]
    pub fn clamp(&self, quantity: f64) -> f64 {
        quantity.clamp(self.min_qty, self.max_qty)
    }

    /// Clamp into bounds, round onto the grid, clamp again.
    pub fn project(&self, quantity: f64) -> f64 {
        self.clamp(self.snap(self.clamp(quantity)))
    }

    /// Whether the optimizer may move this ingredient at all.
    pub fn is_movable(&self) -> bool {
        !self.locked && self.norm_sq > 0.0
    }

    pub fn is_vegetable(&self) -> bool {
        self.group == Some(FoodGroupKind::Vegetables)
    }

    /// Widen the per-iteration cap after a stalled pass.
    ///
    /// Grams grow by 10 up to 150, units by 1 up to 3. Returns whether the
    /// cap actually grew; once every cap is at its ceiling relaxation is a
    /// no-op, which bounds the number of useful relaxations.
    pub fn relax_cap(&mut self) -> bool {
        if self.locked {
            return false;
        }
        let (step, ceiling) = match self.unit {
            UnitKind::Grams => (GRAM_CAP_RELAX_STEP, GRAM_MOVE_CAP_MAX),
            UnitKind::Units => (UNIT_CAP_RELAX_STEP, UNIT_MOVE_CAP_MAX),
        };
        let relaxed = (self.cap + step).min(ceiling);
        if relaxed > self.cap {
            self.cap = relaxed;
            true
        } else {
            false
        }
    }
}

fn grid_ceil(value: f64, step: f64) -> f64 {
    (value / step - GRID_SLACK).ceil() * step
}

fn grid_floor(value: f64, step: f64) -> f64 {
    (value / step + GRID_SLACK).floor() * step
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Whether any ingredient is a protein source outside the legume group.
pub fn has_strong_protein(inputs: &[IngredientInput]) -> bool {
    inputs.iter().any(|input| {
        input.role == MacroRole::Protein && group_kind(input) != Some(FoodGroupKind::Legumes)
    })
}

fn group_kind(input: &IngredientInput) -> Option<FoodGroupKind> {
    input.group_name.as_deref().map(FoodGroupKind::from_name)
}

/// Build the working set for one balancing call.
pub fn build_work_ingredients(
    inputs: &[IngredientInput],
    config: &BalancerConfig,
) -> Vec<WorkIngredient> {
    let strong_protein = has_strong_protein(inputs);
    inputs
        .iter()
        .map(|input| build_work_ingredient(input, strong_protein, config))
        .collect()
}

fn build_work_ingredient(
    input: &IngredientInput,
    strong_protein: bool,
    config: &BalancerConfig,
) -> WorkIngredient {
    let group = group_kind(input);
    let priority = group.map(FoodGroupKind::priority).unwrap_or(UNGROUPED_PRIORITY);
    let preserve = group.is_some_and(FoodGroupKind::is_preserved);

    let per_unit = input
        .density
        .sanitized()
        .scale(1.0 / input.unit.density_divisor());

    let (step, cap) = match input.unit {
        UnitKind::Grams => (config.step_grams, GRAM_MOVE_CAP),
        UnitKind::Units if group == Some(FoodGroupKind::DairyEggs) => {
            (UNIT_STEP_DAIRY_EGG, UNIT_MOVE_CAP)
        }
        UnitKind::Units => (UNIT_STEP_DEFAULT, UNIT_MOVE_CAP),
    };

    let baseline = finite_or_zero(input.quantity).max(0.0);

    let mut work = WorkIngredient {
        food_id: input.food_id,
        identity: input.identity,
        role: input.role,
        group,
        unit: input.unit,
        per_unit,
        norm_sq: per_unit.norm_sq(),
        step,
        cap,
        priority,
        preserve,
        locked: input.locked,
        baseline,
        quantity: baseline,
        min_qty: baseline,
        max_qty: baseline,
    };

    if input.locked {
        return work;
    }

    let mut min_qty = input.min_qty.map(finite_or_zero).unwrap_or(0.0).max(0.0);
    let max_qty = input
        .max_qty
        .map(finite_or_zero)
        .map(|m| m.max(0.0))
        .unwrap_or(f64::INFINITY);

    if preserve && baseline > 0.0 {
        min_qty = min_qty.max(step);
    }

    if strong_protein
        && input.role == MacroRole::Protein
        && group != Some(FoodGroupKind::Legumes)
        && input.unit == UnitKind::Grams
    {
        min_qty = min_qty.max(STRONG_PROTEIN_FLOOR_GRAMS);
    }

    let mut min_qty = grid_ceil(min_qty, step);
    let max_qty = if max_qty.is_finite() {
        grid_floor(max_qty, step)
    } else {
        max_qty
    };
    if min_qty > max_qty {
        min_qty = max_qty;
    }

    work.min_qty = min_qty;
    work.max_qty = max_qty;
    work.quantity = work.clamp(baseline);
    work
}
