/// Default discretization step for grams-based ingredients.
pub const DEFAULT_STEP_GRAMS: f64 = 5.0;

/// Unit step for dairy/egg foods (whole eggs, yogurt cups).
pub const UNIT_STEP_DAIRY_EGG: f64 = 1.0;

/// Unit step for every other unit-based food (half slices, half pieces).
pub const UNIT_STEP_DEFAULT: f64 = 0.5;

/// Default optimizer pass budget.
pub const DEFAULT_MAX_ITERATIONS: usize = 60;

/// Denominator guard for the single-variable least-squares step.
pub const NORM_EPSILON: f64 = 1e-9;

// ─────────────────────────────────────────────────────────────────────────────
// Per-iteration move caps and deadlock relaxation
// ─────────────────────────────────────────────────────────────────────────────

/// Initial per-iteration move cap for grams-based ingredients.
pub const GRAM_MOVE_CAP: f64 = 75.0;

/// Grams cap ceiling reachable through relaxation.
pub const GRAM_MOVE_CAP_MAX: f64 = 150.0;

/// Grams added to the cap on every relaxation.
pub const GRAM_CAP_RELAX_STEP: f64 = 10.0;

/// Initial per-iteration move cap for unit-based ingredients.
pub const UNIT_MOVE_CAP: f64 = 3.0;

/// Units cap ceiling reachable through relaxation.
pub const UNIT_MOVE_CAP_MAX: f64 = 3.0;

/// Units added to the cap on every relaxation.
pub const UNIT_CAP_RELAX_STEP: f64 = 1.0;

// ─────────────────────────────────────────────────────────────────────────────
// Convergence tolerances
// ─────────────────────────────────────────────────────────────────────────────

/// Absolute protein tolerance floor (g).
pub const PROTEIN_TOLERANCE_MIN: f64 = 2.0;

/// Absolute carbohydrate tolerance floor (g).
pub const CARB_TOLERANCE_MIN: f64 = 5.0;

/// Absolute fat tolerance floor (g).
pub const FAT_TOLERANCE_MIN: f64 = 2.0;

/// Relative tolerance applied to each macro target.
pub const MACRO_TOLERANCE_PCT: f64 = 0.05;

/// Relative tolerance on derived calories.
pub const CALORIE_TOLERANCE_PCT: f64 = 0.05;

// ─────────────────────────────────────────────────────────────────────────────
// Bounds
// ─────────────────────────────────────────────────────────────────────────────

/// Minimum grams kept for primary protein sources while a strong protein
/// source is present.
pub const STRONG_PROTEIN_FLOOR_GRAMS: f64 = 50.0;

/// Preservation priority of a food with no group at all.
pub const UNGROUPED_PRIORITY: u8 = 1;

// ─────────────────────────────────────────────────────────────────────────────
// Candidate scoring weights
// ─────────────────────────────────────────────────────────────────────────────

/// Penalty per unit of |change| per preservation-priority point.
pub const PRESERVATION_WEIGHT: f64 = 0.1;

/// Penalty per unit of |change| when the ingredient's role does not match
/// the most deficient macro.
pub const ROLE_MISMATCH_WEIGHT: f64 = 0.05;

/// Anchor weights on squared relative drift from the original quantity.
pub const ANCHOR_WEIGHT_PROTEIN: f64 = 40.0;
pub const ANCHOR_WEIGHT_FAT: f64 = 25.0;
pub const ANCHOR_WEIGHT_CARB: f64 = 15.0;
pub const ANCHOR_WEIGHT_VEGETABLE: f64 = 10.0;
pub const ANCHOR_WEIGHT_GENERIC: f64 = 5.0;

/// Quadratic penalty strength above the vegetable soft cap (per g²).
pub const VEGETABLE_CAP_WEIGHT: f64 = 0.05;

/// Vegetable soft caps (g) per profile.
pub const VEGETABLE_CAP_HIGH_CARB: f64 = 350.0;
pub const VEGETABLE_CAP_BALANCED: f64 = 400.0;
pub const VEGETABLE_CAP_LOW_CARB_SATIETY: f64 = 450.0;
