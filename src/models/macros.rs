use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::lenient::coerce_f64;

/// Energy per gram of protein (kcal).
pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;

/// Energy per gram of carbohydrate (kcal).
pub const KCAL_PER_GRAM_CARB: f64 = 4.0;

/// Energy per gram of fat (kcal).
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;

/// Protein, carbohydrate and fat amounts in grams.
///
/// Used for targets, running totals and per-gram/per-unit densities alike.
/// Calories are never stored; they are always derived from the three grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMacros")]
pub struct Macros {
    pub proteins: f64,
    pub carbohydrates: f64,
    pub fats: f64,
}

/// Macro targets for a recipe or meal.
pub type MacroTargets = Macros;

/// Wire shape accepting aliases and malformed numbers.
#[derive(Deserialize)]
struct RawMacros {
    #[serde(default, alias = "protein")]
    proteins: Option<Value>,
    #[serde(default, alias = "carbs", alias = "carbohydrate")]
    carbohydrates: Option<Value>,
    #[serde(default, alias = "fat")]
    fats: Option<Value>,
}

impl From<RawMacros> for Macros {
    fn from(raw: RawMacros) -> Self {
        let grams = |v: Option<Value>| v.as_ref().map(coerce_f64).unwrap_or(0.0);
        Self {
            proteins: grams(raw.proteins),
            carbohydrates: grams(raw.carbohydrates),
            fats: grams(raw.fats),
        }
    }
}

impl Macros {
    pub fn new(proteins: f64, carbohydrates: f64, fats: f64) -> Self {
        Self {
            proteins,
            carbohydrates,
            fats,
        }
    }

    /// Atwater calories: 4/4/9 kcal per gram.
    #[inline]
    pub fn calories(&self) -> f64 {
        self.proteins * KCAL_PER_GRAM_PROTEIN
            + self.carbohydrates * KCAL_PER_GRAM_CARB
            + self.fats * KCAL_PER_GRAM_FAT
    }

    /// Multiply every component by `factor`.
    #[inline]
    pub fn scale(&self, factor: f64) -> Self {
        Self::new(
            self.proteins * factor,
            self.carbohydrates * factor,
            self.fats * factor,
        )
    }

    #[inline]
    pub fn add(&self, other: &Self) -> Self {
        Self::new(
            self.proteins + other.proteins,
            self.carbohydrates + other.carbohydrates,
            self.fats + other.fats,
        )
    }

    /// Component-wise `self - other`.
    #[inline]
    pub fn sub(&self, other: &Self) -> Self {
        Self::new(
            self.proteins - other.proteins,
            self.carbohydrates - other.carbohydrates,
            self.fats - other.fats,
        )
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.proteins * other.proteins
            + self.carbohydrates * other.carbohydrates
            + self.fats * other.fats
    }

    /// Squared Euclidean norm of the 3-vector.
    #[inline]
    pub fn norm_sq(&self) -> f64 {
        self.dot(self)
    }

    /// Replace non-finite components with 0.
    pub fn sanitized(&self) -> Self {
        let clean = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self::new(
            clean(self.proteins),
            clean(self.carbohydrates),
            clean(self.fats),
        )
    }
}
