use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::balancer::constants::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_STEP_GRAMS, VEGETABLE_CAP_BALANCED, VEGETABLE_CAP_HIGH_CARB,
    VEGETABLE_CAP_LOW_CARB_SATIETY,
};
use crate::models::BalanceOptions;

/// Dietary profile; only affects how many grams of vegetables are tolerated
/// before the soft-cap penalty kicks in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    #[serde(alias = "highCarb", alias = "high-carb")]
    HighCarb,
    #[default]
    Balanced,
    #[serde(alias = "lowCarbSatiety", alias = "low-carb-satiety", alias = "low_carb")]
    LowCarbSatiety,
}

impl Profile {
    /// Grams of a vegetable ingredient above which a quadratic penalty applies.
    pub fn vegetable_soft_cap(self) -> f64 {
        match self {
            Profile::HighCarb => VEGETABLE_CAP_HIGH_CARB,
            Profile::Balanced => VEGETABLE_CAP_BALANCED,
            Profile::LowCarbSatiety => VEGETABLE_CAP_LOW_CARB_SATIETY,
        }
    }
}

/// Runtime configuration for one balancing call.
#[derive(Debug, Clone, PartialEq)]
pub struct BalancerConfig {
    pub profile: Profile,
    /// Discretization step for grams-based ingredients.
    pub step_grams: f64,
    pub max_iterations: usize,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            step_grams: DEFAULT_STEP_GRAMS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl BalancerConfig {
    /// Apply request/CLI options on top of this config.
    ///
    /// A non-positive or non-finite step and a zero iteration budget are
    /// ignored.
    pub fn with_options(mut self, options: &BalanceOptions) -> Self {
        if let Some(profile) = options.profile {
            self.profile = profile;
        }
        if let Some(step) = options.step_grams.filter(|s| s.is_finite() && *s > 0.0) {
            self.step_grams = step;
        }
        if let Some(iterations) = options.max_iterations.filter(|n| *n > 0) {
            self.max_iterations = iterations;
        }
        self
    }

    /// Compact description for logging.
    pub fn display(&self) -> String {
        format!(
            "profile={:?} step={}g max_iter={}",
            self.profile, self.step_grams, self.max_iterations
        )
    }
}
