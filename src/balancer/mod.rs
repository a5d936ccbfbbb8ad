pub mod classifier;
pub mod config;
pub mod constants;
pub mod finalize;
pub mod model;
pub mod optimizer;
pub mod orchestrator;
pub mod scoring;
pub mod tolerance;

pub use classifier::{classify_food_group, FoodGroupKind};
pub use config::{BalancerConfig, Profile};
pub use constants::*;
pub use finalize::{final_quantity, finalize, finalized_totals};
pub use model::{build_work_ingredients, has_strong_protein, WorkIngredient};
pub use optimizer::{balance_ingredients, current_totals, BalanceRun};
pub use orchestrator::{balance_recipe, balance_request, resolve_inputs};
pub use scoring::{best_candidate, evaluate_move, quantize, Candidate, Snapshot};
pub use tolerance::Tolerances;
