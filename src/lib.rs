pub mod balancer;
pub mod cli;
pub mod error;
pub mod interface;
pub mod models;
pub mod state;

pub use error::{BalanceError, Result};
pub use models::{BalanceRequest, BalanceResponse, BalancedIngredient, Macros};
