use thiserror::Error;

#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No macro targets provided")]
    MissingTargets,

    #[error("No ingredients to balance")]
    EmptyIngredients,

    #[error("Food lookup failed: {0}")]
    FoodLookup(String),
}

pub type Result<T> = std::result::Result<T, BalanceError>;
