use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("insufficient data for product {product_id}: need at least {required} points, got {actual}")]
    InsufficientData {
        product_id: i64,
        required: usize,
        actual: usize,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
