use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("oracle call budget exhausted for kind '{kind}'")]
    BudgetExhausted { kind: String },

    #[error("oracle request timed out")]
    Timeout,

    #[error("oracle transport error: {0}")]
    Transport(String),

    #[error("oracle returned words that do not conform to the requested pattern")]
    PatternMismatch,
}
