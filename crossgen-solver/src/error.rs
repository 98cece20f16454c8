use thiserror::Error;

use crossgen_grid::GridError;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("grid is structurally invalid: {0:?}")]
    Structural(Vec<GridError>),

    #[error("config could not be parsed: {0}")]
    Config(String),

    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
}
