use crate::data::DataError;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Matrix must be square and non-empty, got {rows}×{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("Singular matrix encountered")]
    SingularMatrix,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for core numerics
pub type Result<T> = std::result::Result<T, CoreError>;
