//! Model-related error types

use thiserror::Error;

use sd_core::CoreError;
use sd_core::data::DataError;

/// Model-related errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// Error raised by the core numerics
    #[error("Core error: {0}")]
    Core(CoreError),

    /// Numerical computation error
    #[error("Numerical error: {message} (operation: {operation})")]
    NumericalError {
        /// Error message
        message: String,
        /// Operation that failed
        operation: String,
    },

    /// More parameters than observations
    #[error("Underdetermined system: {n_samples} samples for {n_predictors} predictors")]
    Underdetermined {
        /// Number of samples
        n_samples: usize,
        /// Number of predictors, intercept excluded
        n_predictors: usize,
    },

    /// Singular matrix encountered
    #[error("Singular matrix encountered")]
    SingularMatrix,

    #[error("Not enough observations: {required} required, got {actual}")]
    InsufficientObservations { required: usize, actual: usize },

    #[error("Group too small: {required} observations required per group, got {actual}")]
    InsufficientGroupSize { required: usize, actual: usize },

    /// A variance used as a denominator is zero
    #[error("Zero variance in {context}")]
    ZeroVariance { context: &'static str },

    /// Invalid model configuration
    #[error("Invalid model configuration: {message}")]
    InvalidConfig {
        /// Configuration error message
        message: String,
    },

    /// Request payload that could not be decoded or encoded
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl From<CoreError> for ModelError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SingularMatrix => ModelError::SingularMatrix,
            other => ModelError::Core(other),
        }
    }
}

impl From<DataError> for ModelError {
    fn from(err: DataError) -> Self {
        ModelError::Core(CoreError::Data(err))
    }
}
