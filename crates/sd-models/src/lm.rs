//! Linear regression models
//!
//! Ordinary least squares is the only estimator: every residual diagnostic
//! starts from an [`OlsFit`], and the Breusch-Pagan, White and
//! Goldfeld-Quandt tests run auxiliary fits through [`fit_ols`].

pub mod ols;
pub mod result;


// Re-exports
pub use ols::fit_ols;
pub use result::{INTERCEPT_NAME, OlsFit};
