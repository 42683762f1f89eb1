//! # sd-models
//!
//! Statistical procedures of StatDiag built on `sd-core`: ordinary least
//! squares, residual diagnostics for homoscedasticity and normality, the
//! categorical chi-square goodness-of-fit test and the serde request
//! boundary that ties them together.

pub mod base;
pub mod error;
pub mod goodness_of_fit;
pub mod homoscedasticity;
pub mod lm;
pub mod normality;
pub mod request;

pub use base::{
    Hypothesis, Result, SIGNIFICANCE_LEVEL, TestOutcome, TestRecord, TestResult, TestStatistic,
    Verdict,
};
pub use error::ModelError;
pub use goodness_of_fit::{GoodnessOfFit, GoodnessOfFitConfig, chi_square_goodness_of_fit};
pub use homoscedasticity::{
    HomoscedasticityConfig, HomoscedasticitySuite, homoscedasticity_tests,
};
pub use lm::{OlsFit, fit_ols};
pub use normality::{NormalityConfig, NormalitySuite, normality_tests};
pub use request::{
    AnalysisKind, handle_json, run_frequency, run_goodness_of_fit, run_homoscedasticity,
    run_normality,
};
