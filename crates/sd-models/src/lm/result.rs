//! Linear regression result structure
//!
//! An [`OlsFit`] holds everything one least-squares fit produced. It is
//! built once by [`fit_ols`](crate::lm::fit_ols) and never mutated; the
//! diagnostic tests read residuals and fitted values from it.

use std::fmt;

use sd_core::linalg::{self, Matrix, Vector};
use sd_core::special;

use crate::base::{Coefficient, ModelStatistics, ModelSummary, ResidualStatistics, Result};

/// Name given to the intercept coefficient
pub const INTERCEPT_NAME: &str = "(Intercept)";

/// OLS linear regression result
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    /// Coefficients (β), intercept first
    pub coefficients: Vector,
    /// Standard errors, absent without residual degrees of freedom
    pub standard_errors: Option<Vector>,
    /// Fitted values (ŷ)
    pub fitted_values: Vector,
    /// Residuals (y − ŷ)
    pub residuals: Vector,
    /// Predictors without the intercept column
    pub x: Matrix,
    /// Response vector (y)
    pub y: Vector,
    /// Model statistics
    pub statistics: ModelStatistics,
}

impl OlsFit {
    /// Get the number of observations
    pub fn n_obs(&self) -> usize {
        self.y.len()
    }

    /// Get the number of predictors (excluding intercept)
    pub fn n_predictors(&self) -> usize {
        self.x.ncols()
    }

    /// Sum of squared errors
    pub fn sse(&self) -> f64 {
        self.statistics.sse
    }

    /// Total sum of squares
    pub fn sst(&self) -> f64 {
        self.statistics.sst
    }

    pub fn r_squared(&self) -> f64 {
        self.statistics.r_squared
    }

    pub fn adj_r_squared(&self) -> Option<f64> {
        self.statistics.adj_r_squared
    }

    pub fn residuals(&self) -> Vec<f64> {
        self.residuals.to_vec()
    }

    pub fn fitted_values(&self) -> Vec<f64> {
        self.fitted_values.to_vec()
    }

    /// Predict responses for new predictor rows
    pub fn predict(&self, x_new: &Matrix) -> Result<Vector> {
        let design = linalg::with_intercept(x_new);
        Ok(linalg::multiply_vector(&design, &self.coefficients)?)
    }

    /// Coefficient table with t-statistics and two-sided p-values.
    ///
    /// `names` label the predictors in order; missing names fall back to
    /// `x1`, `x2`, ...
    pub fn to_coefficients(&self, names: &[String]) -> Vec<Coefficient> {
        let df = self.statistics.df_residual as f64;

        self.coefficients
            .iter()
            .enumerate()
            .map(|(i, &estimate)| {
                let mut coef = if i == 0 {
                    Coefficient::new(INTERCEPT_NAME, estimate).as_intercept()
                } else {
                    let name = names
                        .get(i - 1)
                        .cloned()
                        .unwrap_or_else(|| format!("x{}", i));
                    Coefficient::new(name, estimate)
                };

                let se = self.standard_errors.as_ref().map(|se| se[i]);
                if let Some(se) = se {
                    coef = coef.with_std_error(se);
                    if se > 0.0 {
                        let t = estimate / se;
                        let p = 2.0 * (1.0 - special::student_t_cdf(t.abs(), df));
                        coef = coef.with_t_stat(t).with_p_value(p);
                    }
                }
                coef
            })
            .collect()
    }

    /// Generate a model summary
    pub fn summary(&self, names: &[String]) -> ModelSummary {
        ModelSummary {
            n_obs: self.n_obs(),
            n_predictors: self.n_predictors(),
            coefficients: self.to_coefficients(names),
            model_statistics: self.statistics,
            residual_statistics: ResidualStatistics::from_residuals(&self.residuals()),
        }
    }
}

impl fmt::Display for OlsFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary(&[]))
    }
}
