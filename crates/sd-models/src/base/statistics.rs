//! Statistical structures for model results

use serde::{Deserialize, Serialize};

use sd_core::{special, stats};

/// Goodness-of-fit statistics of a least-squares model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStatistics {
    /// R-squared; 0 when the response is constant
    pub r_squared: f64,
    /// Adjusted R-squared, undefined without residual degrees of freedom
    pub adj_r_squared: Option<f64>,
    /// Residual standard error
    pub residual_std_error: Option<f64>,
    /// Overall F-statistic
    pub f_statistic: Option<f64>,
    /// F-statistic p-value
    pub f_p_value: Option<f64>,
    /// Sum of squared errors
    pub sse: f64,
    /// Total sum of squares about the mean of y
    pub sst: f64,
    /// Residual degrees of freedom (n − p − 1)
    pub df_residual: usize,
    /// Model degrees of freedom (p)
    pub df_model: usize,
}

impl ModelStatistics {
    /// Derive the statistics from the sums of squares.
    ///
    /// `n_predictors` excludes the intercept.
    pub fn from_sums(sse: f64, sst: f64, n_obs: usize, n_predictors: usize) -> Self {
        let r_squared = if sst > 0.0 { 1.0 - sse / sst } else { 0.0 };
        let df_residual = n_obs.saturating_sub(n_predictors + 1);
        let df_model = n_predictors;

        let (adj_r_squared, residual_std_error) = if df_residual > 0 {
            let n = n_obs as f64;
            let adj = 1.0 - (1.0 - r_squared) * ((n - 1.0) / df_residual as f64);
            (Some(adj), Some((sse / df_residual as f64).sqrt()))
        } else {
            (None, None)
        };

        let (f_statistic, f_p_value) = if df_residual > 0 && df_model > 0 && sse > 0.0 {
            let f = ((sst - sse) / df_model as f64) / (sse / df_residual as f64);
            let p = 1.0 - special::f_cdf(f, df_model as f64, df_residual as f64);
            (Some(f), Some(p))
        } else {
            (None, None)
        };

        Self {
            r_squared,
            adj_r_squared,
            residual_std_error,
            f_statistic,
            f_p_value,
            sse,
            sst,
            df_residual,
            df_model,
        }
    }
}

/// Residual summary reported next to each diagnostic suite
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidualStatistics {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; 0 with fewer than two residuals
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl ResidualStatistics {
    pub fn from_residuals(residuals: &[f64]) -> Self {
        if residuals.is_empty() {
            return Self::default();
        }
        Self {
            count: residuals.len(),
            mean: stats::mean(residuals).unwrap_or(0.0),
            std_dev: stats::std_dev(residuals).unwrap_or(0.0),
            min: stats::min(residuals).unwrap_or(0.0),
            max: stats::max(residuals).unwrap_or(0.0),
        }
    }
}
