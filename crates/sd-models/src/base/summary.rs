//! Model summary structures

use super::coefficient::Coefficient;
use super::statistics::{ModelStatistics, ResidualStatistics};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Printable summary of an OLS fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    /// Number of observations
    pub n_obs: usize,
    /// Number of predictors (excluding intercept)
    pub n_predictors: usize,
    /// Coefficients table
    pub coefficients: Vec<Coefficient>,
    /// Model statistics
    pub model_statistics: ModelStatistics,
    /// Residual statistics
    pub residual_statistics: ResidualStatistics,
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ordinary Least Squares")?;
        writeln!(f, "======================")?;
        writeln!(f, "Observations: {}", self.n_obs)?;
        writeln!(f, "Predictors: {}", self.n_predictors)?;
        writeln!(f)?;

        // Coefficients
        writeln!(f, "Coefficients:")?;
        writeln!(
            f,
            "{:<20} {:>12} {:>12} {:>12} {:>12}",
            "Term", "Estimate", "Std Error", "t-value", "p-value"
        )?;
        writeln!(
            f,
            "{:-<20} {:-<12} {:-<12} {:-<12} {:-<12}",
            "", "", "", "", ""
        )?;

        for coeff in &self.coefficients {
            writeln!(
                f,
                "{:<20} {:>12.6} {:>12.6} {:>12.6} {:>12.6}",
                coeff.display_name(),
                coeff.estimate,
                coeff.std_error.unwrap_or(f64::NAN),
                coeff.t_stat.unwrap_or(f64::NAN),
                coeff.p_value.unwrap_or(f64::NAN)
            )?;
        }
        writeln!(f)?;

        let stats = &self.model_statistics;
        writeln!(f, "Model Statistics:")?;
        writeln!(f, "  R-squared: {:.4}", stats.r_squared)?;
        if let Some(adj_r2) = stats.adj_r_squared {
            writeln!(f, "  Adjusted R-squared: {:.4}", adj_r2)?;
        }
        if let (Some(f_stat), Some(p)) = (stats.f_statistic, stats.f_p_value) {
            writeln!(f, "  F-statistic: {:.4} (p = {:.4})", f_stat, p)?;
        }
        if let Some(resid_se) = stats.residual_std_error {
            writeln!(f, "  Residual Std. Error: {:.4}", resid_se)?;
        }
        writeln!(f, "  Residual DF: {}", stats.df_residual)?;
        writeln!(f, "  Model DF: {}", stats.df_model)?;

        let resid = &self.residual_statistics;
        writeln!(
            f,
            "  Residuals: min {:.4}, max {:.4}, sd {:.4}",
            resid.min, resid.max, resid.std_dev
        )?;

        Ok(())
    }
}
