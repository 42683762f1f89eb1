//! Ordinary Least Squares (OLS) linear regression
//!
//! Closed-form estimator β = (XᵗX)⁻¹Xᵗy on a design matrix with a prepended
//! intercept column. XᵗX is inverted with [`sd_core::linalg::invert`], so a
//! rank-deficient design surfaces as [`ModelError::SingularMatrix`].

use sd_core::data::DataError;
use sd_core::linalg::{self, Matrix, Vector};

use crate::base::{ModelError, ModelStatistics, Result};
use crate::lm::result::OlsFit;

// ==================== Fitting ====================

/// Fit y on the predictors in `x` (rows = observations, no intercept column).
///
/// Fails with `Underdetermined` when the predictor count is not strictly
/// below the observation count.
pub fn fit_ols(y: &[f64], x: &Matrix) -> Result<OlsFit> {
    let n = y.len();
    let p = x.ncols();

    if n == 0 || x.nrows() == 0 {
        return Err(DataError::EmptyInput("regression data").into());
    }
    if x.nrows() != n {
        return Err(DataError::DimensionMismatch {
            expected: format!("{} rows", n),
            actual: format!("{} rows", x.nrows()),
        }
        .into());
    }
    if p >= n {
        return Err(ModelError::Underdetermined {
            n_samples: n,
            n_predictors: p,
        });
    }
    if y.iter().chain(x.iter()).any(|v| !v.is_finite()) {
        return Err(DataError::NonFinite("regression data").into());
    }

    let y = Vector::from(y.to_vec());
    let design = linalg::with_intercept(x);
    let design_t = linalg::transpose(&design);

    let xtx = linalg::multiply(&design_t, &design)?;
    let xtx_inv = linalg::invert(&xtx)?;
    let xty = linalg::multiply_vector(&design_t, &y)?;
    let coefficients = linalg::multiply_vector(&xtx_inv, &xty)?;

    let fitted_values = linalg::multiply_vector(&design, &coefficients)?;
    let residuals = &y - &fitted_values;

    let y_mean = y.mean().unwrap_or(0.0);
    let sse = residuals.mapv(|r| r * r).sum();
    let sst = y.mapv(|v| (v - y_mean).powi(2)).sum();
    let statistics = ModelStatistics::from_sums(sse, sst, n, p);

    let standard_errors = standard_errors(&xtx_inv, sse, statistics.df_residual);

    log::debug!(
        "OLS fit: n = {}, p = {}, R² = {:.6}, SSE = {:.6}",
        n,
        p,
        statistics.r_squared,
        sse
    );

    Ok(OlsFit {
        coefficients,
        standard_errors,
        fitted_values,
        residuals,
        x: x.clone(),
        y,
        statistics,
    })
}

/// Standard errors sqrt(diag(σ² (XᵗX)⁻¹)) with σ² = SSE / df
fn standard_errors(xtx_inv: &Matrix, sse: f64, df_residual: usize) -> Option<Vector> {
    if df_residual == 0 {
        return None;
    }
    let sigma2 = sse / df_residual as f64;
    Some(xtx_inv.diag().mapv(|v| (sigma2 * v).max(0.0).sqrt()))
}
