//! Residual diagnostics for constant error variance
//!
//! Three tests of the null hypothesis that the regression errors are
//! homoscedastic:
//!
//! - **Breusch-Pagan**: squared residuals, scaled by their mean, regressed
//!   on the predictors; n·R² is chi-square with one df per predictor.
//! - **White**: squared residuals regressed on ŷ and ŷ²; n·R² is
//!   chi-square(2).
//! - **Goldfeld-Quandt**: observations sorted by the first predictor, the
//!   middle third dropped, and the residual variances of the two outer
//!   groups compared with an F test.
//!
//! The suite runner isolates failures: a test that cannot be computed is
//! recorded as failed and the others still run.

use ndarray::Axis;
use serde::{Deserialize, Serialize};

use sd_core::data::DataError;
use sd_core::linalg::Matrix;
use sd_core::{special, stats};

use crate::base::{ModelError, Result, TestResult, TestStatistic, aggregate_verdict};
use crate::lm::{OlsFit, fit_ols};


pub const BREUSCH_PAGAN: &str = "Breusch-Pagan Test";
pub const WHITE: &str = "White Test";
pub const GOLDFELD_QUANDT: &str = "Goldfeld-Quandt Test";

/// Leading-group RSS at or below this fraction of the group's SST is zero
const ZERO_RSS_TOLERANCE: f64 = 1e-12;

// ==================== Configuration ====================

/// Which homoscedasticity tests to run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HomoscedasticityConfig {
    pub breusch_pagan: bool,
    pub white: bool,
    pub goldfeld_quandt: bool,
    /// Smallest sample the Goldfeld-Quandt split is attempted on
    pub goldfeld_quandt_min_obs: usize,
}

impl Default for HomoscedasticityConfig {
    fn default() -> Self {
        Self {
            breusch_pagan: true,
            white: true,
            goldfeld_quandt: true,
            goldfeld_quandt_min_obs: 20,
        }
    }
}

// ==================== Individual Tests ====================

/// Breusch-Pagan test of the residuals against the predictors in `x`
pub fn breusch_pagan(x: &Matrix, residuals: &[f64]) -> Result<TestStatistic> {
    let n = residuals.len();
    check_rows(x, n)?;

    let squared: Vec<f64> = residuals.iter().map(|e| e * e).collect();
    let mean_sq = stats::mean(&squared).ok_or(DataError::EmptyInput("residuals"))?;
    if mean_sq <= 0.0 {
        return Err(ModelError::ZeroVariance {
            context: "squared residuals",
        });
    }
    let scaled: Vec<f64> = squared.iter().map(|s| s / mean_sq).collect();

    let auxiliary = fit_ols(&scaled, x)?;
    let statistic = n as f64 * auxiliary.r_squared();
    let df = x.ncols() as f64;
    let p_value = special::chi_square_sf(statistic, df);

    log::debug!("Breusch-Pagan: LM = {:.6}, df = {}, p = {:.6}", statistic, df, p_value);
    Ok(TestStatistic::new(statistic, Some(df), p_value))
}

/// White test of the squared residuals against ŷ and ŷ²
pub fn white(fitted: &[f64], residuals: &[f64]) -> Result<TestStatistic> {
    let n = residuals.len();
    if fitted.len() != n {
        return Err(DataError::DimensionMismatch {
            expected: format!("{} fitted values", n),
            actual: format!("{} fitted values", fitted.len()),
        }
        .into());
    }

    let squared: Vec<f64> = residuals.iter().map(|e| e * e).collect();
    let design = Matrix::from_shape_fn((n, 2), |(i, j)| {
        if j == 0 { fitted[i] } else { fitted[i] * fitted[i] }
    });

    let auxiliary = fit_ols(&squared, &design)?;
    let statistic = n as f64 * auxiliary.r_squared();
    let df = 2.0;
    let p_value = special::chi_square_sf(statistic, df);

    log::debug!("White: LM = {:.6}, p = {:.6}", statistic, p_value);
    Ok(TestStatistic::new(statistic, Some(df), p_value))
}

/// Goldfeld-Quandt test, ordering observations by the first predictor.
///
/// Each outer group holds ⌊n/3⌋ observations; the remainder in the middle
/// is discarded. The p-value is the F(df, df) CDF below 1 and its upper
/// tail above 1.
pub fn goldfeld_quandt(x: &Matrix, y: &[f64], min_obs: usize) -> Result<TestStatistic> {
    let n = y.len();
    if n < min_obs {
        return Err(ModelError::InsufficientObservations {
            required: min_obs,
            actual: n,
        });
    }
    check_rows(x, n)?;

    let k = x.ncols();
    if k == 0 {
        return Err(DataError::EmptyInput("predictors").into());
    }
    let group = n / 3;
    if group < k + 1 {
        return Err(ModelError::InsufficientGroupSize {
            required: k + 1,
            actual: group,
        });
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| x[(a, 0)].total_cmp(&x[(b, 0)]));

    let leading = fit_group(x, y, &order[..group])?;
    let trailing = fit_group(x, y, &order[n - group..])?;

    if leading.sse() <= ZERO_RSS_TOLERANCE * leading.sst() {
        return Err(ModelError::ZeroVariance {
            context: "leading group residuals",
        });
    }

    let df = (group - k) as f64;
    let statistic = (trailing.sse() / df) / (leading.sse() / df);
    let cdf = special::f_cdf(statistic, df, df);
    let p_value = if statistic < 1.0 { cdf } else { 1.0 - cdf };

    log::debug!(
        "Goldfeld-Quandt: F = {:.6}, df = ({}, {}), p = {:.6}",
        statistic,
        df,
        df,
        p_value
    );
    Ok(TestStatistic::new(statistic, Some(df), p_value))
}

fn fit_group(x: &Matrix, y: &[f64], rows: &[usize]) -> Result<OlsFit> {
    let x_group = x.select(Axis(0), rows);
    let y_group: Vec<f64> = rows.iter().map(|&i| y[i]).collect();
    fit_ols(&y_group, &x_group)
}

fn check_rows(x: &Matrix, n: usize) -> Result<()> {
    if x.nrows() != n {
        return Err(DataError::DimensionMismatch {
            expected: format!("{} rows", n),
            actual: format!("{} rows", x.nrows()),
        }
        .into());
    }
    Ok(())
}

// ==================== Suite ====================

/// Results of the enabled homoscedasticity tests
#[derive(Debug, Clone, PartialEq)]
pub struct HomoscedasticitySuite {
    pub breusch_pagan: Option<TestResult>,
    pub white: Option<TestResult>,
    pub goldfeld_quandt: Option<TestResult>,
    /// Homoscedastic unless a completed test rejects
    pub is_homoscedastic: bool,
}

impl HomoscedasticitySuite {
    /// Every enabled test failed with the same error, e.g. when the main
    /// regression could not be fitted
    pub fn failed(error: &ModelError, config: &HomoscedasticityConfig) -> Self {
        let fail = |enabled: bool, name: &str| {
            enabled.then(|| TestResult::failed(name, error.clone()))
        };
        Self {
            breusch_pagan: fail(config.breusch_pagan, BREUSCH_PAGAN),
            white: fail(config.white, WHITE),
            goldfeld_quandt: fail(config.goldfeld_quandt, GOLDFELD_QUANDT),
            is_homoscedastic: true,
        }
    }

    /// Results of the tests that ran
    pub fn results(&self) -> impl Iterator<Item = &TestResult> {
        [&self.breusch_pagan, &self.white, &self.goldfeld_quandt]
            .into_iter()
            .flatten()
    }
}

/// Run the configured tests on a fitted model
pub fn homoscedasticity_tests(
    fit: &OlsFit,
    config: &HomoscedasticityConfig,
) -> HomoscedasticitySuite {
    let residuals = fit.residuals();
    let fitted = fit.fitted_values();
    let y = fit.y.to_vec();

    let breusch_pagan = config
        .breusch_pagan
        .then(|| TestResult::from_result(BREUSCH_PAGAN, breusch_pagan(&fit.x, &residuals)));
    let white = config
        .white
        .then(|| TestResult::from_result(WHITE, white(&fitted, &residuals)));
    let goldfeld_quandt = config.goldfeld_quandt.then(|| {
        TestResult::from_result(
            GOLDFELD_QUANDT,
            goldfeld_quandt(&fit.x, &y, config.goldfeld_quandt_min_obs),
        )
    });

    let is_homoscedastic =
        aggregate_verdict([&breusch_pagan, &white, &goldfeld_quandt].into_iter().flatten());

    HomoscedasticitySuite {
        breusch_pagan,
        white,
        goldfeld_quandt,
        is_homoscedastic,
    }
}
