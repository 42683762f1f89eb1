//! Request and response payloads
//!
//! Each analysis has a serde request type and an entry point returning a
//! response type, all camelCase on the wire. Malformed input (empty or
//! mismatched arrays, ragged matrices, invalid configuration) is returned as
//! an `Err`. Anything that goes wrong after the input is accepted, including
//! a main regression that cannot be fitted, ends up inside a well-formed
//! response instead.

use std::fmt;
use std::str::FromStr;

use ndarray::Axis;
use serde::{Deserialize, Serialize};

use sd_core::data::{DataError, IndependentData, MissingSpec};
use sd_core::frequency::{FrequencyRow, FrequencyTable, PercentileMethod};
use sd_core::linalg::Matrix;

use crate::base::{
    Coefficient, Hypothesis, ModelError, ModelStatistics, ResidualStatistics, Result, TestRecord,
    TestResult,
};
use crate::goodness_of_fit::{GoodnessOfFit, GoodnessOfFitConfig, chi_square_goodness_of_fit};
use crate::homoscedasticity::{
    HomoscedasticityConfig, HomoscedasticitySuite, homoscedasticity_tests,
};
use crate::lm::{OlsFit, fit_ols};
use crate::normality::{Descriptives, NormalityConfig, NormalitySuite, normality_tests};

pub mod visualization;


pub use visualization::{DistributionPlots, RegressionPlots};

// ==================== Regression Input ====================

/// Name and display label of a predictor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableInfo {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Dependent vector and predictors of a regression-based diagnostic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionRequest {
    pub dependent_data: Vec<f64>,
    pub independent_data: IndependentData,
    #[serde(default)]
    pub independent_variable_infos: Vec<VariableInfo>,
}

/// Complete cases ready for fitting
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRegression {
    pub y: Vec<f64>,
    /// Observation-major predictors
    pub x: Matrix,
    /// Rows removed for a non-finite value
    pub dropped: usize,
}

impl RegressionRequest {
    pub fn new(dependent_data: Vec<f64>, independent_data: impl Into<IndependentData>) -> Self {
        Self {
            dependent_data,
            independent_data: independent_data.into(),
            independent_variable_infos: Vec::new(),
        }
    }

    pub fn with_variables(mut self, infos: Vec<VariableInfo>) -> Self {
        self.independent_variable_infos = infos;
        self
    }

    /// Normalize the predictors and drop incomplete rows listwise
    pub fn prepare(&self) -> Result<PreparedRegression> {
        if self.dependent_data.is_empty() {
            return Err(DataError::EmptyInput("dependent data").into());
        }
        let x = self.independent_data.to_observation_major()?;
        if x.nrows() != self.dependent_data.len() {
            return Err(DataError::DimensionMismatch {
                expected: format!("{} observations", self.dependent_data.len()),
                actual: format!("{} observations", x.nrows()),
            }
            .into());
        }

        let keep: Vec<usize> = (0..x.nrows())
            .filter(|&i| {
                self.dependent_data[i].is_finite() && x.row(i).iter().all(|v| v.is_finite())
            })
            .collect();
        let dropped = x.nrows() - keep.len();
        if dropped > 0 {
            log::warn!("dropped {} incomplete observations before fitting", dropped);
        }

        Ok(PreparedRegression {
            y: keep.iter().map(|&i| self.dependent_data[i]).collect(),
            x: x.select(Axis(0), &keep),
            dropped,
        })
    }

    /// Predictor names, falling back to positional names
    pub fn variable_names(&self, count: usize) -> Vec<String> {
        (0..count)
            .map(|i| match self.independent_variable_infos.get(i) {
                Some(info) if !info.name.is_empty() => info.name.clone(),
                _ => format!("x{}", i + 1),
            })
            .collect()
    }

    /// Prepare the data and fit it.
    ///
    /// Only input errors are returned as `Err`; a fit that fails comes
    /// back in the inner result.
    pub fn fit(&self) -> Result<Result<OlsFit>> {
        let prepared = self.prepare()?;
        Ok(fit_ols(&prepared.y, &prepared.x))
    }

    /// Coefficient table labelled from the variable metadata
    pub fn coefficients(&self, fit: &OlsFit) -> Vec<Coefficient> {
        let names = self.variable_names(fit.n_predictors());
        fit.to_coefficients(&names)
            .into_iter()
            .enumerate()
            .map(|(i, coef)| {
                let label = i
                    .checked_sub(1)
                    .and_then(|j| self.independent_variable_infos.get(j))
                    .and_then(|info| info.label.clone());
                match label {
                    Some(label) => coef.with_label(label),
                    None => coef,
                }
            })
            .collect()
    }
}

fn record(result: &Option<TestResult>, hypothesis: Hypothesis) -> Option<TestRecord> {
    result.as_ref().map(|r| r.to_record(hypothesis))
}

// ==================== Homoscedasticity ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomoscedasticityRequest {
    #[serde(flatten)]
    pub regression: RegressionRequest,
    #[serde(default)]
    pub config: HomoscedasticityConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomoscedasticityTests {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breusch_pagan: Option<TestRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white: Option<TestRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goldfeld_quandt: Option<TestRecord>,
}

impl From<&HomoscedasticitySuite> for HomoscedasticityTests {
    fn from(suite: &HomoscedasticitySuite) -> Self {
        let hypothesis = Hypothesis::Homoscedasticity;
        Self {
            breusch_pagan: record(&suite.breusch_pagan, hypothesis),
            white: record(&suite.white, hypothesis),
            goldfeld_quandt: record(&suite.goldfeld_quandt, hypothesis),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomoscedasticityResponse {
    pub title: String,
    pub description: String,
    pub is_homoscedastic: bool,
    pub tests: HomoscedasticityTests,
    pub residual_stats: ResidualStatistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelStatistics>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coefficients: Vec<Coefficient>,
    pub visualizations: RegressionPlots,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HomoscedasticityResponse {
    const TITLE: &'static str = "Homoscedasticity Tests";
    const DESCRIPTION: &'static str =
        "Tests whether the variance of the regression residuals is constant across observations.";

    fn new(suite: &HomoscedasticitySuite) -> Self {
        Self {
            title: Self::TITLE.to_string(),
            description: Self::DESCRIPTION.to_string(),
            is_homoscedastic: suite.is_homoscedastic,
            tests: suite.into(),
            residual_stats: ResidualStatistics::default(),
            model: None,
            coefficients: Vec::new(),
            visualizations: RegressionPlots::default(),
            error: None,
        }
    }
}

/// Fit the regression and run the homoscedasticity suite on its residuals
pub fn run_homoscedasticity(request: &HomoscedasticityRequest) -> Result<HomoscedasticityResponse> {
    let config = &request.config;
    let fit = request.regression.fit()?;

    let fit = match fit {
        Ok(fit) => fit,
        Err(err) => {
            log::warn!("regression could not be fitted: {}", err);
            let suite = HomoscedasticitySuite::failed(&err, config);
            let mut response = HomoscedasticityResponse::new(&suite);
            response.error = Some(err.to_string());
            return Ok(response);
        }
    };

    let suite = homoscedasticity_tests(&fit, config);
    let residuals = fit.residuals();
    let scale = fit.statistics.residual_std_error.unwrap_or(0.0);

    let mut response = HomoscedasticityResponse::new(&suite);
    response.residual_stats = ResidualStatistics::from_residuals(&residuals);
    response.model = Some(fit.statistics);
    response.coefficients = request.regression.coefficients(&fit);
    response.visualizations = RegressionPlots::new(&fit.fitted_values(), &residuals, scale);
    Ok(response)
}

// ==================== Normality ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalityRequest {
    #[serde(flatten)]
    pub regression: RegressionRequest,
    #[serde(default)]
    pub config: NormalityConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalityTests {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kolmogorov_smirnov: Option<TestRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jarque_bera: Option<TestRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shapiro_wilk: Option<TestRecord>,
}

impl From<&NormalitySuite> for NormalityTests {
    fn from(suite: &NormalitySuite) -> Self {
        let hypothesis = Hypothesis::Normality;
        Self {
            kolmogorov_smirnov: record(&suite.kolmogorov_smirnov, hypothesis),
            jarque_bera: record(&suite.jarque_bera, hypothesis),
            shapiro_wilk: record(&suite.shapiro_wilk, hypothesis),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalityResponse {
    pub title: String,
    pub description: String,
    pub is_normal: bool,
    pub tests: NormalityTests,
    pub residual_stats: ResidualStatistics,
    pub descriptives: Descriptives,
    pub visualizations: DistributionPlots,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NormalityResponse {
    const TITLE: &'static str = "Normality Tests";
    const DESCRIPTION: &'static str =
        "Tests whether the regression residuals follow a normal distribution.";

    fn new(suite: &NormalitySuite) -> Self {
        Self {
            title: Self::TITLE.to_string(),
            description: Self::DESCRIPTION.to_string(),
            is_normal: suite.is_normal,
            tests: suite.into(),
            residual_stats: ResidualStatistics::default(),
            descriptives: suite.descriptives,
            visualizations: DistributionPlots::default(),
            error: None,
        }
    }
}

/// Fit the regression and run the normality suite on its residuals
pub fn run_normality(request: &NormalityRequest) -> Result<NormalityResponse> {
    let config = &request.config;
    let fit = request.regression.fit()?;

    let fit = match fit {
        Ok(fit) => fit,
        Err(err) => {
            log::warn!("regression could not be fitted: {}", err);
            let suite = NormalitySuite::failed(&err, config);
            let mut response = NormalityResponse::new(&suite);
            response.error = Some(err.to_string());
            return Ok(response);
        }
    };

    let residuals = fit.residuals();
    let suite = normality_tests(&residuals, config);

    let mut response = NormalityResponse::new(&suite);
    response.residual_stats = ResidualStatistics::from_residuals(&residuals);
    response.visualizations = DistributionPlots::new(&residuals, config.histogram_bins);
    Ok(response)
}

// ==================== Frequencies ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyRequest {
    pub data: Vec<f64>,
    #[serde(default)]
    pub weights: Option<Vec<f64>>,
    #[serde(default)]
    pub missing: MissingSpec,
    /// Percentiles to report, on the 0–100 scale
    #[serde(default)]
    pub percentiles: Vec<f64>,
    #[serde(default)]
    pub method: PercentileMethod,
}

impl FrequencyRequest {
    pub fn new(data: Vec<f64>) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn with_missing(mut self, missing: MissingSpec) -> Self {
        self.missing = missing;
        self
    }

    pub fn table(&self) -> Result<FrequencyTable> {
        Ok(FrequencyTable::with_missing(
            &self.data,
            self.weights.as_deref(),
            &self.missing,
        )?)
    }

    /// Single percentile `p` (0–100) under `method`
    pub fn percentile(&self, p: f64, method: PercentileMethod) -> Result<f64> {
        Ok(self.table()?.percentile(p, method)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileValue {
    pub p: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyResponse {
    pub rows: Vec<FrequencyRow>,
    pub total_weight: f64,
    pub median: f64,
    pub mode: f64,
    pub method: PercentileMethod,
    pub percentiles: Vec<PercentileValue>,
}

/// Frequency table and the requested percentiles
pub fn run_frequency(request: &FrequencyRequest) -> Result<FrequencyResponse> {
    let table = request.table()?;
    let values = table.percentiles(&request.percentiles, request.method)?;

    Ok(FrequencyResponse {
        rows: table.rows(),
        total_weight: table.total_weight(),
        median: table.median(),
        mode: table.mode(),
        method: request.method,
        percentiles: request
            .percentiles
            .iter()
            .zip(values)
            .map(|(&p, value)| PercentileValue { p, value })
            .collect(),
    })
}

// ==================== Goodness of Fit ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodnessOfFitRequest {
    pub data: Vec<f64>,
    #[serde(default)]
    pub missing: MissingSpec,
    #[serde(default)]
    pub config: GoodnessOfFitConfig,
}

pub fn run_goodness_of_fit(request: &GoodnessOfFitRequest) -> Result<GoodnessOfFit> {
    chi_square_goodness_of_fit(&request.data, &request.missing, &request.config)
}

// ==================== JSON Boundary ====================

/// Analyses reachable through [`handle_json`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisKind {
    Homoscedasticity,
    Normality,
    Frequency,
    GoodnessOfFit,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Homoscedasticity => "homoscedasticity",
            AnalysisKind::Normality => "normality",
            AnalysisKind::Frequency => "frequency",
            AnalysisKind::GoodnessOfFit => "goodnessOfFit",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "homoscedasticity" => Ok(AnalysisKind::Homoscedasticity),
            "normality" => Ok(AnalysisKind::Normality),
            "frequency" => Ok(AnalysisKind::Frequency),
            "goodnessOfFit" => Ok(AnalysisKind::GoodnessOfFit),
            other => Err(ModelError::InvalidRequest {
                message: format!("unknown analysis '{}'", other),
            }),
        }
    }
}

fn invalid_request(err: serde_json::Error) -> ModelError {
    ModelError::InvalidRequest {
        message: err.to_string(),
    }
}

fn decode<T: for<'de> Deserialize<'de>>(payload: &str) -> Result<T> {
    serde_json::from_str(payload).map_err(invalid_request)
}

fn encode<T: Serialize>(response: &T) -> Result<String> {
    serde_json::to_string(response).map_err(invalid_request)
}

/// Decode a JSON request of the given kind, run it and encode the response
pub fn handle_json(kind: AnalysisKind, payload: &str) -> Result<String> {
    log::debug!("handling {} request ({} bytes)", kind, payload.len());
    match kind {
        AnalysisKind::Homoscedasticity => encode(&run_homoscedasticity(&decode(payload)?)?),
        AnalysisKind::Normality => encode(&run_normality(&decode(payload)?)?),
        AnalysisKind::Frequency => encode(&run_frequency(&decode(payload)?)?),
        AnalysisKind::GoodnessOfFit => encode(&run_goodness_of_fit(&decode(payload)?)?),
    }
}
