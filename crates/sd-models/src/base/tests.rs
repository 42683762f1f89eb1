//! Tests for test outcomes, records and aggregation

use approx::assert_abs_diff_eq;

use super::*;

fn passing() -> TestResult {
    TestResult::completed("Passing", TestStatistic::new(1.2, Some(2.0), 0.55))
}

fn rejecting() -> TestResult {
    TestResult::completed("Rejecting", TestStatistic::new(14.0, Some(2.0), 0.001))
}

fn failing() -> TestResult {
    TestResult::failed(
        "Failing",
        ModelError::InsufficientObservations {
            required: 20,
            actual: 8,
        },
    )
}

#[test]
fn test_decision_flags() {
    assert!(passing().null_holds());
    assert!(!passing().rejects_null());
    assert!(!rejecting().null_holds());
    assert!(rejecting().rejects_null());
    // Failures keep the null hypothesis
    assert!(failing().null_holds());
    assert!(!failing().is_completed());
}

#[test]
fn test_p_value_at_threshold_rejects() {
    let result = TestResult::completed("Edge", TestStatistic::new(3.0, None, SIGNIFICANCE_LEVEL));
    assert!(result.rejects_null());
}

#[test]
fn test_accessors() {
    let result = passing();
    assert_eq!(result.statistic(), Some(1.2));
    assert_eq!(result.df(), Some(2.0));
    assert_eq!(result.p_value(), Some(0.55));
    assert!(result.error().is_none());

    let result = failing();
    assert_eq!(result.statistic(), None);
    assert_eq!(result.p_value(), None);
    assert!(matches!(
        result.error(),
        Some(ModelError::InsufficientObservations { .. })
    ));
}

#[test]
fn test_non_finite_statistics_become_failures() {
    let result = TestResult::from_result("NaN", Ok(TestStatistic::new(f64::NAN, None, 0.5)));
    assert!(!result.is_completed());
    assert!(matches!(
        result.error(),
        Some(ModelError::NumericalError { .. })
    ));

    let result = TestResult::from_result("Err", Err(ModelError::SingularMatrix));
    assert_eq!(result.error(), Some(&ModelError::SingularMatrix));
}

#[test]
fn test_aggregate_verdict() {
    assert!(aggregate_verdict(&[passing(), failing()]));
    assert!(!aggregate_verdict(&[passing(), rejecting(), failing()]));
    // Nothing completed: assume the null hypothesis
    assert!(aggregate_verdict(&[failing(), failing()]));
    assert!(aggregate_verdict(&Vec::<TestResult>::new()));
}

#[test]
fn test_record_serialization() {
    let record = rejecting().to_record(Hypothesis::Homoscedasticity);
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["testName"], "Rejecting");
    assert_eq!(json["statistic"], 14.0);
    assert_eq!(json["df"], 2.0);
    assert_eq!(json["pValue"], 0.001);
    assert_eq!(json["isHomoscedastic"], false);
    assert_eq!(json["criticalValue"], 0.05);
    assert!(json.get("error").is_none());
    assert!(json.get("isNormal").is_none());
}

#[test]
fn test_failed_record_has_nulls_and_error() {
    let record = failing().to_record(Hypothesis::Normality);
    let json = serde_json::to_value(&record).unwrap();
    assert!(json["statistic"].is_null());
    assert!(json["pValue"].is_null());
    assert!(json.get("df").is_none());
    assert_eq!(json["isNormal"], true);
    assert_eq!(
        json["error"],
        "Not enough observations: 20 required, got 8"
    );

    let back: TestRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, record);
    assert!(back.verdict.holds());
}

#[test]
fn test_model_statistics_from_sums() {
    let stats = ModelStatistics::from_sums(2.0, 10.0, 12, 2);
    assert_abs_diff_eq!(stats.r_squared, 0.8, epsilon = 1e-12);
    assert_eq!(stats.df_residual, 9);
    assert_eq!(stats.df_model, 2);
    // 1 − 0.2 · 11/9
    assert_abs_diff_eq!(stats.adj_r_squared.unwrap(), 1.0 - 0.2 * 11.0 / 9.0, epsilon = 1e-12);
    assert_abs_diff_eq!(stats.residual_std_error.unwrap(), (2.0f64 / 9.0).sqrt(), epsilon = 1e-12);
    // (8/2) / (2/9) = 18
    assert_abs_diff_eq!(stats.f_statistic.unwrap(), 18.0, epsilon = 1e-12);
    assert!(stats.f_p_value.unwrap() < 0.001);
}

#[test]
fn test_model_statistics_degenerate_cases() {
    let constant = ModelStatistics::from_sums(0.0, 0.0, 10, 1);
    assert_eq!(constant.r_squared, 0.0);
    assert!(constant.f_statistic.is_none());

    let saturated = ModelStatistics::from_sums(0.0, 5.0, 2, 1);
    assert_eq!(saturated.df_residual, 0);
    assert!(saturated.adj_r_squared.is_none());
    assert!(saturated.residual_std_error.is_none());
}

#[test]
fn test_residual_statistics() {
    let stats = ResidualStatistics::from_residuals(&[-1.0, 0.0, 1.0]);
    assert_eq!(stats.count, 3);
    assert_abs_diff_eq!(stats.mean, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(stats.std_dev, 1.0, epsilon = 1e-12);
    assert_eq!(stats.min, -1.0);
    assert_eq!(stats.max, 1.0);

    assert_eq!(ResidualStatistics::from_residuals(&[]), ResidualStatistics::default());
    assert_eq!(ResidualStatistics::from_residuals(&[2.5]).std_dev, 0.0);
}
