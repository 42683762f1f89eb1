//! Tests for the chi-square goodness-of-fit test

use approx::assert_abs_diff_eq;

use super::*;

const STAIRCASE: [f64; 10] = [1.0, 2.0, 2.0, 3.0, 3.0, 3.0, 4.0, 4.0, 4.0, 4.0];

fn run(data: &[f64], config: &GoodnessOfFitConfig) -> GoodnessOfFit {
    chi_square_goodness_of_fit(data, &MissingSpec::none(), config).unwrap()
}

// ==================== Categories From Data ====================

#[test]
fn test_equal_expected_from_data() {
    let result = run(&STAIRCASE, &GoodnessOfFitConfig::default());

    let categories: Vec<f64> = result.frequencies.iter().map(|f| f.category).collect();
    assert_eq!(categories, vec![1.0, 2.0, 3.0, 4.0]);
    assert!(result.frequencies.iter().all(|f| f.expected == 2.5));
    assert_eq!(result.frequencies[3].observed, 4.0);
    assert_abs_diff_eq!(result.frequencies[0].residual, -1.5);

    let stats = &result.test_statistics;
    assert_abs_diff_eq!(stats.chi_square.unwrap(), 2.0, epsilon = 1e-12);
    assert_eq!(stats.df, Some(3));
    assert_abs_diff_eq!(stats.p_value.unwrap(), 0.57240670447088, epsilon = 1e-8);

    assert!(!result.metadata.has_insufficient_data);
    assert_eq!(result.metadata.cells_below_five, 4);
    assert_eq!(result.metadata.min_expected, Some(2.5));
    assert_eq!(result.n(), 10.0);
    assert_eq!(result.category_count(), 4);
}

#[test]
fn test_proportional_expected_values() {
    let config = GoodnessOfFitConfig::default().with_expected_values(vec![1.0, 2.0, 3.0, 4.0]);
    let result = run(&STAIRCASE, &config);

    for (f, want) in result.frequencies.iter().zip([1.0, 2.0, 3.0, 4.0]) {
        assert_abs_diff_eq!(f.expected, want, epsilon = 1e-12);
    }
    assert_abs_diff_eq!(result.test_statistics.chi_square.unwrap(), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(result.test_statistics.p_value.unwrap(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_missing_values_are_excluded() {
    let mut data = STAIRCASE.to_vec();
    data.extend([99.0, f64::NAN, 99.0]);
    let missing = MissingSpec::none().with_values([99.0]);

    let result =
        chi_square_goodness_of_fit(&data, &missing, &GoodnessOfFitConfig::default()).unwrap();
    assert_eq!(result.category_count(), 4);
    assert_eq!(result.n(), 10.0);
    assert_abs_diff_eq!(result.test_statistics.chi_square.unwrap(), 2.0, epsilon = 1e-12);
}

// ==================== Range Mode ====================

#[test]
fn test_range_floors_and_excludes() {
    let data = [1.0, 2.0, 2.4, 3.7, 9.0, 0.0];
    let result = run(&data, &GoodnessOfFitConfig::default().with_range(1, 5));

    // Every category in range is listed, observed or not
    let observed: Vec<f64> = result.frequencies.iter().map(|f| f.observed).collect();
    assert_eq!(observed, vec![1.0, 2.0, 1.0, 0.0, 0.0]);
    assert!(result.frequencies.iter().all(|f| f.expected == 0.8));

    let stats = &result.test_statistics;
    assert_abs_diff_eq!(stats.chi_square.unwrap(), 3.5, epsilon = 1e-12);
    assert_eq!(stats.df, Some(4));
    assert_abs_diff_eq!(stats.p_value.unwrap(), 0.477878344488724, epsilon = 1e-8);
    assert_eq!(result.metadata.cells_below_five, 5);
}

#[test]
fn test_range_with_custom_values_enumerates_categories() {
    let equal = run(&STAIRCASE, &GoodnessOfFitConfig::default().with_range(0, 5));
    let weighted = run(
        &STAIRCASE,
        &GoodnessOfFitConfig::default()
            .with_range(0, 5)
            .with_expected_values(vec![2.0; 6]),
    );
    assert_abs_diff_eq!(
        equal.test_statistics.chi_square.unwrap(),
        weighted.test_statistics.chi_square.unwrap(),
        epsilon = 1e-10
    );
    assert_eq!(weighted.test_statistics.df, Some(5));
}

#[test]
fn test_range_without_valid_observations() {
    let result = run(&[10.0, 11.0], &GoodnessOfFitConfig::default().with_range(1, 3));
    assert!(result.metadata.has_insufficient_data);
    assert_eq!(result.metadata.insufficient_type, vec![InsufficientType::Empty]);
    assert_eq!(result.category_count(), 3);
    assert_eq!(result.metadata.min_expected, Some(0.0));
}

#[test]
fn test_single_category_range() {
    let result = run(&STAIRCASE, &GoodnessOfFitConfig::default().with_range(3, 3));
    assert_eq!(
        result.metadata.insufficient_type,
        vec![InsufficientType::SingleCategory]
    );
    assert_eq!(result.frequencies[0].observed, 3.0);
    assert_eq!(result.frequencies[0].expected, 3.0);
}

// ==================== Degenerate Inputs ====================

#[test]
fn test_single_category_is_insufficient() {
    let result = run(&[4.0, 4.0, 4.0], &GoodnessOfFitConfig::default());
    assert!(result.metadata.has_insufficient_data);
    assert_eq!(
        result.metadata.insufficient_type,
        vec![InsufficientType::SingleCategory]
    );
    assert_eq!(result.test_statistics, ChiSquareStatistics::default());

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["testStatistics"]["ChiSquare"].is_null());
    assert!(json["testStatistics"]["DF"].is_null());
    assert!(json["testStatistics"]["PValue"].is_null());
    assert_eq!(json["metadata"]["hasInsufficientData"], true);
    assert_eq!(
        json["metadata"]["insufficientType"],
        serde_json::json!(["SingleCategory"])
    );
}

#[test]
fn test_empty_input_is_insufficient() {
    let result = run(&[f64::NAN], &GoodnessOfFitConfig::default());
    assert_eq!(result.metadata.insufficient_type, vec![InsufficientType::Empty]);
    assert!(result.frequencies.is_empty());
    assert_eq!(result.metadata.min_expected, None);
    assert_eq!(result.test_statistics.chi_square, None);
}

// ==================== Configuration ====================

#[test]
fn test_invalid_configurations() {
    assert!(matches!(
        chi_square_goodness_of_fit(
            &STAIRCASE,
            &MissingSpec::none(),
            &GoodnessOfFitConfig::default().with_range(5, 1)
        ),
        Err(ModelError::InvalidConfig { .. })
    ));
    assert!(matches!(
        chi_square_goodness_of_fit(
            &STAIRCASE,
            &MissingSpec::none(),
            &GoodnessOfFitConfig::default().with_expected_values(vec![1.0, 2.0])
        ),
        Err(ModelError::Core(CoreError::InvalidParameter(_)))
    ));
    assert!(matches!(
        chi_square_goodness_of_fit(
            &STAIRCASE,
            &MissingSpec::none(),
            &GoodnessOfFitConfig::default().with_expected_values(vec![1.0, -1.0, 1.0, 1.0])
        ),
        Err(ModelError::Core(CoreError::InvalidParameter(_)))
    ));
}

#[test]
fn test_range_width_is_bounded() {
    let check = |lower: i64, upper: i64| {
        chi_square_goodness_of_fit(
            &STAIRCASE,
            &MissingSpec::none(),
            &GoodnessOfFitConfig::default().with_range(lower, upper),
        )
    };

    assert!(matches!(check(i64::MIN, i64::MAX), Err(ModelError::InvalidConfig { .. })));
    assert!(matches!(check(-1, i64::MAX), Err(ModelError::InvalidConfig { .. })));
    assert!(matches!(
        check(0, MAX_RANGE_CATEGORIES as i64),
        Err(ModelError::InvalidConfig { .. })
    ));

    let widest = check(1, MAX_RANGE_CATEGORIES as i64).unwrap();
    assert_eq!(widest.category_count(), MAX_RANGE_CATEGORIES);
    assert_eq!(widest.n(), 10.0);
}

#[test]
fn test_config_from_json() {
    let config: GoodnessOfFitConfig = serde_json::from_str(
        r#"{"expectedRange": {"range": {"lower": 1, "upper": 4}}, "expectedValues": "equal"}"#,
    )
    .unwrap();
    assert_eq!(config, GoodnessOfFitConfig::default().with_range(1, 4));

    let config: GoodnessOfFitConfig =
        serde_json::from_str(r#"{"expectedValues": {"values": [1, 1, 2]}}"#).unwrap();
    assert_eq!(config.expected_range, ExpectedRange::FromData);
    assert_eq!(config.expected_values, ExpectedValues::Values(vec![1.0, 1.0, 2.0]));
}
