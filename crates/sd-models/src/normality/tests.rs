//! Tests for the normality diagnostics

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Exp, Normal};

use super::*;

/// Roughly symmetric, light tails
const SYMMETRIC: [f64; 15] = [
    2.1, 3.4, 1.9, 5.6, 4.4, 3.8, 2.9, 4.1, 3.3, 3.7, 2.5, 4.9, 3.0, 3.6, 4.2,
];

/// Fibonacci-like growth, strongly right skewed
const SKEWED: [f64; 12] = [
    0.1, 0.2, 0.3, 0.5, 0.8, 1.3, 2.1, 3.4, 5.5, 8.9, 14.4, 23.3,
];

fn normal_sample(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Normal::new(10.0, 2.0).unwrap();
    (0..n).map(|_| dist.sample(&mut rng)).collect()
}

// ==================== Kolmogorov-Smirnov ====================

#[test]
fn test_kolmogorov_smirnov_symmetric_sample() {
    let stat = kolmogorov_smirnov(&SYMMETRIC).unwrap();
    assert_abs_diff_eq!(stat.statistic, 0.0728001981466, epsilon = 1e-6);
    assert_eq!(stat.df, None);
    assert_abs_diff_eq!(stat.p_value, 0.9999952007, epsilon = 1e-6);
    assert!(stat.null_holds());
}

#[test]
fn test_kolmogorov_smirnov_skewed_sample() {
    let stat = kolmogorov_smirnov(&SKEWED).unwrap();
    assert_abs_diff_eq!(stat.statistic, 0.258187873850, epsilon = 1e-6);
    assert_abs_diff_eq!(stat.p_value, 0.348077568057, epsilon = 1e-5);
}

#[test]
fn test_kolmogorov_smirnov_three_points() {
    let stat = kolmogorov_smirnov(&[1.0, 2.0, 3.0]).unwrap();
    assert_abs_diff_eq!(stat.statistic, 0.174678079402, epsilon = 1e-6);
    assert_abs_diff_eq!(stat.p_value, 0.99987723627, epsilon = 1e-6);
}

#[test]
fn test_kolmogorov_p_value_limits() {
    // Small λ does not converge within the term limit
    assert_eq!(kolmogorov_p_value(0.0), 1.0);
    assert_eq!(kolmogorov_p_value(0.01), 1.0);
    assert!(kolmogorov_p_value(3.0) < 1e-6);
    // Q(1) = 0.2700
    assert_abs_diff_eq!(kolmogorov_p_value(1.0), 0.26999967167735, epsilon = 1e-9);
}

#[test]
fn test_kolmogorov_smirnov_errors() {
    assert_eq!(
        kolmogorov_smirnov(&[1.0, 2.0]),
        Err(ModelError::InsufficientObservations {
            required: 3,
            actual: 2
        })
    );
    assert!(matches!(
        kolmogorov_smirnov(&[5.0; 6]),
        Err(ModelError::ZeroVariance { .. })
    ));
    assert!(kolmogorov_smirnov(&[1.0, f64::INFINITY, 2.0, 3.0]).is_err());
}

// ==================== Jarque-Bera ====================

#[test]
fn test_jarque_bera_symmetric_sample() {
    let stat = jarque_bera(&SYMMETRIC).unwrap();
    assert_abs_diff_eq!(stat.statistic, 0.200868908741, epsilon = 1e-9);
    assert_eq!(stat.df, Some(2.0));
    assert_abs_diff_eq!(stat.p_value, 0.904444392847, epsilon = 1e-8);
}

#[test]
fn test_jarque_bera_skewed_sample() {
    let stat = jarque_bera(&SKEWED).unwrap();
    assert_abs_diff_eq!(stat.statistic, 6.254847499331, epsilon = 1e-8);
    assert_abs_diff_eq!(stat.p_value, 0.043830570446, epsilon = 1e-8);
    assert!(!stat.null_holds());
}

#[test]
fn test_jarque_bera_errors() {
    assert_eq!(
        jarque_bera(&[1.0, 2.0, 3.0]),
        Err(ModelError::InsufficientObservations {
            required: 4,
            actual: 3
        })
    );
    assert!(matches!(
        jarque_bera(&[2.0; 8]),
        Err(ModelError::ZeroVariance { .. })
    ));
}

// ==================== Shapiro-Wilk ====================

#[test]
fn test_shapiro_wilk_one_to_ten() {
    let data: Vec<f64> = (1..=10).map(f64::from).collect();
    let stat = shapiro_wilk(&data).unwrap();
    assert_abs_diff_eq!(stat.statistic, 0.970164611231, epsilon = 1e-6);
    assert_abs_diff_eq!(stat.p_value, 0.892367, epsilon = 1e-4);
}

#[test]
fn test_shapiro_wilk_heights_with_outlier() {
    let data = [
        148.0, 154.0, 158.0, 160.0, 161.0, 162.0, 166.0, 170.0, 182.0, 195.0, 236.0,
    ];
    let stat = shapiro_wilk(&data).unwrap();
    assert_abs_diff_eq!(stat.statistic, 0.788814694835, epsilon = 1e-6);
    assert_abs_diff_eq!(stat.p_value, 0.0067038, epsilon = 1e-4);
    assert!(!stat.null_holds());
}

#[test]
fn test_shapiro_wilk_large_sample_branch() {
    let stat = shapiro_wilk(&SYMMETRIC).unwrap();
    assert_abs_diff_eq!(stat.statistic, 0.986501395341, epsilon = 1e-6);
    assert_abs_diff_eq!(stat.p_value, 0.995988369, epsilon = 1e-4);

    let stat = shapiro_wilk(&SKEWED).unwrap();
    assert_abs_diff_eq!(stat.statistic, 0.736760005717, epsilon = 1e-6);
    assert_abs_diff_eq!(stat.p_value, 0.0019506, epsilon = 1e-4);
}

#[test]
fn test_shapiro_wilk_three_points_is_exact() {
    let stat = shapiro_wilk(&[1.0, 2.0, 4.0]).unwrap();
    assert_abs_diff_eq!(stat.statistic, 0.964285714286, epsilon = 1e-12);
    assert_abs_diff_eq!(stat.p_value, 0.636886845, epsilon = 1e-8);

    // Equally spaced points attain the maximum
    let stat = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
    assert_abs_diff_eq!(stat.statistic, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(stat.p_value, 1.0, epsilon = 1e-9);
}

#[test]
fn test_shapiro_wilk_bounds() {
    let too_many = normal_sample(SHAPIRO_WILK_MAX_OBS + 1, 1);
    assert!(matches!(
        shapiro_wilk(&too_many),
        Err(ModelError::InvalidConfig { .. })
    ));
    assert!(matches!(
        shapiro_wilk(&[1.0, 2.0]),
        Err(ModelError::InsufficientObservations { .. })
    ));
    assert!(matches!(
        shapiro_wilk(&[3.0; 10]),
        Err(ModelError::ZeroVariance { .. })
    ));
}

#[test]
fn test_shapiro_wilk_rejects_exponential_data() {
    let mut rng = StdRng::seed_from_u64(11);
    let dist = Exp::new(1.0).unwrap();
    let data: Vec<f64> = (0..200).map(|_| dist.sample(&mut rng)).collect();
    assert!(!shapiro_wilk(&data).unwrap().null_holds());
}

// ==================== Descriptives ====================

#[test]
fn test_descriptives_are_bias_corrected() {
    let d = Descriptives::from_data(&SYMMETRIC);
    assert_abs_diff_eq!(d.skewness.unwrap(), 0.204668308248, epsilon = 1e-9);
    assert_abs_diff_eq!(d.excess_kurtosis.unwrap(), -0.081718494697, epsilon = 1e-9);

    let d = Descriptives::from_data(&SKEWED);
    assert_abs_diff_eq!(d.skewness.unwrap(), 1.849002754823, epsilon = 1e-9);
    assert_abs_diff_eq!(d.excess_kurtosis.unwrap(), 3.062918147328, epsilon = 1e-9);
}

#[test]
fn test_descriptives_small_samples() {
    let d = Descriptives::from_data(&[1.0, 2.0, 4.0]);
    assert!(d.skewness.is_some());
    assert!(d.excess_kurtosis.is_none());

    let json = serde_json::to_value(Descriptives::default()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"skewness": null, "excessKurtosis": null})
    );
}

// ==================== Suite ====================

#[test]
fn test_suite_default_config() {
    let suite = normality_tests(&SKEWED, &NormalityConfig::default());
    assert!(suite.kolmogorov_smirnov.is_some());
    assert!(suite.shapiro_wilk.is_none());
    assert_eq!(suite.results().count(), 2);

    // Jarque-Bera rejects while Kolmogorov-Smirnov does not
    assert!(suite.jarque_bera.as_ref().unwrap().rejects_null());
    assert!(suite.kolmogorov_smirnov.as_ref().unwrap().null_holds());
    assert!(!suite.is_normal);
}

#[test]
fn test_suite_with_shapiro_wilk() {
    let config = NormalityConfig {
        shapiro_wilk: true,
        ..Default::default()
    };
    let suite = normality_tests(&SYMMETRIC, &config);
    assert_eq!(suite.results().count(), 3);
    assert!(suite.results().all(TestResult::is_completed));
    assert!(suite.is_normal);
}

#[test]
fn test_suite_isolates_failures() {
    // Three observations: Jarque-Bera cannot run, the others can
    let config = NormalityConfig {
        shapiro_wilk: true,
        ..Default::default()
    };
    let suite = normality_tests(&[1.0, 2.0, 4.0], &config);
    let jb = suite.jarque_bera.as_ref().unwrap();
    assert!(!jb.is_completed());
    assert_eq!(
        jb.error(),
        Some(&ModelError::InsufficientObservations {
            required: 4,
            actual: 3
        })
    );
    assert!(suite.kolmogorov_smirnov.as_ref().unwrap().is_completed());
    assert!(suite.shapiro_wilk.as_ref().unwrap().is_completed());
    assert!(suite.is_normal);
}

#[test]
fn test_failed_suite() {
    let config = NormalityConfig::default();
    let suite = NormalitySuite::failed(&ModelError::SingularMatrix, &config);
    assert!(suite.is_normal);
    assert_eq!(suite.results().count(), 2);
    assert_eq!(suite.descriptives, Descriptives::default());
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: NormalityConfig =
        serde_json::from_str(r#"{"shapiroWilk": true, "histogramBins": 12}"#).unwrap();
    assert!(config.kolmogorov_smirnov);
    assert!(config.jarque_bera);
    assert!(config.shapiro_wilk);
    assert_eq!(config.histogram_bins, Some(12));
}

#[test]
fn test_normal_samples_mostly_accepted() {
    let config = NormalityConfig {
        shapiro_wilk: true,
        ..Default::default()
    };
    let accepted = (0..50)
        .filter(|&seed| normality_tests(&normal_sample(60, seed), &config).is_normal)
        .count();
    // Three tests at 5% each, so at worst about 15% rejections
    assert!(accepted >= 35, "accepted {} of 50", accepted);
}

// ==================== Property Tests ====================

proptest! {
    #[test]
    fn test_kolmogorov_smirnov_ranges(
        data in proptest::collection::vec(-100.0f64..100.0, 3..60),
    ) {
        prop_assume!(stats::std_dev(&data).is_some_and(|s| s > 1e-6));
        let stat = kolmogorov_smirnov(&data).unwrap();
        prop_assert!((0.0..=1.0).contains(&stat.statistic));
        prop_assert!((0.0..=1.0).contains(&stat.p_value));
    }

    #[test]
    fn test_shapiro_wilk_ranges(
        data in proptest::collection::vec(-100.0f64..100.0, 3..80),
    ) {
        prop_assume!(stats::std_dev(&data).is_some_and(|s| s > 1e-6));
        let stat = shapiro_wilk(&data).unwrap();
        prop_assert!(stat.statistic > 0.0 && stat.statistic <= 1.0);
        prop_assert!((0.0..=1.0).contains(&stat.p_value));
    }
}
