use proptest::prelude::*;
use schedule_risk::{
    InvalidParameterError, RiskSummary, conditional_value_at_risk, value_at_risk,
};

#[test]
fn value_at_risk_interpolates_percentiles() {
    let samples: Vec<f64> = (1..=10).map(f64::from).collect();
    assert!((value_at_risk(&samples, 0.5).unwrap() - 5.5).abs() < 1e-12);
    assert!((value_at_risk(&samples, 0.9).unwrap() - 9.1).abs() < 1e-12);
    assert_eq!(value_at_risk(&samples, 1.0).unwrap(), 10.0);
}

#[test]
fn cvar_averages_the_tail() {
    let samples = [5.0, 1.0, 4.0, 2.0, 3.0];
    // VaR(0.6) = 3.4, tail = {4, 5}
    assert!((value_at_risk(&samples, 0.6).unwrap() - 3.4).abs() < 1e-12);
    assert!((conditional_value_at_risk(&samples, 0.6).unwrap() - 4.5).abs() < 1e-12);
}

#[test]
fn confidence_outside_unit_interval_is_rejected() {
    for confidence in [0.0, -0.1, 1.5, f64::NAN] {
        assert!(matches!(
            value_at_risk(&[1.0, 2.0], confidence),
            Err(InvalidParameterError::ConfidenceOutOfRange { .. })
        ));
        assert!(conditional_value_at_risk(&[1.0, 2.0], confidence).is_err());
    }
}

#[test]
fn empty_or_non_finite_samples_are_rejected() {
    assert!(matches!(
        value_at_risk(&[], 0.9),
        Err(InvalidParameterError::EmptySamples { .. })
    ));
    assert!(matches!(
        conditional_value_at_risk(&[1.0, f64::INFINITY], 0.9),
        Err(InvalidParameterError::NonFiniteValue { .. })
    ));
}

#[test]
fn summary_collects_moments_and_tail() {
    let summary = RiskSummary::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 0.95).unwrap();
    assert_eq!(summary.samples, 8);
    assert_eq!(summary.min, 2.0);
    assert_eq!(summary.max, 9.0);
    assert!((summary.mean - 5.0).abs() < 1e-12);
    assert!((summary.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    assert!(summary.conditional_value_at_risk >= summary.value_at_risk);
}

proptest! {
    #[test]
    fn var_is_monotone_in_confidence(
        samples in prop::collection::vec(-1e6f64..1e6, 1..200),
        a in 0.001f64..=1.0,
        b in 0.001f64..=1.0,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(value_at_risk(&samples, lo).unwrap() <= value_at_risk(&samples, hi).unwrap());
    }

    #[test]
    fn cvar_never_below_var(
        samples in prop::collection::vec(-1e6f64..1e6, 1..200),
        confidence in 0.001f64..=1.0,
    ) {
        let var = value_at_risk(&samples, confidence).unwrap();
        let cvar = conditional_value_at_risk(&samples, confidence).unwrap();
        prop_assert!(cvar >= var);
    }
}
