//! Tail-risk metrics over an empirical duration sample.

use crate::error::InvalidParameterError;
use serde::{Deserialize, Serialize};

fn check_confidence(confidence: f64) -> Result<(), InvalidParameterError> {
    if confidence > 0.0 && confidence <= 1.0 {
        Ok(())
    } else {
        Err(InvalidParameterError::ConfidenceOutOfRange { confidence })
    }
}

fn sorted_samples(samples: &[f64]) -> Result<Vec<f64>, InvalidParameterError> {
    if samples.is_empty() {
        return Err(InvalidParameterError::EmptySamples {
            subject: "risk samples".into(),
        });
    }
    if let Some(&value) = samples.iter().find(|v| !v.is_finite()) {
        return Err(InvalidParameterError::NonFiniteValue {
            subject: "risk samples".into(),
            value,
        });
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(sorted)
}

/// Percentile with linear interpolation between order statistics at rank
/// `(n - 1) * q`. The result never leaves the bracketing pair, which keeps
/// it monotone in `q`.
fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let rank = (sorted.len() - 1) as f64 * q;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    (sorted[lo] + frac * (sorted[hi] - sorted[lo])).clamp(sorted[lo], sorted[hi])
}

/// The `confidence` percentile of `samples`.
pub fn value_at_risk(samples: &[f64], confidence: f64) -> Result<f64, InvalidParameterError> {
    check_confidence(confidence)?;
    let sorted = sorted_samples(samples)?;
    Ok(percentile_sorted(&sorted, confidence))
}

/// Mean of the samples at or beyond the value at risk.
pub fn conditional_value_at_risk(
    samples: &[f64],
    confidence: f64,
) -> Result<f64, InvalidParameterError> {
    check_confidence(confidence)?;
    let sorted = sorted_samples(samples)?;
    let var = percentile_sorted(&sorted, confidence);
    Ok(tail_mean(&sorted, var))
}

fn tail_mean(sorted: &[f64], var: f64) -> f64 {
    let start = sorted.partition_point(|&v| v < var);
    let tail = &sorted[start..];
    let mean = tail.iter().sum::<f64>() / tail.len() as f64;
    // Every tail value is >= var; rounding in the sum must not say otherwise.
    mean.max(var)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub confidence: f64,
    pub value_at_risk: f64,
    pub conditional_value_at_risk: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

impl RiskSummary {
    pub fn compute(samples: &[f64], confidence: f64) -> Result<Self, InvalidParameterError> {
        check_confidence(confidence)?;
        let sorted = sorted_samples(samples)?;
        let n = sorted.len();
        let var = percentile_sorted(&sorted, confidence);
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let std_dev = if n > 1 {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        } else {
            0.0
        };
        Ok(Self {
            confidence,
            value_at_risk: var,
            conditional_value_at_risk: tail_mean(&sorted, var),
            mean,
            std_dev,
            min: sorted[0],
            max: sorted[n - 1],
            samples: n,
        })
    }
}
