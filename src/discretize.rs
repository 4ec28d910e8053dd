use crate::error::InvalidParameterError;
use crate::sampling::SampleSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Empirical PMF over whole-day durations. `labels` ascend strictly and
/// `probs` runs parallel to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteDistribution {
    pub labels: Vec<i64>,
    pub probs: Vec<f64>,
}

impl DiscreteDistribution {
    /// Round each sample half-to-even and count. Values never observed are
    /// left out rather than given zero mass.
    pub fn from_samples(code: &str, samples: &[f64]) -> Result<Self, InvalidParameterError> {
        if samples.is_empty() {
            return Err(InvalidParameterError::EmptySamples {
                subject: code.to_string(),
            });
        }

        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for &value in samples {
            if !value.is_finite() {
                return Err(InvalidParameterError::NonFiniteValue {
                    subject: code.to_string(),
                    value,
                });
            }
            *counts.entry(value.round_ties_even() as i64).or_default() += 1;
        }

        let n = samples.len() as f64;
        let (labels, probs) = counts
            .into_iter()
            .map(|(label, count)| (label, count as f64 / n))
            .unzip();
        Ok(Self { labels, probs })
    }

    /// A single certain duration.
    pub fn degenerate(label: i64) -> Self {
        Self {
            labels: vec![label],
            probs: vec![1.0],
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn max_label(&self) -> Option<i64> {
        self.labels.last().copied()
    }

    pub fn state_of(&self, label: i64) -> Option<usize> {
        self.labels.binary_search(&label).ok()
    }

    pub fn mean(&self) -> f64 {
        self.labels
            .iter()
            .zip(&self.probs)
            .map(|(&label, &p)| label as f64 * p)
            .sum()
    }

    pub fn total_probability(&self) -> f64 {
        self.probs.iter().sum()
    }
}

/// Discretized duration per activity, keyed by code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Discretization {
    distributions: BTreeMap<String, DiscreteDistribution>,
}

impl Discretization {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<String>, distribution: DiscreteDistribution) {
        self.distributions.insert(code.into(), distribution);
    }

    pub fn get(&self, code: &str) -> Option<&DiscreteDistribution> {
        self.distributions.get(code)
    }

    pub fn len(&self) -> usize {
        self.distributions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distributions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DiscreteDistribution)> + '_ {
        self.distributions.iter().map(|(code, d)| (code.as_str(), d))
    }
}

pub struct Discretizer;

impl Discretizer {
    pub fn discretize(samples: &SampleSet) -> Result<Discretization, InvalidParameterError> {
        let mut discretization = Discretization::new();
        for (code, column) in samples.columns() {
            let distribution = DiscreteDistribution::from_samples(code, column)?;
            debug!(
                activity = code,
                states = distribution.len(),
                labels = ?distribution.labels,
                "discretized durations"
            );
            discretization.insert(code, distribution);
        }
        Ok(discretization)
    }
}
