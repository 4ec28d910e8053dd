//! Duration sampling.
//!
//! A [`Sampler`] turns one activity's [`DurationSpec`] into `n` draws. The
//! default [`DistributionSampler`] maps stratified (Latin Hypercube) or plain
//! uniforms through the `statrs` inverse CDF of the requested distribution.
//! Activities are drawn independently of one another.

pub mod latin_hypercube;

use crate::activity::DurationSpec;
use crate::activity_validation::validate_duration;
use crate::error::{DistributionError, InvalidParameterError};
use crate::graph::ProjectDag;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal, Triangular};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMethod {
    #[default]
    LatinHypercube,
    Random,
}

impl SamplingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SamplingMethod::LatinHypercube => "latin_hypercube",
            SamplingMethod::Random => "random",
        }
    }
}

/// The sampling capability: `n` draws from one duration spec.
pub trait Sampler {
    fn draw(
        &mut self,
        spec: &DurationSpec,
        method: SamplingMethod,
        n: usize,
    ) -> Result<Vec<f64>, DistributionError>;
}

pub struct DistributionSampler {
    rng: StdRng,
}

impl DistributionSampler {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw `n` samples for every activity of `dag`, in declaration order.
    pub fn generate(
        &mut self,
        dag: &ProjectDag,
        method: SamplingMethod,
        n: usize,
    ) -> Result<SampleSet, DistributionError> {
        if n == 0 {
            return Err(DistributionError::NonPositiveSampleCount { count: n });
        }
        let mut codes = Vec::with_capacity(dag.len());
        let mut columns = Vec::with_capacity(dag.len());
        for activity in dag.activities() {
            validate_duration(&activity.code, &activity.duration)?;
            columns.push(self.draw(&activity.duration, method, n)?);
            codes.push(activity.code.clone());
        }
        Ok(SampleSet { codes, columns, n })
    }

    fn uniforms(&mut self, method: SamplingMethod, n: usize) -> Vec<f64> {
        match method {
            SamplingMethod::LatinHypercube => latin_hypercube::stratified_uniforms(&mut self.rng, n),
            SamplingMethod::Random => latin_hypercube::independent_uniforms(&mut self.rng, n),
        }
    }
}

impl Sampler for DistributionSampler {
    fn draw(
        &mut self,
        spec: &DurationSpec,
        method: SamplingMethod,
        n: usize,
    ) -> Result<Vec<f64>, DistributionError> {
        if n == 0 {
            return Err(DistributionError::NonPositiveSampleCount { count: n });
        }
        if spec.is_degenerate() {
            return Ok(vec![spec.point_estimate(); n]);
        }

        let malformed = |err: &dyn std::fmt::Display| DistributionError::MalformedParameters {
            subject: spec.to_string(),
            reason: err.to_string(),
        };
        let uniforms = self.uniforms(method, n);
        let samples = match *spec {
            DurationSpec::Triangular { min, mode, max } => {
                let dist = Triangular::new(min, max, mode).map_err(|e| malformed(&e))?;
                uniforms.into_iter().map(|p| dist.inverse_cdf(p)).collect()
            }
            DurationSpec::Normal { mean, std } => {
                let dist = Normal::new(mean, std).map_err(|e| malformed(&e))?;
                uniforms.into_iter().map(|p| dist.inverse_cdf(p)).collect()
            }
            DurationSpec::Fixed { value } => vec![value; n],
        };
        Ok(samples)
    }
}

/// Per-activity draws. Row `i` across all columns is one Monte Carlo iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    codes: Vec<String>,
    columns: Vec<Vec<f64>>,
    n: usize,
}

impl SampleSet {
    pub fn from_columns<I, S>(columns: I) -> Result<Self, InvalidParameterError>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut codes = Vec::new();
        let mut data = Vec::new();
        for (code, column) in columns {
            codes.push(code.into());
            data.push(column);
        }
        let n = data.first().map(Vec::len).unwrap_or(0);
        for (code, column) in codes.iter().zip(&data) {
            if column.is_empty() {
                return Err(InvalidParameterError::EmptySamples {
                    subject: code.clone(),
                });
            }
            if column.len() != n {
                return Err(InvalidParameterError::RaggedSamples {
                    code: code.clone(),
                    expected: n,
                    found: column.len(),
                });
            }
        }
        Ok(Self {
            codes,
            columns: data,
            n,
        })
    }

    /// Number of draws per activity.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn column(&self, code: &str) -> Option<&[f64]> {
        self.codes
            .iter()
            .position(|c| c == code)
            .map(|pos| self.columns[pos].as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        self.codes
            .iter()
            .zip(&self.columns)
            .map(|(code, column)| (code.as_str(), column.as_slice()))
    }

    /// Fill `row` with draw `i` of every activity.
    pub(crate) fn fill_row(&self, i: usize, row: &mut [f64]) {
        for (slot, column) in row.iter_mut().zip(&self.columns) {
            *slot = column[i];
        }
    }

    /// Check that columns line up with the graph's declaration order.
    pub fn ensure_matches(&self, dag: &ProjectDag) -> Result<(), InvalidParameterError> {
        let expected = dag.codes();
        if expected != self.codes {
            return Err(InvalidParameterError::SampleSetMismatch {
                reason: format!(
                    "sample columns [{}] do not match activities [{}]",
                    self.codes.join(","),
                    expected.join(",")
                ),
            });
        }
        for (code, column) in self.columns() {
            if let Some(&value) = column.iter().find(|v| !v.is_finite()) {
                return Err(InvalidParameterError::NonFiniteValue {
                    subject: code.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}
