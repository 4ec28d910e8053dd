use crate::bayes::builder::{
    DEFAULT_HORIZON_MARGIN, DEFAULT_MAX_COMPLETION_STATES, DEFAULT_MAX_CPT_COLUMNS,
};
use crate::error::{AnalysisError, DistributionError, InvalidParameterError};
use crate::persistence::PersistenceResult;
use crate::sampling::SamplingMethod;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// Tunables for one analysis session. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Monte Carlo draws per activity.
    pub samples: usize,
    pub seed: u64,
    pub method: SamplingMethod,
    /// VaR/CVaR confidence, in (0, 1].
    pub confidence: f64,
    /// Extra completion states beyond the longest max-duration path.
    pub horizon_margin: usize,
    /// Largest parent-combination count accepted for one completion table.
    pub max_cpt_columns: usize,
    /// Largest completion horizon accepted when building the network.
    pub max_completion_states: usize,
    pub parallel: bool,
    pub query_timeout_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            samples: 1000,
            seed: 42,
            method: SamplingMethod::LatinHypercube,
            confidence: 0.95,
            horizon_margin: DEFAULT_HORIZON_MARGIN,
            max_cpt_columns: DEFAULT_MAX_CPT_COLUMNS,
            max_completion_states: DEFAULT_MAX_COMPLETION_STATES,
            parallel: true,
            query_timeout_ms: 30_000,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.samples == 0 {
            return Err(DistributionError::NonPositiveSampleCount {
                count: self.samples,
            }
            .into());
        }
        if !(self.confidence > 0.0 && self.confidence <= 1.0) {
            return Err(InvalidParameterError::ConfidenceOutOfRange {
                confidence: self.confidence,
            }
            .into());
        }
        if self.max_cpt_columns == 0 {
            return Err(InvalidParameterError::Config {
                reason: "max_cpt_columns must be positive".into(),
            }
            .into());
        }
        if self.max_completion_states == 0 {
            return Err(InvalidParameterError::Config {
                reason: "max_completion_states must be positive".into(),
            }
            .into());
        }
        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        let file = File::open(path)?;
        let config: AnalysisConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> PersistenceResult<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
