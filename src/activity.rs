use crate::error::DistributionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Duration of an activity: either a known value or a distribution to draw from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DurationSpec {
    Fixed { value: f64 },
    Triangular { min: f64, mode: f64, max: f64 },
    Normal { mean: f64, std: f64 },
}

impl DurationSpec {
    pub fn fixed(value: f64) -> Self {
        DurationSpec::Fixed { value }
    }

    pub fn triangular(min: f64, mode: f64, max: f64) -> Self {
        DurationSpec::Triangular { min, mode, max }
    }

    pub fn normal(mean: f64, std: f64) -> Self {
        DurationSpec::Normal { mean, std }
    }

    /// Parse the record form used by activity imports, e.g. `("triangular", "2,3,6")`.
    pub fn from_kind(kind: &str, params: &str) -> Result<Self, DistributionError> {
        let kind = kind.trim().to_ascii_lowercase();
        let values = parse_params(&kind, params)?;
        let expect = |arity: usize| -> Result<(), DistributionError> {
            if values.len() == arity {
                Ok(())
            } else {
                Err(DistributionError::MalformedParameters {
                    subject: kind.clone(),
                    reason: format!("expected {arity} values, got {}", values.len()),
                })
            }
        };
        match kind.as_str() {
            "fixed" => {
                expect(1)?;
                Ok(DurationSpec::fixed(values[0]))
            }
            "triangular" => {
                expect(3)?;
                Ok(DurationSpec::triangular(values[0], values[1], values[2]))
            }
            "normal" => {
                expect(2)?;
                Ok(DurationSpec::normal(values[0], values[1]))
            }
            _ => Err(DistributionError::UnsupportedKind { kind }),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DurationSpec::Fixed { .. } => "fixed",
            DurationSpec::Triangular { .. } => "triangular",
            DurationSpec::Normal { .. } => "normal",
        }
    }

    pub fn params_string(&self) -> String {
        match self {
            DurationSpec::Fixed { value } => value.to_string(),
            DurationSpec::Triangular { min, mode, max } => format!("{min},{mode},{max}"),
            DurationSpec::Normal { mean, std } => format!("{mean},{std}"),
        }
    }

    /// Point duration used for the deterministic baseline.
    pub fn point_estimate(&self) -> f64 {
        match *self {
            DurationSpec::Fixed { value } => value,
            DurationSpec::Triangular { mode, .. } => mode,
            DurationSpec::Normal { mean, .. } => mean,
        }
    }

    /// Whether every draw yields the same value.
    pub fn is_degenerate(&self) -> bool {
        match *self {
            DurationSpec::Fixed { .. } => true,
            DurationSpec::Triangular { min, max, .. } => min == max,
            DurationSpec::Normal { std, .. } => std == 0.0,
        }
    }
}

impl fmt::Display for DurationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.params_string())
    }
}

fn parse_params(kind: &str, params: &str) -> Result<Vec<f64>, DistributionError> {
    params
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>()
                .map_err(|err| DistributionError::MalformedParameters {
                    subject: kind.to_string(),
                    reason: format!("invalid number '{part}': {err}"),
                })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub code: String,
    pub label: String,
    #[serde(default)]
    pub predecessors: Vec<String>,
    pub duration: DurationSpec,
}

impl Activity {
    pub fn new(code: impl Into<String>, label: impl Into<String>, duration: DurationSpec) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            predecessors: Vec::new(),
            duration,
        }
    }

    pub fn with_predecessors<I, S>(mut self, predecessors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predecessors = predecessors.into_iter().map(Into::into).collect();
        self
    }
}
