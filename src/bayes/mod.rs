//! Discrete Bayesian network over activity durations and completion times.
//!
//! Each activity contributes a duration variable `D_<code>` with its
//! discretized prior and a completion variable `T_<code>` whose parents are
//! `D_<code>` and the completion variables of its direct predecessors. All
//! completion variables share one horizon `0..num_states`. The network is
//! handed to an external [`InferenceEngine`]; nothing here runs inference.

pub mod builder;
pub mod cpt;
pub mod inference;
pub mod model;
pub mod parent_combinations;

pub use builder::BayesianNetworkBuilder;
pub use cpt::{Cpt, CptTable};
pub use inference::{Evidence, InferenceEngine, InferenceQuery, Marginal, query_with_timeout};
pub use model::BayesianModel;
pub use parent_combinations::ParentCombinations;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariableId(pub usize);

impl VariableId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    Duration,
    Completion,
}

impl VariableKind {
    pub fn prefix(self) -> &'static str {
        match self {
            VariableKind::Duration => "D",
            VariableKind::Completion => "T",
        }
    }

    pub fn variable_name(self, code: &str) -> String {
        format!("{}_{}", self.prefix(), code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub id: VariableId,
    pub name: String,
    pub activity: String,
    pub kind: VariableKind,
    /// Day value of each state, in state order. Completion variables share
    /// one horizon list.
    pub states: Arc<[i64]>,
}

impl Variable {
    pub fn cardinality(&self) -> usize {
        self.states.len()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} states)", self.name, self.cardinality())
    }
}
