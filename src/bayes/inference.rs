use super::model::BayesianModel;
use super::{VariableId, VariableKind};
use crate::error::{AnalysisResult, InferenceError, ModelValidationError};
use crossbeam_channel::RecvTimeoutError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Observed duration states, keyed by duration variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    observed: BTreeMap<VariableId, usize>,
}

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix activity `code` to take exactly `days`.
    pub fn observe_duration(
        &mut self,
        model: &BayesianModel,
        code: &str,
        days: i64,
    ) -> Result<&mut Self, ModelValidationError> {
        let variable = model.duration_variable(code)?;
        let state = variable
            .states
            .binary_search(&days)
            .map_err(|_| ModelValidationError::EvidenceOutOfRange {
                variable: variable.name.clone(),
                value: days,
            })?;
        self.observed.insert(variable.id, state);
        Ok(self)
    }

    pub fn get(&self, id: VariableId) -> Option<usize> {
        self.observed.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableId, usize)> + '_ {
        self.observed.iter().map(|(&id, &state)| (id, state))
    }

    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    pub fn validate(&self, model: &BayesianModel) -> Result<(), ModelValidationError> {
        for (id, state) in self.iter() {
            let variable = model
                .variable(id)
                .ok_or_else(|| ModelValidationError::UnknownVariable {
                    name: format!("#{}", id.index()),
                })?;
            if variable.kind != VariableKind::Duration {
                return Err(ModelValidationError::NotADurationVariable {
                    variable: variable.name.clone(),
                });
            }
            if state >= variable.cardinality() {
                return Err(ModelValidationError::EvidenceOutOfRange {
                    variable: variable.name.clone(),
                    value: state as i64,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceQuery {
    pub variables: Vec<VariableId>,
    pub evidence: Evidence,
}

impl InferenceQuery {
    pub fn new(variables: Vec<VariableId>, evidence: Evidence) -> Self {
        Self {
            variables,
            evidence,
        }
    }

    /// Posterior completion time of one activity.
    pub fn completion_of(
        model: &BayesianModel,
        code: &str,
        evidence: Evidence,
    ) -> Result<Self, ModelValidationError> {
        let variable = model.completion_variable(code)?;
        Ok(Self::new(vec![variable.id], evidence))
    }

    pub fn validate(&self, model: &BayesianModel) -> Result<(), ModelValidationError> {
        if let Some(missing) = self.variables.iter().find(|id| model.variable(**id).is_none()) {
            return Err(ModelValidationError::UnknownVariable {
                name: format!("#{}", missing.index()),
            });
        }
        self.evidence.validate(model)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marginal {
    pub variable: VariableId,
    pub probs: Vec<f64>,
}

/// The exact-inference capability. Implementations should poll `cancel` and
/// return [`InferenceError::Cancelled`] once it is raised.
pub trait InferenceEngine: Send + Sync {
    fn query(
        &self,
        model: &BayesianModel,
        query: &InferenceQuery,
        cancel: &AtomicBool,
    ) -> Result<Vec<Marginal>, InferenceError>;
}

/// Run `query` on a worker thread, giving up after `timeout`. On timeout the
/// cancel flag is raised and the worker is left to wind down on its own.
pub fn query_with_timeout(
    engine: Arc<dyn InferenceEngine>,
    model: Arc<BayesianModel>,
    query: InferenceQuery,
    timeout: Duration,
) -> AnalysisResult<Vec<Marginal>> {
    query.validate(&model)?;

    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = crossbeam_channel::bounded(1);
    let worker_cancel = Arc::clone(&cancel);
    thread::spawn(move || {
        let result = engine.query(&model, &query, &worker_cancel);
        // The receiver is gone if the caller already timed out.
        let _ = tx.send(result);
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            debug!(?timeout, ok = result.is_ok(), "inference query returned");
            Ok(result?)
        }
        Err(RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::SeqCst);
            warn!(?timeout, "inference query timed out");
            Err(InferenceError::Timeout(timeout).into())
        }
        Err(RecvTimeoutError::Disconnected) => Err(InferenceError::Disconnected.into()),
    }
}
