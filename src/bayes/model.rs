use super::cpt::{Cpt, CptTable};
use super::{Variable, VariableId, VariableKind};
use crate::error::ModelValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Read-only once built. Variables are stored in topological order and
/// `cpts[i]` belongs to `variables[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BayesianModel {
    variables: Vec<Variable>,
    cpts: Vec<Cpt>,
    by_name: HashMap<String, VariableId>,
    num_completion_states: usize,
}

impl BayesianModel {
    pub(crate) fn new(variables: Vec<Variable>, cpts: Vec<Cpt>, num_completion_states: usize) -> Self {
        let by_name = variables
            .iter()
            .map(|v| (v.name.clone(), v.id))
            .collect();
        Self {
            variables,
            cpts,
            by_name,
            num_completion_states,
        }
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Shared state count of every completion variable.
    pub fn num_completion_states(&self) -> usize {
        self.num_completion_states
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn cpts(&self) -> &[Cpt] {
        &self.cpts
    }

    pub fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.variables.get(id.index())
    }

    pub fn cpt(&self, id: VariableId) -> Option<&Cpt> {
        self.cpts.get(id.index())
    }

    pub fn variable_by_name(&self, name: &str) -> Result<&Variable, ModelValidationError> {
        self.by_name
            .get(name)
            .map(|id| &self.variables[id.index()])
            .ok_or_else(|| ModelValidationError::UnknownVariable {
                name: name.to_string(),
            })
    }

    pub fn duration_variable(&self, code: &str) -> Result<&Variable, ModelValidationError> {
        self.variable_by_name(&VariableKind::Duration.variable_name(code))
    }

    pub fn completion_variable(&self, code: &str) -> Result<&Variable, ModelValidationError> {
        self.variable_by_name(&VariableKind::Completion.variable_name(code))
    }

    pub fn parents(&self, id: VariableId) -> &[VariableId] {
        self.cpts
            .get(id.index())
            .map(|cpt| cpt.parents.as_slice())
            .unwrap_or(&[])
    }

    /// Directed edges `parent -> child`.
    pub fn edges(&self) -> Vec<(VariableId, VariableId)> {
        self.cpts
            .iter()
            .flat_map(|cpt| cpt.parents.iter().map(move |&p| (p, cpt.variable)))
            .collect()
    }

    /// Structural and numeric consistency of every table.
    pub fn check_model(&self) -> Result<(), ModelValidationError> {
        if self.cpts.len() != self.variables.len() {
            return Err(ModelValidationError::InvalidTable {
                variable: "<model>".into(),
                reason: format!(
                    "{} tables for {} variables",
                    self.cpts.len(),
                    self.variables.len()
                ),
            });
        }

        for (position, (variable, cpt)) in self.variables.iter().zip(&self.cpts).enumerate() {
            if variable.id.index() != position || cpt.variable != variable.id {
                return Err(ModelValidationError::InvalidTable {
                    variable: variable.name.clone(),
                    reason: format!("table stored at position {position} belongs elsewhere"),
                });
            }
            if cpt.cardinality != variable.cardinality() {
                return Err(ModelValidationError::StateCountMismatch {
                    variable: variable.name.clone(),
                    declared: cpt.cardinality,
                    actual: variable.cardinality(),
                });
            }
            if cpt.parents.len() != cpt.evidence_card.len() {
                return Err(ModelValidationError::InvalidTable {
                    variable: variable.name.clone(),
                    reason: format!(
                        "{} parents but {} evidence cardinalities",
                        cpt.parents.len(),
                        cpt.evidence_card.len()
                    ),
                });
            }
            self.check_parents(variable, cpt)?;
            self.check_table(variable, cpt)?;
        }
        Ok(())
    }

    fn check_parents(&self, variable: &Variable, cpt: &Cpt) -> Result<(), ModelValidationError> {
        for (&parent_id, &declared) in cpt.parents.iter().zip(&cpt.evidence_card) {
            let parent = self.variable(parent_id).ok_or_else(|| {
                ModelValidationError::UnknownVariable {
                    name: format!("#{}", parent_id.index()),
                }
            })?;
            // Parents precede children, so the graph cannot contain a cycle.
            if parent_id >= variable.id {
                return Err(ModelValidationError::NotTopological {
                    variable: variable.name.clone(),
                    parent: parent.name.clone(),
                });
            }
            if declared != parent.cardinality() {
                return Err(ModelValidationError::CardinalityMismatch {
                    variable: variable.name.clone(),
                    parent: parent.name.clone(),
                    declared,
                    actual: parent.cardinality(),
                });
            }
        }
        Ok(())
    }

    fn check_table(&self, variable: &Variable, cpt: &Cpt) -> Result<(), ModelValidationError> {
        let invalid = |reason: String| ModelValidationError::InvalidTable {
            variable: variable.name.clone(),
            reason,
        };
        match &cpt.table {
            CptTable::Prior(probs) => {
                if !cpt.parents.is_empty() {
                    return Err(invalid("prior table declared with parents".into()));
                }
                if probs.iter().any(|p| !p.is_finite() || *p < 0.0) {
                    return Err(invalid("prior holds a negative or non-finite probability".into()));
                }
                let total: f64 = probs.iter().sum();
                if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
                    return Err(invalid(format!("prior sums to {total}")));
                }
            }
            CptTable::Deterministic(targets) => {
                let expected = cpt.expected_columns().ok_or_else(|| {
                    invalid("parent combination count overflows".into())
                })?;
                if targets.len() != expected {
                    return Err(ModelValidationError::ColumnCountMismatch {
                        variable: variable.name.clone(),
                        expected,
                        found: targets.len(),
                    });
                }
                if let Some(bad) = targets.iter().find(|&&t| t >= cpt.cardinality) {
                    return Err(invalid(format!("column targets missing state {bad}")));
                }
            }
        }
        Ok(())
    }
}
