use super::VariableId;
use super::parent_combinations;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum CptTable {
    /// Probability per own state; the variable has no parents.
    Prior(Vec<f64>),
    /// One-hot columns stored as the index of the state holding probability 1.
    Deterministic(Vec<usize>),
}

/// Conditional probability table indexed by `[own state, parent column]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cpt {
    pub variable: VariableId,
    pub cardinality: usize,
    pub parents: Vec<VariableId>,
    pub evidence_card: Vec<usize>,
    pub table: CptTable,
}

impl Cpt {
    pub fn prior(variable: VariableId, probs: Vec<f64>) -> Self {
        Self {
            variable,
            cardinality: probs.len(),
            parents: Vec::new(),
            evidence_card: Vec::new(),
            table: CptTable::Prior(probs),
        }
    }

    pub fn deterministic(
        variable: VariableId,
        cardinality: usize,
        parents: Vec<VariableId>,
        evidence_card: Vec<usize>,
        targets: Vec<usize>,
    ) -> Self {
        Self {
            variable,
            cardinality,
            parents,
            evidence_card,
            table: CptTable::Deterministic(targets),
        }
    }

    pub fn is_deterministic(&self) -> bool {
        matches!(self.table, CptTable::Deterministic(_))
    }

    /// Columns actually stored in the table.
    pub fn column_count(&self) -> usize {
        match &self.table {
            CptTable::Prior(_) => 1,
            CptTable::Deterministic(targets) => targets.len(),
        }
    }

    /// Columns implied by the declared parent cardinalities.
    pub fn expected_columns(&self) -> Option<usize> {
        parent_combinations::column_count(&self.evidence_card)
    }

    pub fn column_index(&self, parent_states: &[usize]) -> Option<usize> {
        parent_combinations::column_index(&self.evidence_card, parent_states)
    }

    pub fn probability(&self, state: usize, column: usize) -> f64 {
        if state >= self.cardinality {
            return 0.0;
        }
        match &self.table {
            CptTable::Prior(probs) if column == 0 => probs[state],
            CptTable::Prior(_) => 0.0,
            CptTable::Deterministic(targets) => match targets.get(column) {
                Some(&target) if target == state => 1.0,
                _ => 0.0,
            },
        }
    }

    pub fn target_state(&self, column: usize) -> Option<usize> {
        match &self.table {
            CptTable::Deterministic(targets) => targets.get(column).copied(),
            CptTable::Prior(_) => None,
        }
    }

    pub fn column(&self, column: usize) -> Vec<f64> {
        (0..self.cardinality)
            .map(|state| self.probability(state, column))
            .collect()
    }

    /// Dense `[state][column]` matrix. Only sensible for small tables.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        let columns = self.column_count();
        (0..self.cardinality)
            .map(|state| {
                (0..columns)
                    .map(|column| self.probability(state, column))
                    .collect()
            })
            .collect()
    }
}
