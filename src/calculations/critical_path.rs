use crate::error::{AnalysisResult, InvalidParameterError, StructuralError};
use crate::graph::ProjectDag;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of a longest-path query. `Unreachable` is an expected result, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PathResult {
    Reached { path: Vec<String>, total_weight: f64 },
    Unreachable { start: String, end: String },
}

impl PathResult {
    pub fn is_reached(&self) -> bool {
        matches!(self, PathResult::Reached { .. })
    }

    pub fn total_weight(&self) -> Option<f64> {
        match self {
            PathResult::Reached { total_weight, .. } => Some(*total_weight),
            PathResult::Unreachable { .. } => None,
        }
    }

    pub fn path(&self) -> Option<&[String]> {
        match self {
            PathResult::Reached { path, .. } => Some(path),
            PathResult::Unreachable { .. } => None,
        }
    }

    pub fn chain(&self) -> String {
        match self {
            PathResult::Reached { path, .. } => path.join("->"),
            PathResult::Unreachable { start, end } => format!("no path {start}->{end}"),
        }
    }
}

/// Per-call node weights, dense by node index. Never stored on the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightAssignment {
    values: Vec<f64>,
}

impl WeightAssignment {
    pub fn from_map(
        dag: &ProjectDag,
        weights: &HashMap<String, f64>,
    ) -> Result<Self, InvalidParameterError> {
        let values = dag
            .activities()
            .map(|activity| {
                weights
                    .get(&activity.code)
                    .copied()
                    .ok_or_else(|| InvalidParameterError::MissingWeight {
                        code: activity.code.clone(),
                    })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        Self::from_dense(dag, values)
    }

    pub fn from_dense(dag: &ProjectDag, values: Vec<f64>) -> Result<Self, InvalidParameterError> {
        if values.len() != dag.len() {
            return Err(InvalidParameterError::SampleSetMismatch {
                reason: format!(
                    "{} weights supplied for {} activities",
                    values.len(),
                    dag.len()
                ),
            });
        }
        for (activity, &value) in dag.activities().zip(values.iter()) {
            if !value.is_finite() {
                return Err(InvalidParameterError::NonFiniteValue {
                    subject: activity.code.clone(),
                    value,
                });
            }
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Longest path over node weights. Topology is fixed at construction; weights
/// arrive per call, so one solver serves every Monte Carlo iteration.
///
/// Ties: nodes are relaxed in the code-ordered Kahn order and each node's
/// successors in ascending code. A candidate must be strictly greater to
/// replace the current best, so among equal predecessors the one earliest in
/// the topological order is kept.
#[derive(Debug, Clone)]
pub struct CriticalPathSolver {
    codes: Vec<String>,
    index: HashMap<String, usize>,
    order: Vec<usize>,
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
}

impl CriticalPathSolver {
    /// Fails with a cycle error before any relaxation can happen.
    pub fn new(dag: &ProjectDag) -> Result<Self, StructuralError> {
        let order: Vec<usize> = dag
            .topological_indices()?
            .into_iter()
            .map(|ix| ix.index())
            .collect();

        let codes = dag.codes();
        let index = codes
            .iter()
            .enumerate()
            .map(|(i, code)| (code.clone(), i))
            .collect();

        let graph = dag.graph();
        let mut successors = vec![Vec::new(); codes.len()];
        let mut predecessors = vec![Vec::new(); codes.len()];
        for edge in graph.raw_edges() {
            let (u, v) = (edge.source().index(), edge.target().index());
            successors[u].push(v);
            predecessors[v].push(u);
        }
        for list in successors.iter_mut().chain(predecessors.iter_mut()) {
            list.sort_by(|a, b| codes[*a].cmp(&codes[*b]));
        }

        Ok(Self {
            codes,
            index,
            order,
            successors,
            predecessors,
        })
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn successors_of(&self, node: usize) -> &[usize] {
        &self.successors[node]
    }

    pub fn predecessors_of(&self, node: usize) -> &[usize] {
        &self.predecessors[node]
    }

    pub fn index_of(&self, code: &str) -> Result<usize, StructuralError> {
        self.index
            .get(code)
            .copied()
            .ok_or_else(|| StructuralError::UnknownNode {
                code: code.to_string(),
            })
    }

    pub fn longest_path(
        &self,
        weights: &WeightAssignment,
        start: &str,
        end: &str,
    ) -> AnalysisResult<PathResult> {
        let start_ix = self.index_of(start)?;
        let end_ix = self.index_of(end)?;
        if weights.values.len() != self.len() {
            return Err(InvalidParameterError::SampleSetMismatch {
                reason: format!(
                    "{} weights supplied for {} activities",
                    weights.values.len(),
                    self.len()
                ),
            }
            .into());
        }
        Ok(self.longest_path_between(&weights.values, start_ix, end_ix))
    }

    /// Index-level query; `weights` must hold one finite value per node.
    pub(crate) fn longest_path_between(&self, weights: &[f64], start: usize, end: usize) -> PathResult {
        let n = self.len();
        let mut dist = vec![f64::NEG_INFINITY; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        dist[start] = weights[start];

        self.relax(weights, &mut dist, &mut prev);

        if dist[end] == f64::NEG_INFINITY {
            return PathResult::Unreachable {
                start: self.codes[start].clone(),
                end: self.codes[end].clone(),
            };
        }
        PathResult::Reached {
            path: self.trace(&prev, end),
            total_weight: dist[end],
        }
    }

    /// Heaviest path anywhere in the graph: every node may start a path.
    pub fn longest_path_overall(&self, weights: &WeightAssignment) -> Option<PathResult> {
        let weights = &weights.values;
        let mut dist = weights.clone();
        let mut prev: Vec<Option<usize>> = vec![None; self.len()];
        self.relax(weights, &mut dist, &mut prev);

        let mut best: Option<usize> = None;
        for &node in &self.order {
            if best.is_none_or(|b| dist[node] > dist[b]) {
                best = Some(node);
            }
        }
        best.map(|end| PathResult::Reached {
            path: self.trace(&prev, end),
            total_weight: dist[end],
        })
    }

    fn relax(&self, weights: &[f64], dist: &mut [f64], prev: &mut [Option<usize>]) {
        for &u in &self.order {
            if dist[u] == f64::NEG_INFINITY {
                continue;
            }
            for &v in &self.successors[u] {
                let candidate = dist[u] + weights[v];
                if candidate > dist[v] {
                    dist[v] = candidate;
                    prev[v] = Some(u);
                }
            }
        }
    }

    fn trace(&self, prev: &[Option<usize>], end: usize) -> Vec<String> {
        let mut path = vec![self.codes[end].clone()];
        let mut current = end;
        while let Some(p) = prev[current] {
            path.push(self.codes[p].clone());
            current = p;
        }
        path.reverse();
        path
    }
}
