use crate::activity::{Activity, DurationSpec};
use crate::activity_validation;
use crate::calculations::critical_path::{CriticalPathSolver, PathResult, WeightAssignment};
use crate::error::{AnalysisResult, StructuralError};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap};

/// Activities and their precedence edges. Durations live on the activities as
/// specs only; numeric weights are always supplied per computation.
#[derive(Debug, Clone, Default)]
pub struct ProjectDag {
    graph: DiGraph<Activity, ()>,
    code_to_index: HashMap<String, NodeIndex>,
}

impl ProjectDag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from ingested records. All nodes are declared before any edge, so
    /// record order does not matter.
    pub fn from_activities(activities: &[Activity]) -> AnalysisResult<Self> {
        activity_validation::validate_activity_collection(activities)?;

        let mut dag = Self::new();
        for activity in activities {
            dag.add_activity(
                activity.code.clone(),
                activity.label.clone(),
                activity.duration.clone(),
            )?;
        }
        for activity in activities {
            for pred in &activity.predecessors {
                dag.add_precedence(pred, &activity.code)?;
            }
        }
        Ok(dag)
    }

    pub fn add_activity(
        &mut self,
        code: impl Into<String>,
        label: impl Into<String>,
        duration: DurationSpec,
    ) -> Result<NodeIndex, StructuralError> {
        let code = code.into();
        if self.code_to_index.contains_key(&code) {
            return Err(StructuralError::DuplicateNode { code });
        }
        let node_ix = self
            .graph
            .add_node(Activity::new(code.clone(), label, duration));
        self.code_to_index.insert(code, node_ix);
        Ok(node_ix)
    }

    pub fn add_precedence(&mut self, pred: &str, succ: &str) -> Result<(), StructuralError> {
        let missing = |code: &str| StructuralError::UnknownEdgeEndpoint {
            pred: pred.to_string(),
            succ: succ.to_string(),
            missing: code.to_string(),
        };
        let u = *self.code_to_index.get(pred).ok_or_else(|| missing(pred))?;
        let v = *self.code_to_index.get(succ).ok_or_else(|| missing(succ))?;

        // No parallel edges: repeated precedences collapse into one.
        if self.graph.find_edge(u, v).is_none() {
            self.graph.add_edge(u, v, ());
            self.graph[v].predecessors.push(pred.to_string());
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.code_to_index.contains_key(code)
    }

    pub fn index_of(&self, code: &str) -> Option<NodeIndex> {
        self.code_to_index.get(code).copied()
    }

    pub(crate) fn require(&self, code: &str) -> Result<NodeIndex, StructuralError> {
        self.index_of(code).ok_or_else(|| StructuralError::UnknownNode {
            code: code.to_string(),
        })
    }

    pub fn activity(&self, code: &str) -> Option<&Activity> {
        self.index_of(code).map(|ix| &self.graph[ix])
    }

    pub fn activity_at(&self, node_ix: NodeIndex) -> &Activity {
        &self.graph[node_ix]
    }

    /// Activities in declaration order. Position `i` matches `NodeIndex::new(i)`.
    pub fn activities(&self) -> impl Iterator<Item = &Activity> + '_ {
        self.graph.node_indices().map(move |ix| &self.graph[ix])
    }

    pub fn codes(&self) -> Vec<String> {
        self.activities().map(|a| a.code.clone()).collect()
    }

    pub(crate) fn graph(&self) -> &DiGraph<Activity, ()> {
        &self.graph
    }

    pub fn predecessors(&self, code: &str) -> Result<Vec<&str>, StructuralError> {
        self.neighbor_codes(code, Direction::Incoming)
    }

    pub fn successors(&self, code: &str) -> Result<Vec<&str>, StructuralError> {
        self.neighbor_codes(code, Direction::Outgoing)
    }

    fn neighbor_codes(&self, code: &str, dir: Direction) -> Result<Vec<&str>, StructuralError> {
        let node_ix = self.require(code)?;
        let mut codes: Vec<&str> = self
            .graph
            .neighbors_directed(node_ix, dir)
            .map(|ix| self.graph[ix].code.as_str())
            .collect();
        codes.sort_unstable();
        Ok(codes)
    }

    /// Activities without predecessors, sorted by code.
    pub fn sources(&self) -> Vec<&str> {
        self.boundary(Direction::Incoming)
    }

    /// Activities without successors, sorted by code.
    pub fn sinks(&self) -> Vec<&str> {
        self.boundary(Direction::Outgoing)
    }

    fn boundary(&self, dir: Direction) -> Vec<&str> {
        let mut codes: Vec<&str> = self
            .graph
            .node_indices()
            .filter(|&ix| self.graph.neighbors_directed(ix, dir).next().is_none())
            .map(|ix| self.graph[ix].code.as_str())
            .collect();
        codes.sort_unstable();
        codes
    }

    /// Kahn's algorithm. The ready set is ordered by activity code, so the
    /// resulting order does not depend on declaration order.
    pub fn topological_indices(&self) -> Result<Vec<NodeIndex>, StructuralError> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|ix| {
                self.graph
                    .neighbors_directed(ix, Direction::Incoming)
                    .count()
            })
            .collect();

        let mut ready: BTreeSet<(&str, NodeIndex)> = self
            .graph
            .node_indices()
            .filter(|ix| in_degree[ix.index()] == 0)
            .map(|ix| (self.graph[ix].code.as_str(), ix))
            .collect();

        let mut order = Vec::with_capacity(self.len());
        while let Some((_, node_ix)) = ready.pop_first() {
            order.push(node_ix);
            for succ_ix in self.graph.neighbors_directed(node_ix, Direction::Outgoing) {
                let deg = &mut in_degree[succ_ix.index()];
                *deg -= 1;
                if *deg == 0 {
                    ready.insert((self.graph[succ_ix].code.as_str(), succ_ix));
                }
            }
        }

        if order.len() < self.len() {
            let mut unresolved: Vec<String> = self
                .graph
                .node_indices()
                .filter(|ix| in_degree[ix.index()] > 0)
                .map(|ix| self.graph[ix].code.clone())
                .collect();
            unresolved.sort_unstable();
            return Err(StructuralError::CycleDetected {
                ordered: order.len(),
                total: self.len(),
                unresolved,
            });
        }
        Ok(order)
    }

    pub fn topological_order(&self) -> Result<Vec<String>, StructuralError> {
        Ok(self
            .topological_indices()?
            .into_iter()
            .map(|ix| self.graph[ix].code.clone())
            .collect())
    }

    /// Point-estimate durations keyed by activity code.
    pub fn point_weights(&self) -> HashMap<String, f64> {
        self.activities()
            .map(|a| (a.code.clone(), a.duration.point_estimate()))
            .collect()
    }

    /// One-shot critical path for a code -> weight mapping. Repeated callers
    /// should build a [`CriticalPathSolver`] once and reuse it.
    pub fn longest_path(
        &self,
        weights: &HashMap<String, f64>,
        start: &str,
        end: &str,
    ) -> AnalysisResult<PathResult> {
        let solver = CriticalPathSolver::new(self)?;
        let weights = WeightAssignment::from_map(self, weights)?;
        solver.longest_path(&weights, start, end)
    }
}
