use super::critical_path::{CriticalPathSolver, WeightAssignment};

pub struct ForwardPass<'a> {
    solver: &'a CriticalPathSolver,
}

impl<'a> ForwardPass<'a> {
    pub fn new(solver: &'a CriticalPathSolver) -> Self {
        Self { solver }
    }

    /// Early (start, finish) per node index, measured from time zero.
    pub fn execute(&self, weights: &WeightAssignment) -> Vec<(f64, f64)> {
        let durations = weights.values();
        let mut early = vec![(0.0, 0.0); self.solver.len()];

        for &node in self.solver.order() {
            // Early start is the latest predecessor finish
            let early_start = self
                .solver
                .predecessors_of(node)
                .iter()
                .map(|&pred| early[pred].1)
                .fold(0.0, f64::max);
            early[node] = (early_start, early_start + durations[node]);
        }

        early
    }
}
