use super::critical_path::{CriticalPathSolver, WeightAssignment};

pub struct BackwardPass<'a> {
    solver: &'a CriticalPathSolver,
}

impl<'a> BackwardPass<'a> {
    pub fn new(solver: &'a CriticalPathSolver) -> Self {
        Self { solver }
    }

    /// Late (start, finish) per node index for the given project finish.
    pub fn execute(&self, weights: &WeightAssignment, project_finish: f64) -> Vec<(f64, f64)> {
        let durations = weights.values();
        let mut late = vec![(project_finish, project_finish); self.solver.len()];

        // Reverse topological order
        for &node in self.solver.order().iter().rev() {
            let late_finish = self
                .solver
                .successors_of(node)
                .iter()
                .map(|&succ| late[succ].0)
                .fold(project_finish, f64::min);
            late[node] = (late_finish - durations[node], late_finish);
        }

        late
    }
}
