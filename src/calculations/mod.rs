pub mod backward_pass;
pub mod critical_path;
pub mod forward_pass;

use backward_pass::BackwardPass;
use critical_path::{CriticalPathSolver, WeightAssignment};
use forward_pass::ForwardPass;
use serde::{Deserialize, Serialize};

const FLOAT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTimes {
    pub code: String,
    pub duration: f64,
    pub early_start: f64,
    pub early_finish: f64,
    pub late_start: f64,
    pub late_finish: f64,
    pub total_float: f64,
    pub is_critical: bool,
}

/// Forward and backward passes over one weight assignment. Returns the
/// per-activity times in declaration order and the project finish.
pub fn schedule_times(
    solver: &CriticalPathSolver,
    weights: &WeightAssignment,
) -> (Vec<ActivityTimes>, f64) {
    let early = ForwardPass::new(solver).execute(weights);
    let project_finish = early.iter().map(|&(_, ef)| ef).fold(0.0, f64::max);
    let late = BackwardPass::new(solver).execute(weights, project_finish);

    let times = solver
        .codes()
        .iter()
        .enumerate()
        .map(|(node, code)| {
            let (early_start, early_finish) = early[node];
            let (late_start, late_finish) = late[node];
            let total_float = late_start - early_start;
            ActivityTimes {
                code: code.clone(),
                duration: weights.values()[node],
                early_start,
                early_finish,
                late_start,
                late_finish,
                total_float,
                is_critical: total_float.abs() <= FLOAT_EPSILON,
            }
        })
        .collect();
    (times, project_finish)
}
