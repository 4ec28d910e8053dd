use super::cpt::Cpt;
use super::model::BayesianModel;
use super::parent_combinations::{self, ParentCombinations};
use super::{Variable, VariableId, VariableKind};
use crate::calculations::critical_path::CriticalPathSolver;
use crate::discretize::{DiscreteDistribution, Discretization};
use crate::error::{AnalysisResult, ModelValidationError};
use crate::graph::ProjectDag;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_HORIZON_MARGIN: usize = 5;
pub const DEFAULT_MAX_CPT_COLUMNS: usize = 1_000_000;
pub const DEFAULT_MAX_COMPLETION_STATES: usize = 100_000;

pub struct BayesianNetworkBuilder<'a> {
    dag: &'a ProjectDag,
    discretization: &'a Discretization,
    horizon_margin: usize,
    max_cpt_columns: usize,
    max_completion_states: usize,
}

impl<'a> BayesianNetworkBuilder<'a> {
    pub fn new(dag: &'a ProjectDag, discretization: &'a Discretization) -> Self {
        Self {
            dag,
            discretization,
            horizon_margin: DEFAULT_HORIZON_MARGIN,
            max_cpt_columns: DEFAULT_MAX_CPT_COLUMNS,
            max_completion_states: DEFAULT_MAX_COMPLETION_STATES,
        }
    }

    pub fn with_horizon_margin(mut self, margin: usize) -> Self {
        self.horizon_margin = margin;
        self
    }

    pub fn with_max_cpt_columns(mut self, limit: usize) -> Self {
        self.max_cpt_columns = limit;
        self
    }

    pub fn with_max_completion_states(mut self, limit: usize) -> Self {
        self.max_completion_states = limit;
        self
    }

    pub fn build(&self) -> AnalysisResult<BayesianModel> {
        let solver = CriticalPathSolver::new(self.dag)?;
        let distributions = self.distributions()?;
        let num_states = self.completion_states(&solver, &distributions)?;

        info!(
            activities = self.dag.len(),
            completion_states = num_states,
            "building completion-time network"
        );

        let last_state = last_completion_label(&solver, num_states, self.max_completion_states)?;
        let completion_labels: Arc<[i64]> = (0..=last_state).collect();
        let mut variables = Vec::with_capacity(2 * solver.len());
        let mut cpts = Vec::with_capacity(2 * solver.len());
        let mut completion_ids: Vec<Option<VariableId>> = vec![None; solver.len()];

        for &node in solver.order() {
            let code = &solver.codes()[node];
            let distribution = distributions[node];

            // Duration variable with its empirical prior
            let d_id = VariableId(variables.len());
            variables.push(Variable {
                id: d_id,
                name: VariableKind::Duration.variable_name(code),
                activity: code.clone(),
                kind: VariableKind::Duration,
                states: distribution.labels.as_slice().into(),
            });
            cpts.push(Cpt::prior(d_id, distribution.probs.clone()));

            // Completion variable: own duration, then predecessor completions by code
            let t_id = VariableId(variables.len());
            let mut parents = vec![d_id];
            for &pred in solver.predecessors_of(node) {
                let pred_t = completion_ids[pred].ok_or_else(|| {
                    ModelValidationError::NotTopological {
                        variable: VariableKind::Completion.variable_name(code),
                        parent: VariableKind::Completion.variable_name(&solver.codes()[pred]),
                    }
                })?;
                parents.push(pred_t);
            }
            let mut evidence_card = vec![distribution.len()];
            evidence_card.resize(parents.len(), num_states);

            let targets = self.completion_targets(code, distribution, &evidence_card, last_state)?;
            variables.push(Variable {
                id: t_id,
                name: VariableKind::Completion.variable_name(code),
                activity: code.clone(),
                kind: VariableKind::Completion,
                states: Arc::clone(&completion_labels),
            });
            cpts.push(Cpt::deterministic(
                t_id,
                num_states,
                parents,
                evidence_card,
                targets,
            ));
            completion_ids[node] = Some(t_id);
        }

        let model = BayesianModel::new(variables, cpts, num_states);
        model.check_model()?;
        info!(variables = model.len(), "completion-time network built");
        Ok(model)
    }

    /// Discretized duration per node index.
    fn distributions(&self) -> Result<Vec<&'a DiscreteDistribution>, ModelValidationError> {
        self.dag
            .activities()
            .map(|activity| {
                let distribution = self.discretization.get(&activity.code).ok_or_else(|| {
                    ModelValidationError::MissingDistribution {
                        code: activity.code.clone(),
                    }
                })?;
                if distribution.is_empty() || distribution.labels.len() != distribution.probs.len() {
                    return Err(ModelValidationError::InvalidTable {
                        variable: VariableKind::Duration.variable_name(&activity.code),
                        reason: format!(
                            "{} labels with {} probabilities",
                            distribution.labels.len(),
                            distribution.probs.len()
                        ),
                    });
                }
                Ok(distribution)
            })
            .collect()
    }

    /// Horizon from the heaviest path under each activity's largest duration
    /// label, plus the safety margin. Path totals are accumulated in integer
    /// days and stop at `max_completion_states`.
    fn completion_states(
        &self,
        solver: &CriticalPathSolver,
        distributions: &[&DiscreteDistribution],
    ) -> Result<usize, ModelValidationError> {
        let limit = self.max_completion_states;
        let exceeded = |node: usize, required: String| ModelValidationError::CapacityExceeded {
            activity: solver.codes()[node].clone(),
            required,
            limit,
        };

        let mut finish = vec![0usize; solver.len()];
        let mut horizon = self.horizon_margin;
        for &node in solver.order() {
            let latest_pred = solver
                .predecessors_of(node)
                .iter()
                .map(|&pred| finish[pred])
                .max()
                .unwrap_or(0);
            let longest = distributions[node].max_label().unwrap_or(0).max(0);
            let states = usize::try_from(longest)
                .ok()
                .and_then(|days| latest_pred.checked_add(days))
                .and_then(|end| Some((end, end.checked_add(self.horizon_margin)?)));
            match states {
                Some((end, states)) if states <= limit => {
                    finish[node] = end;
                    horizon = horizon.max(states);
                }
                Some((_, states)) => {
                    return Err(exceeded(node, format!("{states} completion states")));
                }
                None => {
                    return Err(exceeded(
                        node,
                        format!("more than {} completion states", usize::MAX),
                    ));
                }
            }
        }
        Ok(horizon.max(1))
    }

    /// One target state per parent column: latest predecessor completion plus
    /// this activity's duration, clamped into the horizon.
    fn completion_targets(
        &self,
        code: &str,
        distribution: &DiscreteDistribution,
        evidence_card: &[usize],
        last_state: i64,
    ) -> Result<Vec<usize>, ModelValidationError> {
        let columns = match parent_combinations::column_count(evidence_card) {
            Some(columns) if columns <= self.max_cpt_columns => columns,
            Some(columns) => {
                return Err(ModelValidationError::CapacityExceeded {
                    activity: code.to_string(),
                    required: format!("{columns} parent combinations"),
                    limit: self.max_cpt_columns,
                });
            }
            None => {
                return Err(ModelValidationError::CapacityExceeded {
                    activity: code.to_string(),
                    required: format!("more than {} parent combinations", usize::MAX),
                    limit: self.max_cpt_columns,
                });
            }
        };

        let mut targets = Vec::with_capacity(columns);
        let mut clamped = 0usize;
        let mut combinations = ParentCombinations::new(evidence_card.to_vec());
        while let Some(digits) = combinations.advance() {
            let duration = distribution.labels[digits[0]];
            let latest_pred = digits[1..].iter().copied().max().unwrap_or(0) as i64;
            let candidate = latest_pred.saturating_add(duration);
            if candidate < 0 || candidate > last_state {
                clamped += 1;
            }
            targets.push(candidate.clamp(0, last_state) as usize);
        }

        debug!(activity = code, columns, "completion table built");
        if clamped > 0 {
            warn!(
                activity = code,
                clamped,
                columns,
                "completion values clamped to the horizon"
            );
        }
        Ok(targets)
    }
}

/// Largest completion label, `num_states - 1`, as a day count.
fn last_completion_label(
    solver: &CriticalPathSolver,
    num_states: usize,
    limit: usize,
) -> Result<i64, ModelValidationError> {
    i64::try_from(num_states - 1).map_err(|_| ModelValidationError::CapacityExceeded {
        activity: solver.codes().last().cloned().unwrap_or_default(),
        required: format!("{num_states} completion states"),
        limit,
    })
}
