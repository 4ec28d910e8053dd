use crate::activity::Activity;
use crate::activity_validation;
use crate::bayes::{
    BayesianModel, BayesianNetworkBuilder, InferenceEngine, InferenceQuery, Marginal,
    query_with_timeout,
};
use crate::calculations::critical_path::{CriticalPathSolver, PathResult, WeightAssignment};
use crate::calculations::{ActivityTimes, schedule_times};
use crate::config::AnalysisConfig;
use crate::discretize::{Discretization, Discretizer};
use crate::error::{AnalysisError, AnalysisResult};
use crate::graph::ProjectDag;
use crate::risk::RiskSummary;
use crate::sampling::DistributionSampler;
use crate::simulation::{MonteCarloSimulator, SimulationReport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub path: PathResult,
    pub project_finish: f64,
    pub times: Vec<ActivityTimes>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub activity_count: usize,
    pub precedence_count: usize,
    pub baseline_duration: Option<f64>,
    pub critical_path: Vec<String>,
    pub samples: Option<usize>,
    pub unreachable_samples: usize,
    pub risk: Option<RiskSummary>,
    pub network_variables: Option<usize>,
    pub completion_states: Option<usize>,
}

impl AnalysisSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("activities={}", self.activity_count));
        parts.push(format!("precedences={}", self.precedence_count));
        if let Some(duration) = self.baseline_duration {
            parts.push(format!("baseline={duration:.2}"));
        }
        if let Some(samples) = self.samples {
            parts.push(format!("samples={samples}"));
        }
        if self.unreachable_samples > 0 {
            parts.push(format!("unreachable={}", self.unreachable_samples));
        }
        if let Some(risk) = &self.risk {
            parts.push(format!("mean={:.2}", risk.mean));
            parts.push(format!(
                "VaR{:.0}={:.2}",
                risk.confidence * 100.0,
                risk.value_at_risk
            ));
            parts.push(format!(
                "CVaR{:.0}={:.2}",
                risk.confidence * 100.0,
                risk.conditional_value_at_risk
            ));
        }
        if let Some(variables) = self.network_variables {
            parts.push(format!("network_vars={variables}"));
        }
        if let Some(states) = self.completion_states {
            parts.push(format!("horizon={states}"));
        }
        if !self.critical_path.is_empty() {
            parts.push(format!("crit_path={}", self.critical_path.join("->")));
        }
        parts.join(", ")
    }
}

/// One planning session: the activity list plus the artifacts derived from
/// the most recent run. Editing activities discards those artifacts.
#[derive(Default)]
pub struct Analysis {
    activities: Vec<Activity>,
    config: AnalysisConfig,
    report: Option<SimulationReport>,
    discretization: Option<Discretization>,
    model: Option<Arc<BayesianModel>>,
}

impl Analysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> AnalysisResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn from_activities(
        activities: Vec<Activity>,
        config: AnalysisConfig,
    ) -> AnalysisResult<Self> {
        let mut analysis = Self::with_config(config)?;
        analysis.replace_activities(activities)?;
        Ok(analysis)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AnalysisConfig) -> AnalysisResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn update_config_with<F>(&mut self, mutator: F) -> AnalysisResult<()>
    where
        F: FnOnce(&mut AnalysisConfig),
    {
        let mut config = self.config.clone();
        mutator(&mut config);
        self.set_config(config)
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// Replace the whole activity list; rejected lists (including cyclic ones)
    /// leave the session untouched.
    pub fn replace_activities(&mut self, activities: Vec<Activity>) -> AnalysisResult<()> {
        ProjectDag::from_activities(&activities)?.topological_indices()?;
        self.activities = activities;
        self.clear_artifacts();
        Ok(())
    }

    /// Insert or replace the activity with the same code.
    pub fn add_activity(&mut self, activity: Activity) -> AnalysisResult<()> {
        activity_validation::validate_activity(&activity)?;
        let mut activities = self.activities.clone();
        match activities.iter_mut().find(|a| a.code == activity.code) {
            Some(existing) => *existing = activity,
            None => activities.push(activity),
        }
        self.replace_activities(activities)
    }

    /// Remove an activity and every precedence that mentions it.
    pub fn remove_activity(&mut self, code: &str) -> bool {
        let before = self.activities.len();
        self.activities.retain(|a| a.code != code);
        if self.activities.len() == before {
            return false;
        }
        for activity in &mut self.activities {
            activity.predecessors.retain(|p| p != code);
        }
        self.clear_artifacts();
        true
    }

    fn clear_artifacts(&mut self) {
        self.report = None;
        self.discretization = None;
        self.model = None;
    }

    pub fn graph(&self) -> AnalysisResult<ProjectDag> {
        ProjectDag::from_activities(&self.activities)
    }

    /// Explicit endpoints win. Otherwise a lone source/sink is used, falling
    /// back to the ends of the point-estimate critical path.
    fn resolve_endpoints(
        &self,
        dag: &ProjectDag,
        solver: &CriticalPathSolver,
        start: Option<&str>,
        end: Option<&str>,
    ) -> AnalysisResult<(String, String)> {
        if let (Some(start), Some(end)) = (start, end) {
            return Ok((start.to_string(), end.to_string()));
        }
        let weights = WeightAssignment::from_map(dag, &dag.point_weights())?;
        let overall = solver
            .longest_path_overall(&weights)
            .ok_or_else(|| AnalysisError::MissingArtifact("no activities declared".into()))?;
        let path = overall.path().unwrap_or(&[]);

        let sources = dag.sources();
        let sinks = dag.sinks();
        let start = match (start, sources.as_slice()) {
            (Some(code), _) => code.to_string(),
            (None, [only]) => only.to_string(),
            (None, _) => path.first().cloned().unwrap_or_default(),
        };
        let end = match (end, sinks.as_slice()) {
            (Some(code), _) => code.to_string(),
            (None, [only]) => only.to_string(),
            (None, _) => path.last().cloned().unwrap_or_default(),
        };
        Ok((start, end))
    }

    /// Deterministic critical path and CPM times under point-estimate durations.
    pub fn baseline(&self, start: Option<&str>, end: Option<&str>) -> AnalysisResult<Baseline> {
        let dag = self.graph()?;
        let solver = CriticalPathSolver::new(&dag)?;
        let (start, end) = self.resolve_endpoints(&dag, &solver, start, end)?;
        let weights = WeightAssignment::from_map(&dag, &dag.point_weights())?;
        let path = solver.longest_path(&weights, &start, &end)?;
        let (times, project_finish) = schedule_times(&solver, &weights);
        Ok(Baseline {
            path,
            project_finish,
            times,
        })
    }

    pub fn simulate(
        &mut self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> AnalysisResult<&SimulationReport> {
        let dag = self.graph()?;
        let solver = CriticalPathSolver::new(&dag)?;
        let (start, end) = self.resolve_endpoints(&dag, &solver, start, end)?;

        let mut sampler = DistributionSampler::seeded(self.config.seed);
        let report = MonteCarloSimulator::new(&dag)?
            .with_parallel(self.config.parallel)
            .run(
                &mut sampler,
                self.config.method,
                self.config.samples,
                &start,
                &end,
            )?;

        self.discretization = None;
        self.model = None;
        Ok(self.report.insert(report))
    }

    pub fn report(&self) -> Option<&SimulationReport> {
        self.report.as_ref()
    }

    fn require_report(&self) -> AnalysisResult<&SimulationReport> {
        self.report
            .as_ref()
            .ok_or_else(|| AnalysisError::MissingArtifact("run a simulation first".into()))
    }

    pub fn risk(&self) -> AnalysisResult<RiskSummary> {
        self.risk_at(self.config.confidence)
    }

    pub fn risk_at(&self, confidence: f64) -> AnalysisResult<RiskSummary> {
        let durations = self.require_report()?.durations();
        Ok(RiskSummary::compute(&durations, confidence)?)
    }

    pub fn discretize(&mut self) -> AnalysisResult<&Discretization> {
        let discretization = Discretizer::discretize(&self.require_report()?.samples)?;
        self.model = None;
        Ok(self.discretization.insert(discretization))
    }

    pub fn discretization(&self) -> Option<&Discretization> {
        self.discretization.as_ref()
    }

    pub fn build_network(&mut self) -> AnalysisResult<Arc<BayesianModel>> {
        if self.discretization.is_none() {
            self.discretize()?;
        }
        let discretization = self
            .discretization
            .as_ref()
            .ok_or_else(|| AnalysisError::MissingArtifact("discretize samples first".into()))?;
        let dag = self.graph()?;
        let model = BayesianNetworkBuilder::new(&dag, discretization)
            .with_horizon_margin(self.config.horizon_margin)
            .with_max_cpt_columns(self.config.max_cpt_columns)
            .with_max_completion_states(self.config.max_completion_states)
            .build()?;
        let model = Arc::new(model);
        self.model = Some(Arc::clone(&model));
        Ok(model)
    }

    pub fn model(&self) -> Option<Arc<BayesianModel>> {
        self.model.clone()
    }

    /// Run an external inference query against the built network, bounded by
    /// the configured timeout.
    pub fn query(
        &self,
        engine: Arc<dyn InferenceEngine>,
        query: InferenceQuery,
    ) -> AnalysisResult<Vec<Marginal>> {
        let model = self
            .model()
            .ok_or_else(|| AnalysisError::MissingArtifact("build the network first".into()))?;
        query_with_timeout(engine, model, query, self.config.query_timeout())
    }

    pub fn summary(&self) -> AnalysisResult<AnalysisSummary> {
        let dag = self.graph()?;
        let (baseline_duration, critical_path) = if dag.is_empty() {
            (None, Vec::new())
        } else {
            let baseline = self.baseline(None, None)?;
            (
                baseline.path.total_weight(),
                baseline.path.path().map(<[String]>::to_vec).unwrap_or_default(),
            )
        };
        let risk = match &self.report {
            Some(report) if report.unreachable_count() < report.len() => Some(self.risk()?),
            _ => None,
        };
        Ok(AnalysisSummary {
            activity_count: dag.len(),
            precedence_count: dag.edge_count(),
            baseline_duration,
            critical_path,
            samples: self.report.as_ref().map(SimulationReport::len),
            unreachable_samples: self
                .report
                .as_ref()
                .map(SimulationReport::unreachable_count)
                .unwrap_or(0),
            risk,
            network_variables: self.model.as_ref().map(|m| m.len()),
            completion_states: self.model.as_ref().map(|m| m.num_completion_states()),
        })
    }
}
