pub mod activity;
pub mod activity_validation;
pub mod analysis;
pub mod bayes;
pub mod calculations;
pub mod config;
pub mod discretize;
pub mod error;
pub mod graph;
pub mod persistence;
pub mod risk;
pub mod sampling;
pub mod simulation;

pub use activity::{Activity, DurationSpec};
pub use analysis::{Analysis, AnalysisSummary, Baseline};
pub use bayes::{
    BayesianModel, BayesianNetworkBuilder, Cpt, CptTable, Evidence, InferenceEngine,
    InferenceQuery, Marginal, ParentCombinations, Variable, VariableId, VariableKind,
    query_with_timeout,
};
pub use calculations::critical_path::{CriticalPathSolver, PathResult, WeightAssignment};
pub use calculations::{ActivityTimes, schedule_times};
pub use config::AnalysisConfig;
pub use discretize::{DiscreteDistribution, Discretization, Discretizer};
pub use error::{
    AnalysisError, AnalysisResult, DistributionError, InferenceError, InvalidParameterError,
    ModelValidationError, StructuralError,
};
pub use graph::ProjectDag;
pub use persistence::{
    PersistenceError, PersistenceResult, load_activities_from_csv, load_activities_from_json,
    save_activities_to_json, save_model_to_json,
};
pub use risk::{RiskSummary, conditional_value_at_risk, value_at_risk};
pub use sampling::{DistributionSampler, SampleSet, Sampler, SamplingMethod};
pub use simulation::{AggregateRow, MonteCarloSimulator, PathFrequency, SimulationReport};
