use std::time::Duration;

/// Problems with the shape of the activity graph. These are fatal to the
/// requested operation and never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructuralError {
    #[error("activity '{code}' is already declared")]
    DuplicateNode { code: String },

    #[error("activity '{code}' is not declared")]
    UnknownNode { code: String },

    #[error("precedence {pred} -> {succ} references undeclared activity '{missing}'")]
    UnknownEdgeEndpoint {
        pred: String,
        succ: String,
        missing: String,
    },

    #[error("cycle detected: {ordered} of {total} activities ordered, unresolved: {}", .unresolved.join(", "))]
    CycleDetected {
        ordered: usize,
        total: usize,
        unresolved: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DistributionError {
    #[error("unsupported distribution kind '{kind}'")]
    UnsupportedKind { kind: String },

    #[error("sample count must be positive (got {count})")]
    NonPositiveSampleCount { count: usize },

    #[error("malformed parameters for '{subject}': {reason}")]
    MalformedParameters { subject: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidParameterError {
    #[error("confidence must lie in (0, 1] (got {confidence})")]
    ConfidenceOutOfRange { confidence: f64 },

    #[error("sample set for '{subject}' is empty")]
    EmptySamples { subject: String },

    #[error("non-finite value {value} in '{subject}'")]
    NonFiniteValue { subject: String, value: f64 },

    #[error("no weight supplied for activity '{code}'")]
    MissingWeight { code: String },

    #[error("activity '{code}' has {found} samples, expected {expected}")]
    RaggedSamples {
        code: String,
        expected: usize,
        found: usize,
    },

    #[error("sample set does not match the graph: {reason}")]
    SampleSetMismatch { reason: String },

    #[error("invalid configuration: {reason}")]
    Config { reason: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelValidationError {
    #[error(
        "CPT for {variable} declares cardinality {declared} for parent {parent}, which has {actual} states"
    )]
    CardinalityMismatch {
        variable: String,
        parent: String,
        declared: usize,
        actual: usize,
    },

    #[error("CPT for {variable} has {found} columns, expected {expected}")]
    ColumnCountMismatch {
        variable: String,
        expected: usize,
        found: usize,
    },

    #[error("{variable} declares {declared} states but has {actual}")]
    StateCountMismatch {
        variable: String,
        declared: usize,
        actual: usize,
    },

    #[error("table for {variable} is invalid: {reason}")]
    InvalidTable { variable: String, reason: String },

    #[error("CPT for activity '{activity}' needs {required}, limit is {limit}")]
    CapacityExceeded {
        activity: String,
        required: String,
        limit: usize,
    },

    #[error("no discretized duration distribution for activity '{code}'")]
    MissingDistribution { code: String },

    #[error("variable {variable} is declared before its parent {parent}")]
    NotTopological { variable: String, parent: String },

    #[error("unknown model variable '{name}'")]
    UnknownVariable { name: String },

    #[error("{variable} is a completion variable; evidence is only accepted on durations")]
    NotADurationVariable { variable: String },

    #[error("{variable} has no state for duration {value}")]
    EvidenceOutOfRange { variable: String, value: i64 },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("inference query exceeded its {0:?} deadline")]
    Timeout(Duration),

    #[error("inference query was cancelled")]
    Cancelled,

    #[error("inference worker exited without a result")]
    Disconnected,

    #[error("inference engine failed: {0}")]
    Engine(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    Distribution(#[from] DistributionError),

    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameterError),

    #[error(transparent)]
    ModelValidation(#[from] ModelValidationError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("{0}")]
    MissingArtifact(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
