use crate::activity::Activity;
use crate::activity_validation;
use crate::error::AnalysisError;
use serde_json::Error as SerdeJsonError;
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub fn validate_activities(activities: &[Activity]) -> PersistenceResult<()> {
    activity_validation::validate_activity_collection(activities)?;
    Ok(())
}

pub mod file;

pub use file::{
    load_activities_from_csv, load_activities_from_json, save_activities_to_json,
    save_model_to_json,
};
