use super::{PersistenceError, PersistenceResult};
use crate::activity::{Activity, DurationSpec};
use crate::bayes::BayesianModel;
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Marker used by spreadsheet exports for "no predecessors".
const NO_PREDECESSORS: &str = "-";

pub fn save_activities_to_json<P: AsRef<Path>>(
    activities: &[Activity],
    path: P,
) -> PersistenceResult<()> {
    super::validate_activities(activities)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, activities)?;
    Ok(())
}

pub fn load_activities_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Activity>> {
    let file = File::open(path)?;
    let activities: Vec<Activity> = serde_json::from_reader(file)?;
    super::validate_activities(&activities)?;
    Ok(activities)
}

/// Hand a built network to an external inference engine.
pub fn save_model_to_json<P: AsRef<Path>>(model: &BayesianModel, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, model)?;
    Ok(())
}

#[derive(Default, Serialize, Deserialize)]
struct ActivityCsvRecord {
    code: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    predecessors: String,
    distribution: String,
    parameters: String,
}

impl ActivityCsvRecord {
    fn into_activity(self) -> PersistenceResult<Activity> {
        let duration = DurationSpec::from_kind(&self.distribution, &self.parameters)
            .map_err(AnalysisError::from)?;
        let code = self.code.trim().to_string();
        if code.is_empty() {
            return Err(PersistenceError::InvalidData(
                "activity row without a code".into(),
            ));
        }
        let label = if self.label.trim().is_empty() {
            code.clone()
        } else {
            self.label.trim().to_string()
        };
        Ok(Activity::new(code, label, duration).with_predecessors(split_codes(&self.predecessors)))
    }
}

/// Columns: `code,label,predecessors,distribution,parameters`. Multi-value
/// cells (predecessors, parameters) are comma separated inside quotes.
pub fn load_activities_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Activity>> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    let mut activities = Vec::new();
    for record in reader.deserialize::<ActivityCsvRecord>() {
        activities.push(record?.into_activity()?);
    }

    if activities.is_empty() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no activities".into(),
        ));
    }

    super::validate_activities(&activities)?;
    Ok(activities)
}

fn split_codes(input: &str) -> Vec<String> {
    let input = input.trim();
    if input.is_empty() || input == NO_PREDECESSORS {
        return Vec::new();
    }
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
