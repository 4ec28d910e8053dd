use crate::activity::{Activity, DurationSpec};
use crate::error::{AnalysisError, DistributionError, StructuralError};
use std::collections::HashSet;

fn malformed(code: &str, reason: String) -> DistributionError {
    DistributionError::MalformedParameters {
        subject: code.to_string(),
        reason,
    }
}

pub fn validate_duration(code: &str, spec: &DurationSpec) -> Result<(), DistributionError> {
    match *spec {
        DurationSpec::Fixed { value } => {
            if !value.is_finite() {
                return Err(malformed(code, format!("fixed duration {value} is not finite")));
            }
        }
        DurationSpec::Triangular { min, mode, max } => {
            if !(min.is_finite() && mode.is_finite() && max.is_finite()) {
                return Err(malformed(
                    code,
                    format!("triangular parameters {min},{mode},{max} must be finite"),
                ));
            }
            if !(min <= mode && mode <= max) {
                return Err(malformed(
                    code,
                    format!("triangular requires min <= mode <= max (got {min},{mode},{max})"),
                ));
            }
        }
        DurationSpec::Normal { mean, std } => {
            if !(mean.is_finite() && std.is_finite()) {
                return Err(malformed(
                    code,
                    format!("normal parameters {mean},{std} must be finite"),
                ));
            }
            if std < 0.0 {
                return Err(malformed(
                    code,
                    format!("normal standard deviation must be non-negative (got {std})"),
                ));
            }
        }
    }
    Ok(())
}

pub fn validate_activity(activity: &Activity) -> Result<(), AnalysisError> {
    if activity.code.trim().is_empty() {
        return Err(malformed(&activity.label, "activity code must not be empty".into()).into());
    }
    if activity.predecessors.iter().any(|p| *p == activity.code) {
        return Err(StructuralError::CycleDetected {
            ordered: 0,
            total: 1,
            unresolved: vec![activity.code.clone()],
        }
        .into());
    }
    validate_duration(&activity.code, &activity.duration)?;
    Ok(())
}

pub fn validate_activity_collection(activities: &[Activity]) -> Result<(), AnalysisError> {
    let mut seen = HashSet::with_capacity(activities.len());
    for activity in activities {
        if !seen.insert(activity.code.as_str()) {
            return Err(StructuralError::DuplicateNode {
                code: activity.code.clone(),
            }
            .into());
        }
        validate_activity(activity)?;
    }
    Ok(())
}
