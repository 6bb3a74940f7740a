use crate::task::{DependencyEdge, Task};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskValidationError {
    message: String,
}

impl TaskValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TaskValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TaskValidationError {}

pub fn validate_task(task: &Task) -> Result<(), TaskValidationError> {
    if let (Some(start), Some(end)) = (task.planned_start, task.planned_end) {
        if end < start {
            return Err(TaskValidationError::new(format!(
                "task {} planned end {} precedes planned start {}",
                task.id, end, start
            )));
        }
    }

    if let Some(hours) = task.estimated_hours {
        if !hours.is_finite() || hours < 0.0 {
            return Err(TaskValidationError::new(format!(
                "task {} has invalid estimated_hours {}",
                task.id, hours
            )));
        }
    }

    Ok(())
}

/// Data-entry rule for the project store; scheduling ignores resources.
pub fn validate_resources(task: &Task) -> Result<(), TaskValidationError> {
    for (idx, resource) in task.assigned_resources.iter().enumerate() {
        if resource.trim().is_empty() {
            return Err(TaskValidationError::new(format!(
                "task {} resource #{} requires a non-empty name",
                task.id, idx
            )));
        }
    }
    Ok(())
}

pub fn validate_task_collection(tasks: &[Task]) -> Result<(), TaskValidationError> {
    let mut seen_ids = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !seen_ids.insert(task.id) {
            return Err(TaskValidationError::new(format!(
                "duplicate task id {}",
                task.id
            )));
        }
        validate_task(task)?;
    }
    Ok(())
}

pub fn validate_edge(edge: &DependencyEdge) -> Result<(), TaskValidationError> {
    if edge.predecessor == edge.successor {
        return Err(TaskValidationError::new(format!(
            "task {} cannot depend on itself",
            edge.predecessor
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn reversed_dates_are_rejected() {
        let task = Task::new(7, "Backwards").with_dates(
            NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
        );
        let err = validate_task(&task).unwrap_err();
        assert!(err.message().contains("precedes planned start"));
    }

    #[test]
    fn negative_hours_are_rejected() {
        let task = Task::new(1, "Odd").with_estimated_hours(-4.0);
        assert!(validate_task(&task).is_err());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let tasks = vec![Task::new(1, "A"), Task::new(1, "B")];
        let err = validate_task_collection(&tasks).unwrap_err();
        assert_eq!(err.to_string(), "duplicate task id 1");
    }
}
