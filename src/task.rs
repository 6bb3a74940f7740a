use crate::config::DurationPolicy;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type TaskId = i64;

/// A unit of project work as supplied by the task store.
///
/// Only the identifier and the fields needed to derive a duration take part in
/// scheduling; the rest travels along for display and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_end: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assigned_resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Ordered pair: `successor` cannot start before `predecessor` finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub predecessor: TaskId,
    pub successor: TaskId,
}

impl DependencyEdge {
    pub fn new(predecessor: TaskId, successor: TaskId) -> Self {
        Self {
            predecessor,
            successor,
        }
    }
}

impl From<(TaskId, TaskId)> for DependencyEdge {
    fn from((predecessor, successor): (TaskId, TaskId)) -> Self {
        Self::new(predecessor, successor)
    }
}

impl Task {
    pub fn new(id: TaskId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            planned_start: None,
            planned_end: None,
            estimated_hours: None,
            assigned_resources: Vec::new(),
            notes: None,
        }
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.planned_start = Some(start);
        self.planned_end = Some(end);
        self
    }

    pub fn with_estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    /// Duration in whole days, derived in priority order: inclusive planned
    /// date span, then estimated hours split into working days, then the
    /// policy default. The result never drops below `min_duration_days`.
    pub fn duration_days(&self, policy: &DurationPolicy) -> i64 {
        let raw = match (self.planned_start, self.planned_end) {
            (Some(start), Some(end)) => (end - start).num_days() + 1,
            _ => match self.estimated_hours {
                Some(hours) if hours.is_finite() && policy.hours_per_day > 0.0 => {
                    (hours / policy.hours_per_day).ceil() as i64
                }
                _ => policy.default_duration_days,
            },
        };
        if raw < policy.min_duration_days {
            log::warn!(
                "task {} derived duration {} clamped to {}",
                self.id,
                raw,
                policy.min_duration_days
            );
            policy.min_duration_days
        } else {
            raw
        }
    }
}
