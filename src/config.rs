//! Engine configuration.
//!
//! Everything has a sensible default; a JSON file can override any subset of
//! fields. The file path is taken from `PROJECT_PLANNER_CONFIG` when loading
//! from the environment.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "PROJECT_PLANNER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] io::Error),
    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How task durations are derived when dates are missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationPolicy {
    pub default_duration_days: i64,
    pub hours_per_day: f64,
    pub min_duration_days: i64,
    /// Upper bound on any single task; longer derived durations are rejected.
    pub max_duration_days: i64,
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self {
            default_duration_days: 5,
            hours_per_day: 8.0,
            min_duration_days: 1,
            max_duration_days: 36_500,
        }
    }
}

/// What to do with an edge that names a task not in the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    #[default]
    Ignore,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub column_spacing: f64,
    pub row_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_spacing: 220.0,
            row_spacing: 90.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    #[default]
    Euclidean,
    Haversine,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub metric: MetricKind,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub duration: DurationPolicy,
    pub edges: EdgePolicy,
    pub layout: LayoutConfig,
    pub route: RouteConfig,
}

impl PlannerConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: PlannerConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by `PROJECT_PLANNER_CONFIG`, or fall back to
    /// defaults when the variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                log::info!("loading planner config from {path}");
                Self::from_json_file(path.trim())
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let duration = &self.duration;
        if duration.min_duration_days < 1 {
            return Err(ConfigError::Invalid(format!(
                "min_duration_days must be at least 1 (got {})",
                duration.min_duration_days
            )));
        }
        if duration.default_duration_days < duration.min_duration_days {
            return Err(ConfigError::Invalid(format!(
                "default_duration_days {} is below min_duration_days {}",
                duration.default_duration_days, duration.min_duration_days
            )));
        }
        if duration.max_duration_days < duration.default_duration_days {
            return Err(ConfigError::Invalid(format!(
                "max_duration_days {} is below default_duration_days {}",
                duration.max_duration_days, duration.default_duration_days
            )));
        }
        if !duration.hours_per_day.is_finite() || duration.hours_per_day <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "hours_per_day must be positive (got {})",
                duration.hours_per_day
            )));
        }
        let layout = &self.layout;
        if !layout.column_spacing.is_finite() || !layout.row_spacing.is_finite() {
            return Err(ConfigError::Invalid("layout spacing must be finite".into()));
        }
        Ok(())
    }
}
