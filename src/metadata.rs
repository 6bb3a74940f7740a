use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub project_name: String,
    #[serde(default)]
    pub project_description: String,
    pub project_start_date: NaiveDate,
    pub project_end_date: NaiveDate,
}

impl ProjectMetadata {
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            project_name: name.into(),
            project_description: String::new(),
            project_start_date: start,
            project_end_date: end,
        }
    }
}

impl Default for ProjectMetadata {
    fn default() -> Self {
        Self {
            project_name: "New Project".to_string(),
            project_description: "No description".to_string(),
            project_start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            project_end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default(),
        }
    }
}
