//! Refresh many projects at once for dashboard-style overviews.

use crate::project::{Project, ProjectResult, RefreshSummary};
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioEntry {
    pub project_name: String,
    pub summary: Option<RefreshSummary>,
    pub error: Option<String>,
}

impl PortfolioEntry {
    fn from_result(project_name: String, result: ProjectResult<RefreshSummary>) -> Self {
        match result {
            Ok(summary) => Self {
                project_name,
                summary: Some(summary),
                error: None,
            },
            Err(err) => Self {
                project_name,
                summary: None,
                error: Some(err.to_string()),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Refresh each project on its own copy, in parallel. Entries come back in
/// input order; one failing project does not affect the others.
pub fn analyze_portfolio(projects: &[Project]) -> Vec<PortfolioEntry> {
    let entries: Vec<PortfolioEntry> = projects
        .par_iter()
        .map(|project| {
            let mut copy = project.clone();
            let result = copy.refresh();
            PortfolioEntry::from_result(project.project_name().to_string(), result)
        })
        .collect();

    let failed = entries.iter().filter(|entry| !entry.is_ok()).count();
    if failed > 0 {
        log::warn!("{failed} of {} projects failed to refresh", entries.len());
    }
    entries
}
