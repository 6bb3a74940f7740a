use crate::calendar::{CalendarError, WorkCalendar, WorkCalendarConfig};
use crate::config::PlannerConfig;
use crate::critical_path::{self, CriticalPathAnalysis, DatedTaskNode};
use crate::error::ScheduleError;
use crate::layout;
use crate::metadata::ProjectMetadata;
use crate::task::{DependencyEdge, Task, TaskId};
use crate::task_validation;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectError {
    #[error("project start date {start} must be on or before project end date {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },
    #[error("project end date {project_end} precedes schedule finish {required_finish}")]
    EndPrecedesScheduleFinish {
        project_end: NaiveDate,
        required_finish: NaiveDate,
    },
    #[error("project end date {project_end} cannot fit a {duration_days}-day schedule")]
    ScheduleExceedsHorizon {
        project_end: NaiveDate,
        duration_days: i64,
    },
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub task_count: usize,
    pub critical_count: usize,
    pub critical_path: Vec<TaskId>,
    pub project_duration_days: i64,
    pub finish_date: Option<NaiveDate>,
}

impl RefreshSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("tasks={}", self.task_count));
        parts.push(format!("critical={}", self.critical_count));
        parts.push(format!("days={}", self.project_duration_days));
        if let Some(date) = self.finish_date {
            parts.push(format!("finish={}", date));
        }
        if !self.critical_path.is_empty() {
            let chain = self
                .critical_path
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("->");
            parts.push(format!("crit_path={}", chain));
        }
        parts.join(", ")
    }
}

/// In-memory project: tasks, dependency edges, metadata and calendar.
///
/// Any structural change drops the last analysis; call [`Project::refresh`]
/// to recompute.
#[derive(Debug, Clone)]
pub struct Project {
    metadata: ProjectMetadata,
    tasks: Vec<Task>,
    edges: Vec<DependencyEdge>,
    calendar: WorkCalendar,
    calendar_is_custom: bool,
    config: PlannerConfig,
    analysis: Option<CriticalPathAnalysis>,
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Project {
    pub(crate) fn from_parts(
        metadata: ProjectMetadata,
        calendar: WorkCalendar,
        calendar_is_custom: bool,
    ) -> Self {
        Self {
            metadata,
            tasks: Vec::new(),
            edges: Vec::new(),
            calendar,
            calendar_is_custom,
            config: PlannerConfig::default(),
            analysis: None,
        }
    }

    pub fn new() -> Self {
        Self::new_with_metadata(ProjectMetadata::default())
    }

    pub fn new_with_metadata(metadata: ProjectMetadata) -> Self {
        let calendar = Self::calendar_for_metadata(&metadata);
        Self::from_parts(metadata, calendar, false)
    }

    pub fn new_with_metadata_and_calendar(
        metadata: ProjectMetadata,
        calendar: WorkCalendar,
    ) -> Self {
        Self::from_parts(metadata, calendar, true)
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self.analysis = None;
        self
    }

    fn calendar_for_metadata(metadata: &ProjectMetadata) -> WorkCalendar {
        WorkCalendar::with_year_range(
            metadata.project_start_date.year(),
            metadata.project_end_date.year(),
        )
    }

    fn validate_metadata_dates(metadata: &ProjectMetadata) -> ProjectResult<()> {
        if metadata.project_start_date > metadata.project_end_date {
            return Err(ProjectError::StartAfterEnd {
                start: metadata.project_start_date,
                end: metadata.project_end_date,
            });
        }
        Ok(())
    }

    /// Finish date of `analysis` on `calendar`, which must not fall after the
    /// project end. A schedule longer than the whole start..=end span cannot
    /// fit on any calendar, so it is rejected before walking working days.
    fn finish_within_horizon(
        metadata: &ProjectMetadata,
        calendar: &WorkCalendar,
        analysis: &CriticalPathAnalysis,
    ) -> ProjectResult<Option<NaiveDate>> {
        let span_days = (metadata.project_end_date - metadata.project_start_date).num_days() + 1;
        if analysis.project_duration() > span_days {
            return Err(ProjectError::ScheduleExceedsHorizon {
                project_end: metadata.project_end_date,
                duration_days: analysis.project_duration(),
            });
        }
        let finish_date = analysis.finish_date(calendar, metadata.project_start_date)?;
        if let Some(required_finish) = finish_date {
            if required_finish > metadata.project_end_date {
                return Err(ProjectError::EndPrecedesScheduleFinish {
                    project_end: metadata.project_end_date,
                    required_finish,
                });
            }
        }
        Ok(finish_date)
    }

    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    pub fn project_name(&self) -> &str {
        &self.metadata.project_name
    }

    pub fn project_start_date(&self) -> NaiveDate {
        self.metadata.project_start_date
    }

    pub fn project_end_date(&self) -> NaiveDate {
        self.metadata.project_end_date
    }

    /// Replaces the metadata after checking the date order and that the
    /// current schedule still fits before the new end date. A default
    /// calendar is regenerated for the new year span.
    pub fn set_metadata(&mut self, metadata: ProjectMetadata) -> ProjectResult<()> {
        Self::validate_metadata_dates(&metadata)?;
        let calendar = if self.calendar_is_custom {
            self.calendar.clone()
        } else {
            Self::calendar_for_metadata(&metadata)
        };
        if !self.tasks.is_empty() {
            let analysis = self.analyze()?;
            Self::finish_within_horizon(&metadata, &calendar, &analysis)?;
        }
        self.metadata = metadata;
        self.calendar = calendar;
        self.analysis = None;
        Ok(())
    }

    pub fn set_project_name(&mut self, name: impl Into<String>) {
        self.metadata.project_name = name.into();
    }

    pub fn set_project_description(&mut self, description: impl Into<String>) {
        self.metadata.project_description = description.into();
    }

    pub fn set_project_dates(&mut self, start: NaiveDate, end: NaiveDate) -> ProjectResult<()> {
        let mut metadata = self.metadata.clone();
        metadata.project_start_date = start;
        metadata.project_end_date = end;
        self.set_metadata(metadata)
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PlannerConfig) {
        self.config = config;
        self.analysis = None;
    }

    pub fn calendar(&self) -> &WorkCalendar {
        &self.calendar
    }

    pub fn calendar_is_custom(&self) -> bool {
        self.calendar_is_custom
    }

    pub fn calendar_config(&self) -> WorkCalendarConfig {
        self.calendar.to_config()
    }

    pub fn set_calendar(&mut self, calendar: WorkCalendar) {
        self.calendar = calendar;
        self.calendar_is_custom = true;
        self.analysis = None;
    }

    pub fn set_calendar_from_config(&mut self, config: &WorkCalendarConfig) -> ProjectResult<()> {
        let calendar = WorkCalendar::from_config(config)?;
        self.set_calendar(calendar);
        Ok(())
    }

    pub fn reset_calendar_to_default(&mut self) {
        self.calendar = Self::calendar_for_metadata(&self.metadata);
        self.calendar_is_custom = false;
        self.analysis = None;
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    pub fn find_task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn next_task_id(&self) -> TaskId {
        self.tasks.iter().map(|task| task.id).max().map_or(1, |max| max + 1)
    }

    /// Insert a new task or replace the one with the same id.
    pub fn upsert_task(&mut self, task: Task) -> ProjectResult<()> {
        task_validation::validate_task(&task)
            .and_then(|_| task_validation::validate_resources(&task))
            .map_err(ScheduleError::from)?;
        match self.tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
        self.analysis = None;
        Ok(())
    }

    /// Remove a task and every dependency touching it.
    pub fn delete_task(&mut self, task_id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != task_id);
        if self.tasks.len() == before {
            return false;
        }
        self.edges
            .retain(|edge| edge.predecessor != task_id && edge.successor != task_id);
        self.analysis = None;
        true
    }

    /// Add `predecessor -> successor`. Both tasks must exist and the edge must
    /// not close a cycle; adding an existing edge is a no-op.
    pub fn add_dependency(&mut self, predecessor: TaskId, successor: TaskId) -> ProjectResult<()> {
        let edge = DependencyEdge::new(predecessor, successor);
        task_validation::validate_edge(&edge).map_err(|_| ScheduleError::SelfDependency {
            task_id: predecessor,
        })?;
        for task_id in [predecessor, successor] {
            if self.find_task(task_id).is_none() {
                return Err(ScheduleError::TaskNotFound { task_id }.into());
            }
        }
        if self.edges.contains(&edge) {
            return Ok(());
        }

        self.edges.push(edge);
        if let Err(err) = self.analyze() {
            self.edges.pop();
            return Err(err);
        }
        self.analysis = None;
        Ok(())
    }

    pub fn remove_dependency(&mut self, predecessor: TaskId, successor: TaskId) -> bool {
        let before = self.edges.len();
        self.edges
            .retain(|edge| !(edge.predecessor == predecessor && edge.successor == successor));
        let removed = self.edges.len() != before;
        if removed {
            self.analysis = None;
        }
        removed
    }

    pub fn predecessors_of(&self, task_id: TaskId) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self
            .edges
            .iter()
            .filter(|edge| edge.successor == task_id)
            .map(|edge| edge.predecessor)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn successors_of(&self, task_id: TaskId) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self
            .edges
            .iter()
            .filter(|edge| edge.predecessor == task_id)
            .map(|edge| edge.successor)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Run the critical path engine over the current tasks and edges without
    /// touching stored state.
    pub fn analyze(&self) -> ProjectResult<CriticalPathAnalysis> {
        Ok(critical_path::compute_critical_path_with(
            &self.tasks,
            &self.edges,
            &self.config,
        )?)
    }

    pub fn levels(&self) -> ProjectResult<BTreeMap<TaskId, usize>> {
        Ok(layout::compute_levels_with(
            &self.tasks,
            &self.edges,
            &self.config,
        )?)
    }

    pub fn refresh(&mut self) -> ProjectResult<RefreshSummary> {
        Self::validate_metadata_dates(&self.metadata)?;
        let analysis = self.analyze()?;
        let finish_date = Self::finish_within_horizon(&self.metadata, &self.calendar, &analysis)?;

        let summary = RefreshSummary {
            task_count: analysis.len(),
            critical_count: analysis.critical_path().len(),
            critical_path: analysis.critical_path().to_vec(),
            project_duration_days: analysis.project_duration(),
            finish_date,
        };
        log::info!("project '{}' refreshed: {}", self.metadata.project_name, summary.to_cli_summary());
        self.analysis = Some(analysis);
        Ok(summary)
    }

    /// Result of the last successful [`Project::refresh`], if still current.
    pub fn analysis(&self) -> Option<&CriticalPathAnalysis> {
        self.analysis.as_ref()
    }

    /// The last analysis projected onto the calendar; `Ok(None)` until a
    /// refresh has succeeded.
    pub fn dated_nodes(&self) -> ProjectResult<Option<Vec<DatedTaskNode>>> {
        match &self.analysis {
            Some(analysis) => Ok(Some(
                analysis.dated(&self.calendar, self.metadata.project_start_date)?,
            )),
            None => Ok(None),
        }
    }
}
