use super::{PersistenceError, PersistenceResult};
use crate::calendar::{WorkCalendar, WorkCalendarConfig};
use crate::config::PlannerConfig;
use crate::critical_path::CriticalPathAnalysis;
use crate::metadata::ProjectMetadata;
use crate::project::{Project, ProjectError};
use crate::task::{DependencyEdge, Task, TaskId};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct ProjectSnapshot {
    metadata: ProjectMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    calendar: Option<WorkCalendarConfig>,
    #[serde(default)]
    calendar_is_custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config: Option<PlannerConfig>,
    tasks: Vec<Task>,
    #[serde(default)]
    dependencies: Vec<DependencyEdge>,
}

impl ProjectSnapshot {
    fn from_project(project: &Project) -> PersistenceResult<Self> {
        super::validate_tasks(project.tasks())?;
        Ok(Self {
            metadata: project.metadata().clone(),
            calendar: Some(project.calendar_config()),
            calendar_is_custom: project.calendar_is_custom(),
            config: Some(project.config().clone()),
            tasks: project.tasks().to_vec(),
            dependencies: project.edges().to_vec(),
        })
    }

    fn into_project(self) -> PersistenceResult<Project> {
        super::validate_tasks(&self.tasks)?;
        let calendar = match self.calendar {
            Some(config) => WorkCalendar::from_config(&config).map_err(ProjectError::from)?,
            None => WorkCalendar::with_year_range(
                self.metadata.project_start_date.year(),
                self.metadata.project_end_date.year(),
            ),
        };

        let mut project = Project::from_parts(self.metadata, calendar, self.calendar_is_custom);
        if let Some(config) = self.config {
            project.set_config(config);
        }
        for task in self.tasks {
            project.upsert_task(task)?;
        }
        for edge in self.dependencies {
            project.add_dependency(edge.predecessor, edge.successor)?;
        }
        Ok(project)
    }
}

pub fn save_project_to_json<P: AsRef<Path>>(project: &Project, path: P) -> PersistenceResult<()> {
    let snapshot = ProjectSnapshot::from_project(project)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_project_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Project> {
    let file = File::open(path)?;
    let snapshot: ProjectSnapshot = serde_json::from_reader(file)?;
    snapshot.into_project()
}

#[derive(Default, Serialize, Deserialize)]
struct TaskCsvRecord {
    id: TaskId,
    name: String,
    #[serde(default)]
    planned_start: String,
    #[serde(default)]
    planned_end: String,
    #[serde(default)]
    estimated_hours: String,
    #[serde(default)]
    predecessors: String,
}

impl TaskCsvRecord {
    fn into_task(self) -> PersistenceResult<(Task, Vec<TaskId>)> {
        let mut task = Task::new(self.id, self.name.trim());
        task.planned_start = parse_date(&self.planned_start)?;
        task.planned_end = parse_date(&self.planned_end)?;
        task.estimated_hours = parse_f64(&self.estimated_hours)?;
        let predecessors = split_ids(&self.predecessors)?;
        Ok((task, predecessors))
    }
}

/// Read `id,name,planned_start,planned_end,estimated_hours,predecessors`
/// rows. Predecessors are a comma-separated id list inside one field.
pub fn read_tasks_csv<R: Read>(reader: R) -> PersistenceResult<(Vec<Task>, Vec<DependencyEdge>)> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut tasks = Vec::new();
    let mut edges = Vec::new();
    for record in reader.deserialize::<TaskCsvRecord>() {
        let (task, predecessors) = record?.into_task()?;
        edges.extend(
            predecessors
                .into_iter()
                .map(|pred| DependencyEdge::new(pred, task.id)),
        );
        tasks.push(task);
    }
    super::validate_tasks(&tasks)?;
    Ok((tasks, edges))
}

/// Load a task CSV into `project`, replacing tasks with matching ids. The
/// import is all-or-nothing: on error `project` is left as it was.
pub fn import_tasks_from_csv<P: AsRef<Path>>(
    project: &mut Project,
    path: P,
) -> PersistenceResult<usize> {
    let file = File::open(path)?;
    let (tasks, edges) = read_tasks_csv(file)?;
    if tasks.is_empty() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no tasks".into(),
        ));
    }
    let count = tasks.len();
    let mut staged = project.clone();
    for task in tasks {
        staged.upsert_task(task)?;
    }
    for edge in edges {
        staged.add_dependency(edge.predecessor, edge.successor)?;
    }
    *project = staged;
    Ok(count)
}

#[derive(Serialize)]
struct NodeCsvRecord {
    task_id: TaskId,
    duration: i64,
    earliest_start: i64,
    earliest_finish: i64,
    latest_start: i64,
    latest_finish: i64,
    slack: i64,
    free_float: i64,
    is_critical: bool,
    level: usize,
    x: f64,
    y: f64,
}

pub fn write_analysis_csv<W: Write>(
    analysis: &CriticalPathAnalysis,
    writer: W,
) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for node in analysis.nodes().values() {
        writer.serialize(NodeCsvRecord {
            task_id: node.task_id,
            duration: node.duration,
            earliest_start: node.earliest_start,
            earliest_finish: node.earliest_finish,
            latest_start: node.latest_start,
            latest_finish: node.latest_finish,
            slack: node.slack,
            free_float: node.free_float,
            is_critical: node.is_critical,
            level: node.level,
            x: node.position.x,
            y: node.position.y,
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_analysis_to_csv<P: AsRef<Path>>(
    analysis: &CriticalPathAnalysis,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    write_analysis_csv(analysis, file)
}

fn parse_date(input: &str) -> PersistenceResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn parse_f64(input: &str) -> PersistenceResult<Option<f64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid number '{input}': {e}")))
}

fn split_ids(input: &str) -> PersistenceResult<Vec<TaskId>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    input
        .split(',')
        .map(|part| {
            part.trim().parse::<TaskId>().map_err(|e| {
                PersistenceError::InvalidData(format!("invalid task id '{part}': {e}"))
            })
        })
        .collect()
}
