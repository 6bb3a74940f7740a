pub mod calculations;
pub mod calendar;
pub mod config;
pub mod critical_path;
pub mod error;
pub mod graph;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod layout;
pub mod metadata;
pub mod persistence;
pub mod portfolio;
pub mod project;
pub mod route;
pub mod task;
pub mod task_validation;

pub use calendar::{CalendarError, Holiday, WorkCalendar, WorkCalendarConfig};
pub use config::{ConfigError, DurationPolicy, EdgePolicy, MetricKind, PlannerConfig};
pub use critical_path::{
    CriticalPathAnalysis, DatedTaskNode, TaskNode, compute_critical_path,
    compute_critical_path_with,
};
pub use error::{ScheduleError, ScheduleResult};
pub use layout::{Position, compute_levels, compute_levels_with};
pub use metadata::ProjectMetadata;
pub use persistence::{
    PersistenceError, export_analysis_to_csv, import_tasks_from_csv, load_project_from_json,
    save_project_to_json,
};
pub use portfolio::{PortfolioEntry, analyze_portfolio};
pub use project::{Project, ProjectError, RefreshSummary};
pub use route::{
    DistanceMetric, Euclidean, Haversine, MockGeocoder, Route, TaskLocation, optimize_route,
    optimize_route_with, plan_route,
};
pub use task::{DependencyEdge, Task, TaskId};
pub use task_validation::TaskValidationError;
