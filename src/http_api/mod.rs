use std::{collections::BTreeMap, net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    CriticalPathAnalysis, DependencyEdge, Project, ProjectError, ProjectMetadata, RefreshSummary,
    Route, ScheduleError, Task, TaskId, TaskLocation, route,
};

pub const HTTP_ADDR_ENV: &str = "PROJECT_PLANNER_HTTP_ADDR";

#[derive(Clone)]
pub struct AppState {
    project: Arc<RwLock<Project>>,
}

impl AppState {
    pub fn new(project: Project) -> Self {
        Self {
            project: Arc::new(RwLock::new(project)),
        }
    }

    pub fn with_shared(project: Arc<RwLock<Project>>) -> Self {
        Self { project }
    }

    fn project(&self) -> Arc<RwLock<Project>> {
        self.project.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<ProjectError> for ApiError {
    fn from(value: ProjectError) -> Self {
        match value {
            ProjectError::Schedule(ScheduleError::TaskNotFound { .. }) => {
                ApiError::NotFound(value.to_string())
            }
            other => ApiError::Invalid(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct RoutePayload {
    depot: TaskLocation,
    stops: Vec<TaskLocation>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metadata", get(get_metadata).put(update_metadata))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/dependencies", post(add_dependency))
        .route("/dependencies/:pred/:succ", delete(remove_dependency))
        .route("/refresh", post(refresh_project))
        .route("/critical-path", get(critical_path))
        .route("/levels", get(levels))
        .route("/route", post(plan_route))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, project: Project) -> std::io::Result<()> {
    let state = AppState::new(project);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("listening on http://{addr}");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_metadata(State(state): State<AppState>) -> Json<ProjectMetadata> {
    let project = state.project();
    let metadata = project.read().metadata().clone();
    Json(metadata)
}

async fn update_metadata(
    State(state): State<AppState>,
    Json(metadata): Json<ProjectMetadata>,
) -> Result<Json<ProjectMetadata>, ApiError> {
    let project = state.project();
    let mut guard = project.write();
    guard.set_metadata(metadata)?;
    Ok(Json(guard.metadata().clone()))
}

async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    let project = state.project();
    let tasks = project.read().tasks().to_vec();
    Json(tasks)
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
) -> Result<Json<Task>, ApiError> {
    let project = state.project();
    let guard = project.read();
    guard
        .find_task(task_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("task {task_id} not found")))
}

async fn create_task(
    State(state): State<AppState>,
    Json(task): Json<Task>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let project = state.project();
    let mut guard = project.write();
    if guard.find_task(task.id).is_some() {
        return Err(ApiError::Conflict(format!(
            "task {} already exists",
            task.id
        )));
    }
    guard.upsert_task(task.clone())?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
    Json(task): Json<Task>,
) -> Result<Json<Task>, ApiError> {
    if task.id != task_id {
        return Err(ApiError::invalid(
            "task id in payload does not match path parameter",
        ));
    }
    let project = state.project();
    let mut guard = project.write();
    if guard.find_task(task_id).is_none() {
        return Err(ApiError::not_found(format!("task {task_id} not found")));
    }
    guard.upsert_task(task.clone())?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
) -> Result<StatusCode, ApiError> {
    let project = state.project();
    let removed = project.write().delete_task(task_id);
    if !removed {
        return Err(ApiError::not_found(format!("task {task_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn add_dependency(
    State(state): State<AppState>,
    Json(edge): Json<DependencyEdge>,
) -> Result<(StatusCode, Json<DependencyEdge>), ApiError> {
    let project = state.project();
    project
        .write()
        .add_dependency(edge.predecessor, edge.successor)?;
    Ok((StatusCode::CREATED, Json(edge)))
}

async fn remove_dependency(
    State(state): State<AppState>,
    Path((pred, succ)): Path<(TaskId, TaskId)>,
) -> Result<StatusCode, ApiError> {
    let project = state.project();
    if !project.write().remove_dependency(pred, succ) {
        return Err(ApiError::not_found(format!(
            "dependency {pred}->{succ} not found"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn refresh_project(State(state): State<AppState>) -> Result<Json<RefreshSummary>, ApiError> {
    let project = state.project();
    let summary = project.write().refresh()?;
    Ok(Json(summary))
}

async fn critical_path(
    State(state): State<AppState>,
) -> Result<Json<CriticalPathAnalysis>, ApiError> {
    let project = state.project();
    let analysis = project.read().analyze()?;
    Ok(Json(analysis))
}

async fn levels(State(state): State<AppState>) -> Result<Json<BTreeMap<TaskId, usize>>, ApiError> {
    let project = state.project();
    let levels = project.read().levels()?;
    Ok(Json(levels))
}

async fn plan_route(
    State(state): State<AppState>,
    Json(payload): Json<RoutePayload>,
) -> Json<Route> {
    let metric = state.project().read().config().route.metric;
    let RoutePayload {
        mut depot,
        mut stops,
    } = payload;
    Json(route::plan_route(&mut stops, &mut depot, metric))
}
