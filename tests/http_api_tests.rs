#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use project_planner::{CriticalPathAnalysis, Project, RefreshSummary, Route, Task, http_api};
use serde_json::{Value, json};
use tower::util::ServiceExt;

fn new_router() -> axum::Router {
    let state = http_api::AppState::new(Project::new());
    http_api::router(state)
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn task_lifecycle_via_http_api() {
    let app = new_router();
    let task = Task::new(1, "HTTP Demo").with_estimated_hours(16.0);

    let (status, _) = send(&app, "POST", "/tasks", Some(serde_json::to_value(&task).unwrap())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, "POST", "/tasks", Some(serde_json::to_value(&task).unwrap())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, bytes) = send(&app, "GET", "/tasks/1", None).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Task = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(fetched, task);

    let renamed = Task::new(1, "Renamed");
    let (status, _) = send(&app, "PUT", "/tasks/1", Some(serde_json::to_value(&renamed).unwrap())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "PUT", "/tasks/2", Some(serde_json::to_value(&renamed).unwrap())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", "/tasks/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, bytes) = send(&app, "GET", "/tasks/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error["error"], "not_found");
}

#[tokio::test]
async fn refresh_and_critical_path_via_http_api() {
    let app = new_router();
    for (id, hours) in [(1, 24.0), (2, 16.0), (3, 8.0)] {
        let task = Task::new(id, format!("T{id}")).with_estimated_hours(hours);
        let (status, _) = send(&app, "POST", "/tasks", Some(serde_json::to_value(&task).unwrap())).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    for (pred, succ) in [(1, 2), (1, 3)] {
        let (status, _) = send(
            &app,
            "POST",
            "/dependencies",
            Some(json!({ "predecessor": pred, "successor": succ })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, bytes) = send(&app, "POST", "/refresh", None).await;
    assert_eq!(status, StatusCode::OK);
    let summary: RefreshSummary = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(summary.project_duration_days, 5);
    assert_eq!(summary.critical_path, vec![1, 2]);

    let (status, bytes) = send(&app, "GET", "/critical-path", None).await;
    assert_eq!(status, StatusCode::OK);
    let analysis: CriticalPathAnalysis = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(analysis.node(3).unwrap().slack, 1);

    let (status, bytes) = send(&app, "GET", "/levels", None).await;
    assert_eq!(status, StatusCode::OK);
    let levels: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(levels, json!({ "1": 0, "2": 1, "3": 1 }));

    let (status, _) = send(&app, "DELETE", "/dependencies/1/3", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", "/dependencies/1/3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dependency_errors_via_http_api() {
    let app = new_router();
    let (status, _) = send(
        &app,
        "POST",
        "/dependencies",
        Some(json!({ "predecessor": 1, "successor": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for id in [1, 2] {
        send(&app, "POST", "/tasks", Some(json!({ "id": id, "name": "T" }))).await;
    }
    send(&app, "POST", "/dependencies", Some(json!({ "predecessor": 1, "successor": 2 }))).await;
    let (status, bytes) = send(
        &app,
        "POST",
        "/dependencies",
        Some(json!({ "predecessor": 2, "successor": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(error["message"].as_str().unwrap().contains("cyclic"));
}

#[tokio::test]
async fn metadata_validation_via_http_api() {
    let app = new_router();
    let (status, _) = send(
        &app,
        "PUT",
        "/metadata",
        Some(json!({
            "project_name": "Backwards",
            "project_start_date": "2025-06-01",
            "project_end_date": "2025-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, bytes) = send(&app, "GET", "/metadata", None).await;
    assert_eq!(status, StatusCode::OK);
    let metadata: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(metadata["project_name"], "New Project");
}

#[tokio::test]
async fn route_planning_via_http_api() {
    let app = new_router();
    let (status, bytes) = send(
        &app,
        "POST",
        "/route",
        Some(json!({
            "depot": { "task_id": 0, "x": 0.0, "y": 0.0 },
            "stops": [
                { "task_id": 1, "x": 10.0, "y": 0.0 },
                { "task_id": 2, "x": 1.0, "y": 1.0 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let route: Route = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(route.visiting_order(), vec![0, 2, 1, 0]);
    let indices: Vec<i32> = route.stops.iter().map(|stop| stop.order_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 0]);
}

#[tokio::test]
async fn health_check() {
    let (status, bytes) = send(&new_router(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn overlong_task_yields_bad_request_not_a_crash() {
    let app = new_router();
    let task = Task::new(1, "Forever").with_estimated_hours(1e300);
    let (status, _) = send(&app, "POST", "/tasks", Some(serde_json::to_value(&task).unwrap())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, bytes) = send(&app, "GET", "/critical-path", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error["error"], "invalid_request");

    let (status, _) = send(&app, "POST", "/refresh", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
