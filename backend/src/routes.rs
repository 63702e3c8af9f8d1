use std::sync::Arc;

use axum::{
    body::Body,
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{Request, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use shared::TaskData;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::error::AppError;
use crate::service::TaskService;

type SharedService = Arc<TaskService>;

pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/health", get(health))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Store calls block on SQLite; keep them off the async workers.
async fn blocking<T, F>(service: SharedService, f: F) -> Result<T, AppError>
where
    F: FnOnce(&TaskService) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&service)).await?
}

async fn list_tasks(State(service): State<SharedService>) -> Result<Json<Vec<TaskData>>, AppError> {
    let tasks = blocking(service, |s| s.find_all()).await?;
    Ok(Json(tasks))
}

async fn get_task(
    State(service): State<SharedService>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<TaskData>, AppError> {
    let Path(id) = id?;
    let task = blocking(service, move |s| s.find_by_id(id)).await?;
    Ok(Json(task))
}

async fn create_task(
    State(service): State<SharedService>,
    payload: Result<Json<TaskData>, JsonRejection>,
) -> Result<Json<TaskData>, AppError> {
    let Json(payload) = payload?;
    let task = blocking(service, move |s| s.create(&payload)).await?;
    Ok(Json(task))
}

async fn update_task(
    State(service): State<SharedService>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TaskData>, JsonRejection>,
) -> Result<Json<TaskData>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let task = blocking(service, move |s| s.update(id, &payload)).await?;
    Ok(Json(task))
}

async fn delete_task(
    State(service): State<SharedService>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    blocking(service, move |s| s.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
