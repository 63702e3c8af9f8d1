use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::task::JoinError;

use crate::store::StoreError;

const VALIDATION_DETAIL: &str = "Ошибка валидации";
const INTERNAL_DETAIL: &str = "Внутренняя ошибка сервера";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Не найден задача с id = {0}")]
    NotFound(i64),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Request could not be read (bad JSON body, non-numeric path id).
    #[error("{0}")]
    Malformed(String),

    #[error("store worker failed: {0}")]
    Worker(#[from] JoinError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::NotFound(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Malformed(_) | Self::Worker(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// RFC 9457 problem document.
#[derive(Debug, Serialize)]
struct Problem {
    #[serde(rename = "type")]
    kind: &'static str,
    title: &'static str,
    status: u16,
    detail: &'static str,
    #[serde(flatten)]
    properties: Map<String, Value>,
}

impl Problem {
    fn new(status: StatusCode, detail: &'static str) -> Self {
        Self {
            kind: "about:blank",
            title: status.canonical_reason().unwrap_or("Error"),
            status: status.as_u16(),
            detail,
            properties: Map::new(),
        }
    }

    fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/problem+json"),
            )],
            Json(self),
        )
            .into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            Self::Validation(errors) => Problem::new(status, VALIDATION_DETAIL)
                .with("errors", errors)
                .into_response(),
            Self::NotFound(_) => (status, Json(self.to_string())).into_response(),
            other => {
                tracing::error!(error = %other, "request failed");
                Problem::new(status, INTERNAL_DETAIL)
                    .with("message", other.to_string())
                    .into_response()
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn content_type(response: &Response) -> &str {
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[test]
    fn not_found_message() {
        assert_eq!(AppError::NotFound(5).to_string(), "Не найден задача с id = 5");
    }

    #[test]
    fn status_codes() {
        assert_eq!(AppError::NotFound(1).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Validation(vec![]).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Store(StoreError::Database("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Malformed("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn panicked_worker_is_internal_error() {
        let join_error = tokio::task::spawn_blocking(|| panic!("boom")).await.unwrap_err();
        let response = AppError::from(join_error).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["detail"], INTERNAL_DETAIL);
    }

    #[tokio::test]
    async fn validation_renders_problem_with_errors() {
        let response = AppError::Validation(vec!["a".into(), "b".into()]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(content_type(&response), "application/problem+json");

        let body = body_json(response).await;
        assert_eq!(body["status"], 400);
        assert_eq!(body["title"], "Bad Request");
        assert_eq!(body["detail"], VALIDATION_DETAIL);
        assert_eq!(body["errors"], serde_json::json!(["a", "b"]));
    }

    #[tokio::test]
    async fn not_found_renders_message_string() {
        let response = AppError::NotFound(10).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(content_type(&response), "application/json");
        assert_eq!(body_json(response).await, "Не найден задача с id = 10");
    }

    #[tokio::test]
    async fn store_failure_renders_generic_problem() {
        let response = AppError::Store(StoreError::Database("disk full".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(content_type(&response), "application/problem+json");

        let body = body_json(response).await;
        assert_eq!(body["detail"], INTERNAL_DETAIL);
        assert_eq!(body["message"], "database error: disk full");
    }
}
