mod layout;
mod routes;
mod weather;

pub use routes::create_router;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use planner_core::{LayoutGenerator, PlannerError, UpstreamError, WeatherProxy};
use serde::Serialize;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<WeatherProxy>,
    pub layout: Arc<LayoutGenerator>,
    pub start_time: std::time::Instant,
}

/// Error body: `{"success": false, "error": "..."}`
#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

fn error_response(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(msg))).into_response()
}

fn bad_request(msg: impl Into<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, msg)
}

/// Custom error type for HTTP handlers.
///
/// The outermost context is the message shown for server-side failures;
/// the wrapped [`PlannerError`], if any, decides the status.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.0.downcast_ref::<PlannerError>() {
            Some(e) if e.is_client_error() => bad_request(e.to_string()),
            Some(PlannerError::Upstream(UpstreamError::Status { status, body })) => {
                relay_upstream(*status, body, &self.0.to_string())
            }
            _ => {
                tracing::error!("{:#}", self.0);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string())
            }
        }
    }
}

/// Pass an upstream error status through, with its JSON body if it has one.
fn relay_upstream(status: u16, body: &str, fallback: &str) -> Response {
    let status = StatusCode::from_u16(status)
        .ok()
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    tracing::warn!("Relaying upstream {} response", status.as_u16());

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => (status, Json(json)).into_response(),
        Err(_) if body.trim().is_empty() => error_response(status, fallback),
        Err(_) => error_response(status, body.trim()),
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
