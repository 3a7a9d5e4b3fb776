use super::{bad_request, AppResult, AppState};
use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    #[serde(default)]
    pub query: Option<String>,
}

pub async fn generate_layout(
    State(state): State<AppState>,
    payload: Result<Json<LayoutRequest>, JsonRejection>,
) -> AppResult<Response> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return Ok(bad_request(rejection.body_text())),
    };
    let query = request.query.unwrap_or_default();

    let generator = state.layout.clone();
    let layout = tokio::spawn(async move { generator.generate(&query).await })
        .await
        .context("Failed to generate layout")?
        .context("Failed to generate layout")?;

    Ok(Json(layout).into_response())
}
