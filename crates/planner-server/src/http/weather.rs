use super::{AppResult, AppState};
use anyhow::Context;
use axum::{
    http::HeaderValue,
    response::{IntoResponse, Response},
    Json,
};
use planner_core::WeatherOperation;
use std::collections::HashMap;

pub const CACHE_HEADER: &str = "x-cache";

/// Proxy one weather operation through the cache.
///
/// The call runs on its own task so a client that hangs up does not cancel
/// an upstream request whose result would otherwise be cached.
pub async fn proxy(
    state: AppState,
    operation: WeatherOperation,
    raw: HashMap<String, String>,
) -> AppResult<Response> {
    let proxy = state.proxy.clone();
    let response = tokio::spawn(async move { proxy.call(operation, &raw).await })
        .await
        .context(operation.failure_message())?
        .context(operation.failure_message())?;

    let mut res = Json(response.data).into_response();
    res.headers_mut().insert(
        CACHE_HEADER,
        HeaderValue::from_static(response.source.as_str()),
    );
    Ok(res)
}
