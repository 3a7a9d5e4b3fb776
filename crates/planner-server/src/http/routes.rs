use super::{layout, weather, AppState};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use planner_core::WeatherOperation;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Build the application router.
///
/// Paths outside `/api` are served from `static_dir` when it is an existing directory.
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut router: Router<AppState> = Router::new()
        .route("/api/health", get(health))
        .route("/api/gemini/generate-layout", post(layout::generate_layout));

    for operation in WeatherOperation::ALL {
        router = router.route(
            &format!("/api/weather/{}", operation.name()),
            get(
                move |State(state): State<AppState>,
                      Query(raw): Query<HashMap<String, String>>| {
                    weather::proxy(state, operation, raw)
                },
            ),
        );
    }

    if let Some(dir) = static_dir.filter(|d| d.is_dir()) {
        tracing::info!("Serving static files from {}", dir.display());
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    version: &'static str,
    uptime_seconds: u64,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Server is running",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
