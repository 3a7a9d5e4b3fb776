use crate::config::PlannerConfig;
use crate::http;
use planner_core::{CacheStore, GeminiClient, HttpFetcher, LayoutGenerator, WeatherProxy};
use std::sync::Arc;
use tracing::{info, warn};

pub fn open_cache(config: &PlannerConfig) -> Arc<CacheStore> {
    Arc::new(CacheStore::open(&config.cache.path, config.ttl()))
}

pub fn weather_proxy(config: &PlannerConfig, cache: Arc<CacheStore>) -> WeatherProxy {
    WeatherProxy::new(
        Arc::new(HttpFetcher::new()),
        cache,
        config.weather.endpoints.clone(),
        config.weather.api_key.clone(),
    )
}

pub fn layout_generator(config: &PlannerConfig) -> LayoutGenerator {
    let client = GeminiClient::new(config.gemini.api_key.clone(), config.gemini.model.clone())
        .with_base_url(config.gemini.base_url.clone());
    LayoutGenerator::new(Arc::new(client))
}

pub async fn run(config: PlannerConfig) -> anyhow::Result<()> {
    info!("Starting Open Weather Planner v{}", env!("CARGO_PKG_VERSION"));

    let errors = config.validate();
    if !errors.is_empty() {
        anyhow::bail!("Invalid configuration:\n  - {}", errors.join("\n  - "));
    }
    for name in config.missing_secrets() {
        warn!("{} is not set; requests that need it will fail", name);
    }

    info!("HTTP: {}", config.bind_addr());
    info!("Cache: {:?} (ttl {}s)", config.cache.path, config.cache.ttl_secs);
    info!("Model: {}", config.gemini.model);

    let cache = open_cache(&config);
    let state = http::AppState {
        proxy: Arc::new(weather_proxy(&config, cache)),
        layout: Arc::new(layout_generator(&config)),
        start_time: std::time::Instant::now(),
    };
    let app = http::create_router(state, Some(&config.server.static_dir));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}
