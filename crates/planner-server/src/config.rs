use anyhow::Context;
use planner_core::layout::{DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_URL};
use planner_core::UpstreamEndpoints;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

const MASK: &str = "********";

/// Contents of `planner.toml`. Every section and field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub weather: WeatherConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Built UI served for every path outside `/api`. Ignored when missing.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            static_dir: PathBuf::from("./dist"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub path: PathBuf,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./cache/weather-cache.json"),
            ttl_secs: planner_core::DEFAULT_TTL.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(flatten)]
    pub endpoints: UpstreamEndpoints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_URL.to_string(),
        }
    }
}

impl PlannerConfig {
    /// Parse `path`. Fails if the file is unreadable or not valid TOML.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Like [`PlannerConfig::load`], but a missing or broken file yields the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            warn!("{:#}; using defaults", e);
            Self::default()
        })
    }

    /// Effective configuration: the file if present, then environment overrides.
    pub fn resolve(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Apply `PORT`, `OPENWEATHER_API_KEY` and `GEMINI_API_KEY` from `lookup`.
    /// Blank values are ignored.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(port) = var("PORT") {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid PORT value {:?}", port),
            }
        }
        if let Some(key) = var("OPENWEATHER_API_KEY") {
            self.weather.api_key = Some(key);
        }
        if let Some(key) = var("GEMINI_API_KEY") {
            self.gemini.api_key = Some(key);
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.server.host.trim().is_empty() {
            errors.push("[server] host must not be empty".to_string());
        }
        if self.server.port == 0 {
            errors.push("[server] port must be between 1 and 65535".to_string());
        }
        if self.cache.path.as_os_str().is_empty() {
            errors.push("[cache] path must not be empty".to_string());
        }
        if self.cache.ttl_secs == 0 {
            errors.push("[cache] ttl_secs must be greater than 0".to_string());
        }

        let urls = [
            ("[weather] data_url", &self.weather.endpoints.data_url),
            ("[weather] onecall_url", &self.weather.endpoints.onecall_url),
            ("[weather] geo_url", &self.weather.endpoints.geo_url),
            ("[gemini] base_url", &self.gemini.base_url),
        ];
        for (field, url) in urls {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(format!("{} must be an http(s) URL, got {:?}", field, url));
            }
        }

        if self.gemini.model.trim().is_empty() {
            errors.push("[gemini] model must not be empty".to_string());
        }

        errors
    }

    /// Names of the environment variables for API keys that are not configured.
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.weather.api_key) {
            missing.push("OPENWEATHER_API_KEY");
        }
        if is_blank(&self.gemini.api_key) {
            missing.push("GEMINI_API_KEY");
        }
        missing
    }

    /// Copy with API keys masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for key in [&mut copy.weather.api_key, &mut copy.gemini.api_key] {
            if key.is_some() {
                *key = Some(MASK.to_string());
            }
        }
        copy
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
