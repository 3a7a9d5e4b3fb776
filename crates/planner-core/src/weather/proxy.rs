use super::operation::{UpstreamEndpoints, WeatherOperation};
use crate::cache::{cache_key, CacheStore};
use crate::error::{PlannerError, Result};
use crate::upstream::UpstreamFetcher;
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Where a proxied payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    Hit,
    Miss,
}

impl CacheSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub data: Value,
    pub source: CacheSource,
}

/// Read-through cache in front of the weather API.
///
/// Upstream errors are returned to the caller and never stored.
pub struct WeatherProxy {
    fetcher: Arc<dyn UpstreamFetcher>,
    cache: Arc<CacheStore>,
    endpoints: UpstreamEndpoints,
    api_key: Option<String>,
}

impl WeatherProxy {
    pub fn new(
        fetcher: Arc<dyn UpstreamFetcher>,
        cache: Arc<CacheStore>,
        endpoints: UpstreamEndpoints,
        api_key: Option<String>,
    ) -> Self {
        Self {
            fetcher,
            cache,
            endpoints,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn call(
        &self,
        operation: WeatherOperation,
        raw: &HashMap<String, String>,
    ) -> Result<ProxyResponse> {
        let params = operation.prepare(raw)?;
        let key = cache_key(
            operation.name(),
            params.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );

        if let Some(data) = self.cache.get(&key) {
            return Ok(ProxyResponse {
                data,
                source: CacheSource::Hit,
            });
        }

        let api_key = self
            .api_key
            .as_deref()
            .ok_or(PlannerError::MissingApiKey("OpenWeatherMap"))?;

        let mut query: Vec<(String, String)> = params.into_iter().collect();
        query.push(("appid".to_string(), api_key.to_string()));

        let (base, path) = operation.upstream();
        let data = match self
            .fetcher
            .fetch(self.endpoints.base(base), path, &query)
            .await
        {
            Ok(data) => data,
            Err(e) => {
                warn!("Error fetching {}: {}", operation, e);
                return Err(e.into());
            }
        };

        debug!("Caching {}", key);
        self.cache.put(&key, data.clone());

        Ok(ProxyResponse {
            data,
            source: CacheSource::Miss,
        })
    }
}
