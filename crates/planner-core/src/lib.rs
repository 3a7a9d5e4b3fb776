//! Core of the Open Weather Planner backend.
//!
//! * [`cache`]: TTL cache of upstream payloads persisted to one JSON file.
//! * [`upstream`]: single-shot GETs against the weather API.
//! * [`weather`]: the six proxied operations and the read-through [`WeatherProxy`].
//! * [`layout`]: prompt building and forced function calling to pick weather cards.

pub mod cache;
pub mod error;
pub mod layout;
pub mod upstream;
pub mod weather;

pub use cache::{cache_key, CacheBackend, CacheStats, CacheStore, Clock, FileBackend, MemoryBackend, DEFAULT_TTL};
pub use error::{ModelError, PlannerError, Result, UpstreamError};
pub use layout::{
    CardDescriptor, GeminiClient, GenerativeModel, Layout, LayoutGenerator, DEFAULT_LOCATION,
};
pub use upstream::{HttpFetcher, UpstreamFetcher};
pub use weather::{CacheSource, ProxyResponse, UpstreamEndpoints, WeatherOperation, WeatherProxy};
