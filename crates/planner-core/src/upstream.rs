//! Outbound GET requests to the weather and geocoding APIs.

use crate::error::UpstreamError;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;

/// One GET against `base_url` + `path` with the given query pairs.
///
/// Implementations must not retry and must return non-2xx responses as
/// [`UpstreamError::Status`] with the body untouched.
#[async_trait]
pub trait UpstreamFetcher: Send + Sync {
    async fn fetch(
        &self,
        base_url: &str,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Value, UpstreamError>;
}

/// reqwest-backed fetcher. Uses transport defaults for timeouts.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

/// `path` may be empty when the base URL is already the full endpoint.
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

#[async_trait]
impl UpstreamFetcher for HttpFetcher {
    async fn fetch(
        &self,
        base_url: &str,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Value, UpstreamError> {
        let url = join_url(base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Upstream {} returned {}", url, status);
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Transport(e.without_url().to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://h/data/2.5", "weather"), "https://h/data/2.5/weather");
        assert_eq!(join_url("https://h/data/2.5/", "/weather"), "https://h/data/2.5/weather");
        assert_eq!(join_url("https://h/data/3.0/onecall", ""), "https://h/data/3.0/onecall");
    }

    #[tokio::test]
    async fn test_fetch_sends_query_and_decodes_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "51.5"))
            .and(query_param("lon", "-0.12"))
            .and(query_param("appid", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "London"})))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new();
        let body = fetcher
            .fetch(
                &format!("{}/data/2.5", server.uri()),
                "weather",
                &params(&[("lat", "51.5"), ("lon", "-0.12"), ("appid", "secret")]),
            )
            .await
            .unwrap();

        assert_eq!(body, json!({"name": "London"}));
    }

    #[tokio::test]
    async fn test_non_success_status_is_surfaced_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string(r#"{"cod":401,"message":"Invalid API key"}"#),
            )
            .mount(&server)
            .await;

        let err = HttpFetcher::new()
            .fetch(&server.uri(), "weather", &[])
            .await
            .unwrap_err();

        match err {
            UpstreamError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, r#"{"cod":401,"message":"Invalid API key"}"#);
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = HttpFetcher::new()
            .fetch(&server.uri(), "", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();

        let err = HttpFetcher::new()
            .fetch(&format!("http://{}", addr), "weather", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Transport(_)));
    }
}
