//! Minimal HTTP fetch layer shared by the provider bindings.

use reqwest::{Client, ClientBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{GatewayError, Result};

/// HTTP transport settings.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("crypto_gateway/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Issues single-attempt GET requests against one provider base URL and
/// normalizes every non-success outcome into [`GatewayError::Upstream`].
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, config: &HttpConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` with the given query parameters and headers, returning the
    /// decoded JSON body.
    pub async fn fetch(
        &self,
        path: &str,
        params: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Result<Value> {
        let url = self.url(path);
        debug!(url = %url, ?params, "Sending upstream request");

        let mut request = self.client.get(&url).query(params);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|e| {
            GatewayError::upstream(None, format!("request to {} failed: {}", url, e))
        })?;

        let response = check_response(response).await?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::upstream(Some(status), format!("failed to read body: {}", e)))?;

        serde_json::from_slice(&body).map_err(|e| {
            GatewayError::upstream(Some(status), format!("malformed response body: {}", e))
        })
    }
}

/// Passes successful responses through and turns everything else into an
/// upstream error carrying the provider's own message when it sent one.
async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        } else {
            body
        }
    });

    Err(GatewayError::upstream(Some(status.as_u16()), message))
}

/// Extracts `status.error_message` (listings provider) or `error` (ticker
/// provider) from an error body.
fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("status")
        .and_then(|s| s.get("error_message"))
        .or_else(|| json.get("error"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("crypto_gateway/"));
    }

    #[test]
    fn test_url_joining() {
        let client = UpstreamClient::new("http://localhost:8080/v1/", &HttpConfig::default()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
        assert_eq!(client.url("/listings/latest"), "http://localhost:8080/v1/listings/latest");
        assert_eq!(client.url("info"), "http://localhost:8080/v1/info");
    }

    #[test]
    fn test_error_message_extraction() {
        let cmc = r#"{"status":{"error_code":1002,"error_message":"API key missing."}}"#;
        assert_eq!(error_message(cmc).as_deref(), Some("API key missing."));

        let paprika = r#"{"error":"id not found"}"#;
        assert_eq!(error_message(paprika).as_deref(), Some("id not found"));

        assert!(error_message("<html>bad gateway</html>").is_none());
        assert!(error_message(r#"{"status":{"error_message":null}}"#).is_none());
    }
}
