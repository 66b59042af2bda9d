use thiserror::Error;

/// Errors surfaced by the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport failure, non-success status or unreadable body from a provider
    #[error("upstream request failed{}: {message}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Upstream { status: Option<u16>, message: String },

    /// Historical ticker window with no data points
    #[error("no data available for {crypto_id} between {start_date} and {}", .end_date.as_deref().unwrap_or("now"))]
    EmptyResult {
        crypto_id: String,
        start_date: String,
        end_date: Option<String>,
    },

    /// Upstream payload did not have the expected shape
    #[error("unexpected upstream payload: {0}")]
    Transform(String),

    /// Missing or invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        GatewayError::Upstream {
            status,
            message: message.into(),
        }
    }

    /// HTTP status of an upstream failure, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Transform(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_display_includes_status() {
        let err = GatewayError::upstream(Some(429), "rate limited");
        let msg = err.to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("rate limited"));
        assert_eq!(err.status(), Some(429));
    }

    #[test]
    fn test_upstream_display_without_status() {
        let err = GatewayError::upstream(None, "connection refused");
        assert_eq!(err.to_string(), "upstream request failed: connection refused");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_empty_result_display() {
        let err = GatewayError::EmptyResult {
            crypto_id: "btc-bitcoin".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: None,
        };
        assert_eq!(
            err.to_string(),
            "no data available for btc-bitcoin between 2024-01-01 and now"
        );
    }
}
