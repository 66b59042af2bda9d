//! Historical ticker provider binding (CoinPaprika v1).

use serde::Deserialize;
use tracing::debug;

use super::upstream::{HttpConfig, UpstreamClient};
use crate::config::TickerConfig;
use crate::error::{GatewayError, Result};

pub const HISTORICAL_INTERVAL: &str = "7d";

#[derive(Debug, Deserialize)]
pub struct TickerPoint {
    pub timestamp: String,
    pub price: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
}

pub struct TickerApi {
    upstream: UpstreamClient,
}

impl TickerApi {
    pub fn new(config: &TickerConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self::with_upstream(UpstreamClient::new(
            config.base_url.clone(),
            http,
        )?))
    }

    pub fn with_upstream(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }

    /// `GET tickers/{crypto_id}/historical`. A null body yields no points.
    pub async fn historical(
        &self,
        crypto_id: &str,
        start: &str,
        end: Option<&str>,
        limit: u32,
    ) -> Result<Vec<TickerPoint>> {
        let mut params = vec![("start", start.to_string())];
        if let Some(end) = end {
            params.push(("end", end.to_string()));
        }
        params.push(("interval", HISTORICAL_INTERVAL.to_string()));
        params.push(("limit", limit.to_string()));

        let path = format!("tickers/{}/historical", crypto_id);
        let json = self.upstream.fetch(&path, &params, &[]).await?;
        if json.is_null() {
            return Ok(Vec::new());
        }

        let points: Vec<TickerPoint> = serde_json::from_value(json)
            .map_err(|e| GatewayError::Transform(format!("{}: {}", path, e)))?;

        debug!(crypto_id, points = points.len(), "Parsed historical tickers");
        Ok(points)
    }
}
