//! Listings/quotes provider binding (CoinMarketCap v1 cryptocurrency API).

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use super::upstream::{HttpConfig, UpstreamClient};
use crate::config::ListingsConfig;
use crate::error::{GatewayError, Result};

pub const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

#[derive(Debug, Deserialize)]
pub struct ListingsResponse {
    pub data: Vec<ListingRecord>,
}

#[derive(Debug, Deserialize)]
pub struct QuotesResponse {
    pub data: HashMap<String, ListingRecord>,
}

#[derive(Debug, Deserialize)]
pub struct InfoResponse {
    pub data: HashMap<String, InfoRecord>,
}

/// Entry shared by the listings and quotes endpoints.
#[derive(Debug, Deserialize)]
pub struct ListingRecord {
    pub id: u64,
    pub name: String,
    pub symbol: String,
    pub circulating_supply: f64,
    pub max_supply: Option<f64>,
    pub last_updated: String,
    pub quote: HashMap<String, QuoteRecord>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteRecord {
    pub price: f64,
    pub volume_24h: f64,
    pub percent_change_1h: Option<f64>,
    pub market_cap: f64,
}

#[derive(Debug, Deserialize)]
pub struct InfoRecord {
    pub id: u64,
    pub name: String,
    pub symbol: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub logo: Option<String>,
    pub subreddit: Option<String>,
    pub notice: Option<String>,
    pub tags: Option<Vec<String>>,
    pub platform: Option<PlatformRecord>,
    pub date_added: String,
    pub twitter_username: Option<String>,
    #[serde(default)]
    pub is_hidden: i64,
}

#[derive(Debug, Deserialize)]
pub struct PlatformRecord {
    pub name: String,
}

pub struct ListingsApi {
    upstream: UpstreamClient,
    api_key: String,
}

impl ListingsApi {
    pub fn new(config: &ListingsConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self::with_upstream(
            UpstreamClient::new(config.base_url.clone(), http)?,
            config.api_key.clone(),
        ))
    }

    pub fn with_upstream(upstream: UpstreamClient, api_key: impl Into<String>) -> Self {
        Self {
            upstream,
            api_key: api_key.into(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let headers = [
            (API_KEY_HEADER, self.api_key.as_str()),
            ("Accept", "application/json"),
        ];
        let json = self.upstream.fetch(path, params, &headers).await?;
        serde_json::from_value(json)
            .map_err(|e| GatewayError::Transform(format!("{}: {}", path, e)))
    }

    /// `GET listings/latest?limit=`
    pub async fn listings_latest(&self, limit: u32) -> Result<ListingsResponse> {
        let response: ListingsResponse = self
            .get("listings/latest", &[("limit", limit.to_string())])
            .await?;
        debug!("Parsed {} listings from response", response.data.len());
        Ok(response)
    }

    /// `GET quotes/latest?id=`
    pub async fn quotes_latest(&self, id: &str) -> Result<QuotesResponse> {
        self.get("quotes/latest", &[("id", id.to_string())]).await
    }

    /// `GET info?id=` with a comma separated id list.
    pub async fn info(&self, ids: &str) -> Result<InfoResponse> {
        let response: InfoResponse = self.get("info", &[("id", ids.to_string())]).await?;
        debug!("Parsed {} info records from response", response.data.len());
        Ok(response)
    }
}
