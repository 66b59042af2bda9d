//! Shared fixtures: mock providers and canned payloads.

#![allow(dead_code)]

use crypto_gateway::api::{ListingsApi, TickerApi, UpstreamClient, HttpConfig};
use crypto_gateway::models::{CacheStore, CachedValue};
use crypto_gateway::QueryResolver;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-api-key";

/// One mock server per provider.
pub struct Providers {
    pub listings: MockServer,
    pub tickers: MockServer,
}

impl Providers {
    pub async fn start() -> Self {
        Self {
            listings: MockServer::start().await,
            tickers: MockServer::start().await,
        }
    }

    pub fn resolver(&self) -> QueryResolver {
        self.resolver_with(100, Duration::from_secs(60))
    }

    pub fn resolver_with(&self, capacity: usize, ttl: Duration) -> QueryResolver {
        let http = HttpConfig::default();
        let listings = ListingsApi::with_upstream(
            UpstreamClient::new(self.listings.uri(), &http).unwrap(),
            API_KEY,
        );
        let tickers = TickerApi::with_upstream(UpstreamClient::new(self.tickers.uri(), &http).unwrap());
        let cache = Arc::new(CacheStore::<CachedValue>::new(capacity, ttl).unwrap());
        QueryResolver::new(cache, listings, tickers)
    }

    pub async fn listings_json(&self, endpoint: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.listings)
            .await;
    }

    pub async fn quote_for(&self, id: u64) {
        Mock::given(method("GET"))
            .and(path("/quotes/latest"))
            .and(query_param("id", id.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(quotes_body(id)))
            .mount(&self.listings)
            .await;
    }

    pub async fn tickers_json(&self, crypto_id: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/tickers/{}/historical", crypto_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.tickers)
            .await;
    }
}

/// Number of requests `server` received on `endpoint`.
pub async fn hits(server: &MockServer, endpoint: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == endpoint)
        .count()
}

/// Number of requests on `endpoint` carrying `name=value` in the query.
pub async fn hits_with(server: &MockServer, endpoint: &str, name: &str, value: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == endpoint)
        .filter(|r| r.url.query_pairs().any(|(k, v)| k == name && v == value))
        .count()
}

pub fn listing_json(id: u64) -> Value {
    json!({
        "id": id,
        "name": format!("Coin {}", id),
        "symbol": format!("C{}", id),
        "slug": format!("coin-{}", id),
        "circulating_supply": 1_000_000.0 * id as f64,
        "max_supply": null,
        "last_updated": "2024-01-01T00:00:00.000Z",
        "quote": {
            "USD": {
                "price": 100.0 + id as f64,
                "volume_24h": 5_000_000.0,
                "percent_change_1h": -0.5,
                "market_cap": 1.0e9
            }
        }
    })
}

pub fn listings_body(count: u64) -> Value {
    json!({
        "status": { "error_code": 0, "error_message": null },
        "data": (1..=count).map(listing_json).collect::<Vec<_>>()
    })
}

pub fn quotes_body(id: u64) -> Value {
    let mut data = serde_json::Map::new();
    data.insert(id.to_string(), listing_json(id));
    json!({ "status": { "error_code": 0 }, "data": data })
}

pub fn info_body() -> Value {
    json!({
        "data": {
            "1027": {
                "id": 1027,
                "name": "Ethereum",
                "symbol": "ETH",
                "category": "coin",
                "slug": "ethereum",
                "tags": ["smart-contracts"],
                "platform": null,
                "date_added": "2015-08-07T00:00:00.000Z",
                "twitter_username": "ethereum",
                "is_hidden": 0
            },
            "1": {
                "id": 1,
                "name": "Bitcoin",
                "symbol": "BTC",
                "category": "coin",
                "slug": "bitcoin",
                "tags": ["mineable", "pow"],
                "platform": null,
                "date_added": "2010-07-13T00:00:00.000Z",
                "twitter_username": "",
                "is_hidden": 0
            }
        }
    })
}

pub fn ticker_points(count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| {
                json!({
                    "timestamp": format!("2024-01-{:02}T00:00:00Z", i + 1),
                    "price": 42000.0 + i as f64,
                    "volume_24h": 1.0e10,
                    "market_cap": 8.0e11
                })
            })
            .collect(),
    )
}
