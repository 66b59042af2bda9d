use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::timestamp;

/// Market snapshot for a single token, priced in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    /// Only populated by the listings query.
    pub percentage_change_1h: Option<f64>,
    pub circulating_supply: f64,
    pub max_supply: Option<f64>,
    #[serde(with = "timestamp::millis")]
    pub last_updated: DateTime<Utc>,
}

/// Static metadata for a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub logo: Option<String>,
    pub subreddit: Option<String>,
    pub notice: Option<String>,
    pub tags: Option<Vec<String>>,
    pub platform: Option<String>,
    #[serde(with = "timestamp::millis")]
    pub date_added: DateTime<Utc>,
    pub twitter_username: Option<String>,
    pub is_hidden: i64,
}

/// One historical data point. `timestamp` is passed through as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub timestamp: String,
    pub price: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
}

/// Values held by the shared cache, one variant per query shape.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Tokens(Arc<Vec<Token>>),
    Token(Arc<Token>),
    TokenInfo(Arc<Vec<TokenInfo>>),
    Tickers(Arc<Vec<Ticker>>),
}

impl CachedValue {
    pub fn kind(&self) -> &'static str {
        match self {
            CachedValue::Tokens(_) => "tokens",
            CachedValue::Token(_) => "token",
            CachedValue::TokenInfo(_) => "tokenInfo",
            CachedValue::Tickers(_) => "tickers",
        }
    }
}
