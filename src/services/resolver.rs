use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::api::{ListingsApi, TickerApi};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::models::{CacheStore, CachedValue, Ticker, Token, TokenInfo};
use crate::services::transform;

pub const DEFAULT_TOKENS_LIMIT: u32 = 10;
pub const DEFAULT_TICKERS_LIMIT: u32 = 30;

/// Arguments of the historical ticker field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerQuery {
    crypto_id: String,
    start_date: String,
    end_date: Option<String>,
    limit: u32,
}

impl TickerQuery {
    /// An empty `end_date` is treated the same as an absent one.
    pub fn new(
        crypto_id: impl Into<String>,
        start_date: impl Into<String>,
        end_date: Option<String>,
        limit: Option<u32>,
    ) -> Self {
        Self {
            crypto_id: crypto_id.into(),
            start_date: start_date.into(),
            end_date: end_date.filter(|d| !d.trim().is_empty()),
            limit: limit.unwrap_or(DEFAULT_TICKERS_LIMIT),
        }
    }

    pub fn crypto_id(&self) -> &str {
        &self.crypto_id
    }

    pub fn start_date(&self) -> &str {
        &self.start_date
    }

    pub fn end_date(&self) -> Option<&str> {
        self.end_date.as_deref()
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

/// Cache keys, one shape per field. Argument order is fixed.
pub mod keys {
    use super::TickerQuery;

    pub fn tokens(limit: u32) -> String {
        format!("tokens:{}", limit)
    }

    pub fn token(id: &str) -> String {
        format!("token:{}", id)
    }

    pub fn token_info(ids: &str) -> String {
        format!("tokenInfo:{}", ids)
    }

    pub fn tickers(query: &TickerQuery) -> String {
        format!(
            "tickers:{}:{}:{}:{}",
            query.crypto_id(),
            query.start_date(),
            query.end_date().unwrap_or_default(),
            query.limit()
        )
    }
}

/// Read-through resolver for every exposed query field.
///
/// Each field checks the shared cache, fetches from its provider on a miss,
/// maps the payload and stores the result. Failures are logged and returned
/// without touching the cache.
pub struct QueryResolver {
    cache: Arc<CacheStore<CachedValue>>,
    listings: ListingsApi,
    tickers: TickerApi,
}

impl QueryResolver {
    pub fn new(cache: Arc<CacheStore<CachedValue>>, listings: ListingsApi, tickers: TickerApi) -> Self {
        Self {
            cache,
            listings,
            tickers,
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let cache = Arc::new(CacheStore::new(config.cache.capacity, config.cache.ttl)?);
        info!(
            capacity = config.cache.capacity,
            ttl_secs = config.cache.ttl.as_secs(),
            "Initialized query cache"
        );

        Ok(Self::new(
            cache,
            ListingsApi::new(&config.listings, &config.http)?,
            TickerApi::new(&config.tickers, &config.http)?,
        ))
    }

    pub fn cache(&self) -> &Arc<CacheStore<CachedValue>> {
        &self.cache
    }

    /// `tokens(limit = 10)`
    pub async fn tokens(&self, limit: Option<u32>) -> Result<Arc<Vec<Token>>> {
        let limit = limit.unwrap_or(DEFAULT_TOKENS_LIMIT);
        self.resolve(
            "tokens",
            keys::tokens(limit),
            |cached| match cached {
                CachedValue::Tokens(tokens) => Some(tokens),
                _ => None,
            },
            CachedValue::Tokens,
            || async move {
                let response = self.listings.listings_latest(limit).await?;
                transform::tokens_from_listings(response)
            },
        )
        .await
    }

    /// `token(id)`
    pub async fn token(&self, id: &str) -> Result<Arc<Token>> {
        self.resolve(
            "token",
            keys::token(id),
            |cached| match cached {
                CachedValue::Token(token) => Some(token),
                _ => None,
            },
            CachedValue::Token,
            || async move {
                let response = self.listings.quotes_latest(id).await?;
                transform::token_from_quotes(response, id)
            },
        )
        .await
    }

    /// `tokenInfo(ids)`
    pub async fn token_info(&self, ids: &str) -> Result<Arc<Vec<TokenInfo>>> {
        self.resolve(
            "tokenInfo",
            keys::token_info(ids),
            |cached| match cached {
                CachedValue::TokenInfo(infos) => Some(infos),
                _ => None,
            },
            CachedValue::TokenInfo,
            || async move {
                let response = self.listings.info(ids).await?;
                transform::token_infos(response)
            },
        )
        .await
    }

    /// `getCryptoTickers(cryptoId, startDate, endDate?, limit = 30)`
    pub async fn crypto_tickers(&self, query: &TickerQuery) -> Result<Arc<Vec<Ticker>>> {
        self.resolve(
            "getCryptoTickers",
            keys::tickers(query),
            |cached| match cached {
                CachedValue::Tickers(tickers) => Some(tickers),
                _ => None,
            },
            CachedValue::Tickers,
            || async move {
                let points = self
                    .tickers
                    .historical(
                        query.crypto_id(),
                        query.start_date(),
                        query.end_date(),
                        query.limit(),
                    )
                    .await?;

                if points.is_empty() {
                    return Err(GatewayError::EmptyResult {
                        crypto_id: query.crypto_id().to_string(),
                        start_date: query.start_date().to_string(),
                        end_date: query.end_date().map(str::to_string),
                    });
                }
                Ok(transform::tickers(points))
            },
        )
        .await
    }

    async fn resolve<T, F, Fut>(
        &self,
        field: &'static str,
        key: String,
        unwrap: fn(CachedValue) -> Option<Arc<T>>,
        wrap: fn(Arc<T>) -> CachedValue,
        fetch: F,
    ) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(cached) = self.cache.get(&key) {
            let kind = cached.kind();
            match unwrap(cached) {
                Some(value) => {
                    debug!(field, key = %key, "Cache hit");
                    return Ok(value);
                }
                None => warn!(field, key = %key, kind, "Cached value has unexpected kind, refetching"),
            }
        }

        debug!(field, key = %key, "Cache miss");
        match fetch().await {
            Ok(value) => {
                let value = Arc::new(value);
                self.cache.set(&key, wrap(Arc::clone(&value)));
                Ok(value)
            }
            Err(err @ GatewayError::EmptyResult { .. }) => {
                warn!(field, key = %key, error = %err, "No data for field");
                Err(err)
            }
            Err(err) => {
                error!(field, key = %key, error = %err, "Failed to resolve field");
                Err(err)
            }
        }
    }
}
