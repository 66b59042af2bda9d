//! Gateway configuration loaded from the environment.

use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::api::upstream::HttpConfig;
use crate::error::{GatewayError, Result};

/// Environment variable names.
pub mod vars {
    pub const CMC_API_URL: &str = "CMC_API_URL";
    pub const CMC_API_KEY: &str = "CMC_API_KEY";
    pub const PAPRIKA_API_URL: &str = "PAPRIKA_API_URL";
    pub const CACHE_CAPACITY: &str = "CACHE_CAPACITY";
    pub const CACHE_TTL_SECS: &str = "CACHE_TTL_SECS";
    pub const HTTP_CONNECT_TIMEOUT_SECS: &str = "HTTP_CONNECT_TIMEOUT_SECS";
    pub const HTTP_REQUEST_TIMEOUT_SECS: &str = "HTTP_REQUEST_TIMEOUT_SECS";
}

pub const DEFAULT_CMC_API_URL: &str = "https://pro-api.coinmarketcap.com/v1/cryptocurrency";
pub const DEFAULT_PAPRIKA_API_URL: &str = "https://api.coinpaprika.com/v1";
pub const DEFAULT_CACHE_CAPACITY: usize = 100;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300; // 5 minutes

/// Listings/quotes provider settings.
#[derive(Clone)]
pub struct ListingsConfig {
    pub base_url: String,
    pub api_key: String,
}

impl fmt::Debug for ListingsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked_key = if self.api_key.len() > 8 {
            format!(
                "{}...{}",
                &self.api_key[..4],
                &self.api_key[self.api_key.len() - 4..]
            )
        } else {
            "***REDACTED***".to_string()
        };

        f.debug_struct("ListingsConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &masked_key)
            .finish()
    }
}

/// Historical ticker provider settings. The provider needs no key.
#[derive(Debug, Clone)]
pub struct TickerConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub listings: ListingsConfig,
    pub tickers: TickerConfig,
    pub cache: CacheConfig,
    pub http: HttpConfig,
}

impl GatewayConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let api_key = get(vars::CMC_API_KEY).ok_or_else(|| {
            GatewayError::Config(format!(
                "required environment variable not set: {}",
                vars::CMC_API_KEY
            ))
        })?;

        let defaults = HttpConfig::default();
        let http = HttpConfig {
            connect_timeout: parse_secs(&get, vars::HTTP_CONNECT_TIMEOUT_SECS)?
                .unwrap_or(defaults.connect_timeout),
            request_timeout: parse_secs(&get, vars::HTTP_REQUEST_TIMEOUT_SECS)?
                .unwrap_or(defaults.request_timeout),
            ..defaults
        };

        let cache = CacheConfig {
            capacity: parse_num::<usize, _>(&get, vars::CACHE_CAPACITY)?
                .unwrap_or(DEFAULT_CACHE_CAPACITY),
            ttl: parse_secs(&get, vars::CACHE_TTL_SECS)?
                .unwrap_or(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)),
        };
        if cache.capacity == 0 {
            return Err(GatewayError::Config(format!(
                "{} must be greater than zero",
                vars::CACHE_CAPACITY
            )));
        }

        Ok(Self {
            listings: ListingsConfig {
                base_url: get(vars::CMC_API_URL).unwrap_or_else(|| DEFAULT_CMC_API_URL.to_string()),
                api_key,
            },
            tickers: TickerConfig {
                base_url: get(vars::PAPRIKA_API_URL)
                    .unwrap_or_else(|| DEFAULT_PAPRIKA_API_URL.to_string()),
            },
            cache,
            http,
        })
    }
}

fn parse_num<T, G>(get: &G, var: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            GatewayError::Config(format!("invalid value for {}: expected integer, got {:?}", var, raw))
        }),
        None => Ok(None),
    }
}

fn parse_secs<G>(get: &G, var: &str) -> Result<Option<Duration>>
where
    G: Fn(&str) -> Option<String>,
{
    Ok(parse_num::<u64, _>(get, var)?.map(Duration::from_secs))
}
