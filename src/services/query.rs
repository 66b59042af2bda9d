//! Multi-field requests resolved concurrently with per-field error isolation.

use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info_span, Instrument};

use super::resolver::{keys, QueryResolver, TickerQuery, DEFAULT_TOKENS_LIMIT};
use crate::error::Result;

/// One requested field with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldQuery {
    Tokens { limit: Option<u32> },
    Token { id: String },
    TokenInfo { ids: String },
    CryptoTickers(TickerQuery),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryParseError {
    #[error("empty query")]
    Empty,

    #[error("unknown query: {0}")]
    UnknownField(String),

    #[error("{field}: missing argument <{argument}>")]
    MissingArgument {
        field: &'static str,
        argument: &'static str,
    },

    #[error("{field}: invalid {argument} {value:?}, expected a non-negative integer")]
    InvalidNumber {
        field: &'static str,
        argument: &'static str,
        value: String,
    },

    #[error("{field}: unexpected argument {value:?}")]
    UnexpectedArgument { field: &'static str, value: String },
}

impl FieldQuery {
    /// Public field name as exposed by the query surface.
    pub fn field_name(&self) -> &'static str {
        match self {
            FieldQuery::Tokens { .. } => "tokens",
            FieldQuery::Token { .. } => "token",
            FieldQuery::TokenInfo { .. } => "tokenInfo",
            FieldQuery::CryptoTickers(_) => "getCryptoTickers",
        }
    }

    pub fn cache_key(&self) -> String {
        match self {
            FieldQuery::Tokens { limit } => keys::tokens(limit.unwrap_or(DEFAULT_TOKENS_LIMIT)),
            FieldQuery::Token { id } => keys::token(id),
            FieldQuery::TokenInfo { ids } => keys::token_info(ids),
            FieldQuery::CryptoTickers(query) => keys::tickers(query),
        }
    }

    /// Parses the command form used by the CLI:
    ///
    /// ```text
    /// tokens [limit]
    /// token <id>
    /// info <ids>
    /// tickers <crypto_id> <start_date> [end_date] [limit]
    /// ```
    ///
    /// For `tickers`, a purely numeric third argument is read as the limit.
    pub fn parse(input: &str) -> std::result::Result<Self, QueryParseError> {
        let mut parts = input.split_whitespace();
        let command = parts.next().ok_or(QueryParseError::Empty)?;
        let args: Vec<&str> = parts.collect();

        let query = match command {
            "tokens" => {
                let limit = args
                    .first()
                    .map(|raw| parse_number("tokens", "limit", raw))
                    .transpose()?;
                reject_extra("tokens", &args, 1)?;
                FieldQuery::Tokens { limit }
            }
            "token" => {
                let id = required("token", "id", &args, 0)?;
                reject_extra("token", &args, 1)?;
                FieldQuery::Token { id }
            }
            "info" | "tokenInfo" => {
                let ids = required("tokenInfo", "ids", &args, 0)?;
                reject_extra("tokenInfo", &args, 1)?;
                FieldQuery::TokenInfo { ids }
            }
            "tickers" | "getCryptoTickers" => {
                const FIELD: &str = "getCryptoTickers";
                let crypto_id = required(FIELD, "crypto_id", &args, 0)?;
                let start_date = required(FIELD, "start_date", &args, 1)?;

                let (end_date, limit) = match &args[2..] {
                    [] => (None, None),
                    [one] if one.chars().all(|c| c.is_ascii_digit()) => {
                        (None, Some(parse_number(FIELD, "limit", one)?))
                    }
                    [end] => (Some(end.to_string()), None),
                    [end, limit] => (
                        Some(end.to_string()),
                        Some(parse_number(FIELD, "limit", limit)?),
                    ),
                    [_, _, extra, ..] => {
                        return Err(QueryParseError::UnexpectedArgument {
                            field: FIELD,
                            value: extra.to_string(),
                        })
                    }
                };
                FieldQuery::CryptoTickers(TickerQuery::new(crypto_id, start_date, end_date, limit))
            }
            other => return Err(QueryParseError::UnknownField(other.to_string())),
        };

        Ok(query)
    }

    /// Parses `;`-separated queries.
    pub fn parse_batch(input: &str) -> std::result::Result<Vec<Self>, QueryParseError> {
        let queries: Vec<Self> = input
            .split(';')
            .filter(|part| !part.trim().is_empty())
            .map(Self::parse)
            .collect::<std::result::Result<_, _>>()?;

        if queries.is_empty() {
            return Err(QueryParseError::Empty);
        }
        Ok(queries)
    }
}

fn required(
    field: &'static str,
    argument: &'static str,
    args: &[&str],
    index: usize,
) -> std::result::Result<String, QueryParseError> {
    args.get(index)
        .map(|s| s.to_string())
        .ok_or(QueryParseError::MissingArgument { field, argument })
}

fn reject_extra(
    field: &'static str,
    args: &[&str],
    max: usize,
) -> std::result::Result<(), QueryParseError> {
    match args.get(max) {
        Some(extra) => Err(QueryParseError::UnexpectedArgument {
            field,
            value: extra.to_string(),
        }),
        None => Ok(()),
    }
}

fn parse_number(
    field: &'static str,
    argument: &'static str,
    raw: &str,
) -> std::result::Result<u32, QueryParseError> {
    raw.parse().map_err(|_| QueryParseError::InvalidNumber {
        field,
        argument,
        value: raw.to_string(),
    })
}

/// Opaque identity of whoever issued the request. Only used for logging.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub caller: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_caller(caller: impl Into<String>) -> Self {
        Self {
            caller: Some(caller.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Response key of the failed field.
    pub field: String,
    pub message: String,
}

/// Per-field results. A failed field maps to `null` in `data` and has a
/// matching entry in `errors`.
#[derive(Debug, Default, Serialize)]
pub struct Response {
    pub data: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl Response {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_for(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }
}

impl QueryResolver {
    /// Resolves a single field into a JSON value.
    pub async fn resolve_field(&self, query: &FieldQuery) -> Result<Value> {
        let value = match query {
            FieldQuery::Tokens { limit } => serde_json::to_value(&*self.tokens(*limit).await?)?,
            FieldQuery::Token { id } => serde_json::to_value(&*self.token(id).await?)?,
            FieldQuery::TokenInfo { ids } => serde_json::to_value(&*self.token_info(ids).await?)?,
            FieldQuery::CryptoTickers(q) => serde_json::to_value(&*self.crypto_tickers(q).await?)?,
        };
        Ok(value)
    }

    /// Resolves every field concurrently. One field failing never affects
    /// the others. Repeated field names get a numeric suffix in the
    /// response (`tokens`, `tokens_2`, ...).
    pub async fn execute(&self, ctx: &RequestContext, queries: &[FieldQuery]) -> Response {
        let span = info_span!(
            "request",
            caller = ctx.caller.as_deref().unwrap_or("anonymous"),
            fields = queries.len()
        );

        async {
            let response_keys = response_keys(queries);
            let results = join_all(queries.iter().map(|q| self.resolve_field(q))).await;

            let mut response = Response::default();
            for (key, result) in response_keys.into_iter().zip(results) {
                match result {
                    Ok(value) => {
                        response.data.insert(key, value);
                    }
                    Err(err) => {
                        response.data.insert(key.clone(), Value::Null);
                        response.errors.push(FieldError {
                            field: key,
                            message: err.to_string(),
                        });
                    }
                }
            }

            debug!(
                resolved = response.data.len() - response.errors.len(),
                failed = response.errors.len(),
                "Request complete"
            );
            response
        }
        .instrument(span)
        .await
    }
}

fn response_keys(queries: &[FieldQuery]) -> Vec<String> {
    let mut seen: HashMap<&'static str, usize> = HashMap::new();
    queries
        .iter()
        .map(|q| {
            let name = q.field_name();
            let count = seen.entry(name).or_insert(0);
            *count += 1;
            if *count == 1 {
                name.to_string()
            } else {
                format!("{}_{}", name, count)
            }
        })
        .collect()
}
