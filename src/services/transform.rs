//! Pure mappings from provider records to the public result shapes.

use chrono::{DateTime, Utc};

use crate::api::coinmarketcap::{
    InfoRecord, InfoResponse, ListingRecord, ListingsResponse, QuoteRecord, QuotesResponse,
};
use crate::api::coinpaprika::TickerPoint;
use crate::error::{GatewayError, Result};
use crate::models::{Ticker, Token, TokenInfo};

const QUOTE_CURRENCY: &str = "USD";

pub fn tokens_from_listings(response: ListingsResponse) -> Result<Vec<Token>> {
    response
        .data
        .into_iter()
        .map(|record| token_from_record(record, true))
        .collect()
}

/// Single quote lookup. The 1h change is deliberately left out here even
/// though the listings mapping carries it.
pub fn token_from_quotes(mut response: QuotesResponse, id: &str) -> Result<Token> {
    let record = response
        .data
        .remove(id.trim())
        .ok_or_else(|| GatewayError::Transform(format!("no quote returned for id {}", id)))?;
    token_from_record(record, false)
}

/// Info records ordered by numeric id.
pub fn token_infos(response: InfoResponse) -> Result<Vec<TokenInfo>> {
    let mut records: Vec<InfoRecord> = response.data.into_values().collect();
    records.sort_by_key(|r| r.id);
    records.into_iter().map(token_info_from_record).collect()
}

pub fn tickers(points: Vec<TickerPoint>) -> Vec<Ticker> {
    points
        .into_iter()
        .map(|p| Ticker {
            timestamp: p.timestamp,
            price: p.price,
            volume_24h: p.volume_24h,
            market_cap: p.market_cap,
        })
        .collect()
}

fn token_from_record(mut record: ListingRecord, with_hourly_change: bool) -> Result<Token> {
    let quote: QuoteRecord = record.quote.remove(QUOTE_CURRENCY).ok_or_else(|| {
        GatewayError::Transform(format!("{} quote missing for id {}", QUOTE_CURRENCY, record.id))
    })?;

    Ok(Token {
        id: record.id.to_string(),
        name: record.name,
        symbol: record.symbol,
        price: quote.price,
        market_cap: quote.market_cap,
        volume_24h: quote.volume_24h,
        percentage_change_1h: if with_hourly_change {
            quote.percent_change_1h
        } else {
            None
        },
        circulating_supply: record.circulating_supply,
        max_supply: record.max_supply,
        last_updated: parse_timestamp("last_updated", &record.last_updated)?,
    })
}

fn token_info_from_record(record: InfoRecord) -> Result<TokenInfo> {
    Ok(TokenInfo {
        id: record.id.to_string(),
        name: record.name,
        symbol: record.symbol,
        category: record.category,
        description: record.description,
        slug: record.slug,
        logo: record.logo,
        subreddit: record.subreddit,
        notice: record.notice,
        tags: record.tags,
        platform: record.platform.map(|p| p.name),
        date_added: parse_timestamp("date_added", &record.date_added)?,
        twitter_username: record.twitter_username,
        is_hidden: record.is_hidden,
    })
}

fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| GatewayError::Transform(format!("invalid {} {:?}: {}", field, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing_json(id: u64) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Bitcoin",
            "symbol": "BTC",
            "slug": "bitcoin",
            "circulating_supply": 19_600_000.0,
            "max_supply": 21_000_000.0,
            "last_updated": "2024-01-01T00:00:00.000Z",
            "quote": {
                "USD": {
                    "price": 42000.0,
                    "volume_24h": 1.5e10,
                    "percent_change_1h": 0.25,
                    "market_cap": 8.2e11
                }
            }
        })
    }

    #[test]
    fn test_listing_maps_nested_quote() {
        let response: ListingsResponse =
            serde_json::from_value(json!({ "data": [listing_json(1)] })).unwrap();
        let tokens = tokens_from_listings(response).unwrap();

        assert_eq!(tokens.len(), 1);
        let token = &tokens[0];
        assert_eq!(token.id, "1");
        assert_eq!(token.price, 42000.0);
        assert_eq!(token.market_cap, 8.2e11);
        assert_eq!(token.volume_24h, 1.5e10);
        assert_eq!(token.percentage_change_1h, Some(0.25));
        assert_eq!(token.circulating_supply, 19_600_000.0);
        assert_eq!(token.max_supply, Some(21_000_000.0));
        assert_eq!(token.last_updated.timestamp_millis(), 1_704_067_200_000);
    }

    #[test]
    fn test_quote_omits_hourly_change() {
        let response: QuotesResponse =
            serde_json::from_value(json!({ "data": { "1": listing_json(1) } })).unwrap();
        let token = token_from_quotes(response, "1").unwrap();
        assert_eq!(token.percentage_change_1h, None);
        assert_eq!(token.price, 42000.0);
    }

    #[test]
    fn test_quote_missing_id() {
        let response: QuotesResponse =
            serde_json::from_value(json!({ "data": { "1": listing_json(1) } })).unwrap();
        let err = token_from_quotes(response, "2").unwrap_err();
        assert!(matches!(err, GatewayError::Transform(_)));
    }

    #[test]
    fn test_missing_usd_quote() {
        let mut listing = listing_json(1);
        listing["quote"] = json!({ "EUR": listing["quote"]["USD"].clone() });
        let response: ListingsResponse =
            serde_json::from_value(json!({ "data": [listing] })).unwrap();
        assert!(tokens_from_listings(response).is_err());
    }

    #[test]
    fn test_info_collapses_platform_and_orders_by_id() {
        let response: InfoResponse = serde_json::from_value(json!({
            "data": {
                "1027": {
                    "id": 1027, "name": "Ethereum", "symbol": "ETH",
                    "date_added": "2015-08-07T00:00:00.000Z",
                    "platform": null, "is_hidden": 0
                },
                "825": {
                    "id": 825, "name": "Tether", "symbol": "USDT",
                    "category": "token",
                    "tags": ["stablecoin", "payments"],
                    "platform": { "id": 1027, "name": "Ethereum", "symbol": "ETH" },
                    "date_added": "2015-02-25T00:00:00.000Z",
                    "twitter_username": "tether_to",
                    "is_hidden": 1
                }
            }
        }))
        .unwrap();

        let infos = token_infos(response).unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].id, "825");
        assert_eq!(infos[0].platform.as_deref(), Some("Ethereum"));
        assert_eq!(
            infos[0].tags,
            Some(vec!["stablecoin".to_string(), "payments".to_string()])
        );
        assert_eq!(infos[0].is_hidden, 1);
        assert_eq!(infos[1].id, "1027");
        assert_eq!(infos[1].platform, None);
        assert_eq!(infos[1].date_added.to_rfc3339(), "2015-08-07T00:00:00+00:00");
    }

    #[test]
    fn test_bad_date_added_is_a_transform_error() {
        let response: InfoResponse = serde_json::from_value(json!({
            "data": {
                "1": { "id": 1, "name": "Bitcoin", "symbol": "BTC", "date_added": "yesterday" }
            }
        }))
        .unwrap();
        let err = token_infos(response).unwrap_err();
        assert!(err.to_string().contains("date_added"));
    }

    #[test]
    fn test_tickers_keep_upstream_timestamp() {
        let points: Vec<TickerPoint> = serde_json::from_value(json!([
            { "timestamp": "2024-01-01T00:00:00Z", "price": 42000.0, "volume_24h": 1.0e10, "market_cap": 8.0e11 }
        ]))
        .unwrap();
        let tickers = tickers(points);
        assert_eq!(tickers[0].timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(tickers[0].volume_24h, 1.0e10);
    }
}
