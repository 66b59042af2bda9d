pub mod query;
pub mod resolver;
pub mod transform;

pub use query::{FieldError, FieldQuery, QueryParseError, RequestContext, Response};
pub use resolver::{QueryResolver, TickerQuery, DEFAULT_TICKERS_LIMIT, DEFAULT_TOKENS_LIMIT};
