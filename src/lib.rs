pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used items
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use services::{FieldQuery, QueryResolver, RequestContext, Response, TickerQuery};
