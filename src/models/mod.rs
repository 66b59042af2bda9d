pub mod cache;
pub mod timestamp;
pub mod token;

pub use cache::{CacheStats, CacheStore};
pub use token::{CachedValue, Ticker, Token, TokenInfo};
