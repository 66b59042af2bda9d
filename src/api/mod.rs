pub mod coinmarketcap;
pub mod coinpaprika;
pub mod upstream;

pub use coinmarketcap::ListingsApi;
pub use coinpaprika::TickerApi;
pub use upstream::{HttpConfig, UpstreamClient};
