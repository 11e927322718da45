//! # Augur Market-Data Crate
//!
//! HTTP clients for the three external data providers the application
//! consumes: realtime quotes and kline history (with primary/backup host
//! failover), the daily headline feed, and the financial-statements API.
//!
//! The one interface the trading core depends on is [`QuoteSource`]; the rest
//! of this crate only feeds the advisor's analysis context.

pub mod error;
pub mod financials;
pub mod news;
pub mod quotes;
pub mod responses;

// Re-export the key components to provide a clean, public-facing API.
pub use error::MarketDataError;
pub use financials::FinancialsClient;
pub use news::NewsClient;
pub use quotes::{MaiRuiClient, QuoteSource};
