//! # Augur Database Crate
//!
//! SQLite persistence for analysis results, market scans, fetched news, and
//! company profiles. Nothing in the trading core depends on this crate; it
//! exists so past model output can be inspected after the fact.

pub mod connection;
pub mod error;
pub mod repository;

// Re-export the core types to provide a clean public API.
pub use connection::{connect, init_schema};
pub use error::DbError;
pub use repository::{DbRepository, StoredAnalysis};
