//! # Augur Executor Crate
//!
//! This crate provides the trading core: the portfolio ledger and the trade
//! executor that applies model-issued advice to it.
//!
//! ## Architectural Principles
//!
//! - **State vs. logic decoupling:** `Portfolio` is a passive state holder
//!   (cash, weighted-average-cost positions, and an append-only trade history)
//!   mutated only through its own atomic operations. `TradeExecutor` owns the
//!   decision of *whether* a trade happens (validation, quote resolution,
//!   price-crossing rules) but delegates every mutation to the ledger.
//! - **Rejections are values:** insufficient funds, insufficient position,
//!   an uncrossed limit, or a missing quote all come back as typed errors the
//!   caller can inspect. Nothing in this crate panics on ordinary rejection,
//!   and a rejected operation leaves the ledger byte-for-byte unchanged.
//!
//! ## Public API
//!
//! - `Portfolio`: the in-memory cash/position/history ledger.
//! - `TradeExecutor`: validation, price-crossing, and pending-order keeping.
//! - `Outcome`: what happened to an accepted piece of advice.
//! - `ExecutorError` / `LedgerError`: the typed rejection taxonomy.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod portfolio;

// Re-export the key components to provide a clean, public-facing API.
pub use engine::{Outcome, TradeExecutor};
pub use error::{ExecutorError, LedgerError};
pub use portfolio::Portfolio;
