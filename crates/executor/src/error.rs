use core_types::TradeSide;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Not enough cash available to execute trade. Required: {required}, Available: {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    #[error("Not enough shares of {code} to sell. Requested: {requested}, Held: {held}")]
    InsufficientPosition {
        code: String,
        requested: u64,
        held: u64,
    },
}

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Trading advice is missing required field: {0}")]
    InvalidInstruction(&'static str),

    #[error("No market price available for {code}: {reason}")]
    PriceUnavailable { code: String, reason: String },

    #[error("{side:?} limit {limit} does not cross the market price {market}")]
    RejectedByPrice {
        side: TradeSide,
        limit: Decimal,
        market: Decimal,
    },

    #[error("Ledger rejected the trade: {0}")]
    Ledger(#[from] LedgerError),
}
