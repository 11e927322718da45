pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{AdviceAction, RiskLevel, TradeSide};
pub use error::CoreError;
pub use structs::{
    AnalysisContext, FinancialSnapshot, KlineBar, NewsArticle, Position, Quote, StockAnalysis,
    StockProfile, TechnicalSummary, TradeRecord, TradingAdvice,
};
