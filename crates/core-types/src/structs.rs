use crate::enums::{AdviceAction, RiskLevel, TradeSide};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A holding of a single security at a quantity-weighted average cost.
///
/// A position only exists while its quantity is positive; reducing a position
/// to zero removes it from the ledger rather than retaining a zero row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub code: String,
    pub quantity: u64,
    pub average_cost: Decimal,
    pub last_update: DateTime<Utc>,
}

/// An immutable record of one successful ledger mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub action: TradeSide,
    pub code: String,
    pub price: Decimal,
    pub quantity: u64,
    pub timestamp: DateTime<Utc>,
}

/// Structured trading advice parsed out of a model's free-text analysis.
///
/// Every field is independently optional because every field is extracted
/// independently from prose: a missing label is a missing field, never a
/// defaulted one. The executor decides which fields it requires.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingAdvice {
    pub action: Option<AdviceAction>,
    /// The price the model is willing to trade at; a limit, not a fill price.
    pub price: Option<Decimal>,
    pub quantity: Option<u64>,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    /// Suggested holding period in trading days.
    pub holding_period: Option<u32>,
    pub risk_level: Option<RiskLevel>,
}

impl TradingAdvice {
    /// True when no field at all was extracted from the text.
    pub fn is_empty(&self) -> bool {
        *self == TradingAdvice::default()
    }
}

/// A realtime quote snapshot as served by the market-data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: Decimal,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub volume: Decimal,
}

/// One daily bar of a security's trading history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KlineBar {
    pub date: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    /// Turnover rate in percent, when the provider reports it.
    pub turnover_rate: Option<Decimal>,
}

/// Moving-average summary derived from recent kline history.
///
/// Each average is absent when there were fewer bars than its period; an
/// average over a partial window would be misleading rather than approximate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSummary {
    pub ma5: Option<Decimal>,
    pub ma10: Option<Decimal>,
    pub ma20: Option<Decimal>,
    pub volume: Decimal,
    pub turnover_rate: Option<Decimal>,
}

/// Basic company information for one security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockProfile {
    pub code: String,
    pub name: String,
    pub industry: String,
    pub main_business: String,
}

/// A single news article, from either the daily feed or a per-security query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub content: String,
    pub source: String,
    pub published: String,
    pub url: String,
}

/// Headline financial figures for one security. Providers routinely omit
/// fields, so every figure is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub revenue: Option<Decimal>,
    pub net_profit: Option<Decimal>,
    pub gross_margin: Option<Decimal>,
    pub roe: Option<Decimal>,
    pub debt_ratio: Option<Decimal>,
    pub current_ratio: Option<Decimal>,
}

impl FinancialSnapshot {
    /// True when the provider returned no usable figures at all.
    pub fn is_empty(&self) -> bool {
        *self == FinancialSnapshot::default()
    }
}

/// Everything the advisor is given about one security before it is asked
/// for an opinion. Assembled by the caller; opaque to the executor.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub profile: StockProfile,
    pub news: Vec<NewsArticle>,
    pub financials: FinancialSnapshot,
    pub technicals: Option<TechnicalSummary>,
    /// The caller's existing position in this security, if any.
    pub held: Option<Position>,
}

/// The advisor's verdict on one security: the full narrative plus whatever
/// structured advice could be parsed out of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub code: String,
    pub narrative: String,
    pub advice: TradingAdvice,
    pub timestamp: DateTime<Utc>,
}
