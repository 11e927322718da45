use rust_decimal::Decimal;
use serde::Deserialize;

/// One row of the realtime-quote endpoint. The provider abbreviates every
/// field name to a single letter.
#[derive(Debug, Deserialize)]
pub struct RawQuote {
    #[serde(rename = "p")]
    pub price: Decimal,
    #[serde(rename = "o")]
    pub open: Decimal,
    #[serde(rename = "h")]
    pub high: Decimal,
    #[serde(rename = "l")]
    pub low: Decimal,
    #[serde(rename = "v")]
    pub volume: Decimal,
}

/// One row of the daily-kline endpoint.
#[derive(Debug, Deserialize)]
pub struct RawKline {
    #[serde(rename = "d")]
    pub date: String,
    #[serde(rename = "o")]
    pub open: Decimal,
    #[serde(rename = "h")]
    pub high: Decimal,
    #[serde(rename = "l")]
    pub low: Decimal,
    #[serde(rename = "c")]
    pub close: Decimal,
    #[serde(rename = "v")]
    pub volume: Decimal,
    /// Turnover rate; absent for suspended sessions.
    #[serde(rename = "hs", default)]
    pub turnover_rate: Option<Decimal>,
}

/// The envelope every news-feed response arrives in.
#[derive(Debug, Deserialize)]
pub struct NewsEnvelope {
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<NewsPage>,
}

#[derive(Debug, Deserialize)]
pub struct NewsPage {
    #[serde(default)]
    pub list: Vec<RawArticle>,
}

/// A raw article as served by the feed; any field may be missing.
#[derive(Debug, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(rename = "src", default)]
    pub source: Option<String>,
    #[serde(rename = "time", default)]
    pub published: Option<String>,
    #[serde(rename = "weburl", default)]
    pub url: Option<String>,
}

/// The envelope of the financial-statements provider: a field-name list plus
/// positional rows.
#[derive(Debug, Deserialize)]
pub struct FinancialsEnvelope {
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<FinancialsTable>,
}

#[derive(Debug, Deserialize)]
pub struct FinancialsTable {
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub items: Vec<Vec<serde_json::Value>>,
}
