use crate::error::MarketDataError;
use crate::responses::{RawKline, RawQuote};
use async_trait::async_trait;
use configuration::MarketDataSettings;
use core_types::{KlineBar, Quote, StockProfile, TechnicalSummary};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// The kline period requested for technical summaries: daily bars,
/// forward-adjusted for splits and dividends.
const DAILY_ADJUSTED: &str = "dq";

/// The generic, abstract interface for resolving a security's current price.
///
/// This trait is the contract the trade executor depends on, allowing the
/// underlying implementation (live provider or test double) to be swapped out.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Returns the latest traded price for a security. Any failure (transport,
    /// provider error, or a quote without a usable price) is an error; the
    /// caller treats all of them as "price unavailable".
    async fn latest_price(&self, code: &str) -> Result<Decimal, MarketDataError>;
}

/// A client for the MaiRui-style quote API, where the license token is part
/// of the request path and a backup host mirrors the primary.
#[derive(Clone)]
pub struct MaiRuiClient {
    client: reqwest::Client,
    base_url: String,
    backup_url: String,
    license: String,
}

impl MaiRuiClient {
    pub fn new(settings: &MarketDataSettings) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build reqwest client"),
            base_url: settings.base_url.clone(),
            backup_url: settings.backup_url.clone(),
            license: settings.license.clone(),
        }
    }

    /// Performs a GET against `{host}/{endpoint}/{license}`, failing over to
    /// the backup host once if the primary request errors at any stage.
    async fn request<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, MarketDataError> {
        let primary = format!("{}/{}/{}", self.base_url, endpoint, self.license);
        match self.fetch::<T>(&primary).await {
            Ok(value) => Ok(value),
            Err(primary_err) => {
                tracing::warn!(
                    error = %primary_err,
                    endpoint,
                    "Primary market-data request failed, retrying against the backup host"
                );
                let backup = format!("{}/{}/{}", self.backup_url, endpoint, self.license);
                self.fetch::<T>(&backup).await
            }
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, MarketDataError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let text = response.text().await?;
        serde_json::from_str::<T>(&text).map_err(|e| MarketDataError::Deserialization(e.to_string()))
    }

    /// Fetches the realtime quote for one security. The endpoint returns a
    /// list; only the first row is meaningful.
    pub async fn realtime_quote(&self, code: &str) -> Result<Quote, MarketDataError> {
        let rows: Vec<RawQuote> = self.request(&format!("hsrl/ssjy/{code}")).await?;
        let raw = rows.into_iter().next().ok_or_else(|| {
            MarketDataError::InvalidData(format!("empty realtime quote for {code}"))
        })?;

        Ok(Quote {
            price: raw.price,
            open: raw.open,
            high: raw.high,
            low: raw.low,
            volume: raw.volume,
        })
    }

    /// Fetches the daily kline history for one security, oldest bar first.
    pub async fn daily_klines(&self, code: &str) -> Result<Vec<KlineBar>, MarketDataError> {
        let rows: Vec<RawKline> = self
            .request(&format!("hszbl/fsjy/{code}/{DAILY_ADJUSTED}"))
            .await?;

        Ok(rows
            .into_iter()
            .map(|raw| KlineBar {
                date: raw.date,
                open: raw.open,
                high: raw.high,
                low: raw.low,
                close: raw.close,
                volume: raw.volume,
                turnover_rate: raw.turnover_rate,
            })
            .collect())
    }

    /// Computes the moving-average summary the advisor prompt wants from the
    /// most recent kline history.
    pub async fn technical_summary(
        &self,
        code: &str,
    ) -> Result<Option<TechnicalSummary>, MarketDataError> {
        let bars = self.daily_klines(code).await?;
        Ok(summarize(&bars))
    }

    /// Returns basic company information for a security.
    ///
    /// The provider plan behind this client has no profile endpoint, so known
    /// codes come from a built-in table and everything else gets an explicit
    /// placeholder profile. Callers can always distinguish the placeholder by
    /// its "unknown" industry.
    pub fn profile(&self, code: &str) -> StockProfile {
        let known: &[(&str, &str, &str, &str)] = &[
            (
                "000001",
                "Ping An Bank",
                "Banking",
                "Commercial banking: corporate, retail, and financial-market services",
            ),
            (
                "600000",
                "SPD Bank",
                "Banking",
                "Commercial banking: corporate finance, retail finance, and financial markets",
            ),
            (
                "600626",
                "Shenda Co.",
                "Real estate",
                "Real-estate development and property management",
            ),
            (
                "003032",
                "Itcast Education",
                "Education",
                "Vocational IT training and online education services",
            ),
        ];

        match known.iter().find(|(c, _, _, _)| *c == code) {
            Some((code, name, industry, business)) => StockProfile {
                code: (*code).to_string(),
                name: (*name).to_string(),
                industry: (*industry).to_string(),
                main_business: (*business).to_string(),
            },
            None => {
                tracing::warn!(code, "No profile on record for security, using placeholder");
                StockProfile {
                    code: code.to_string(),
                    name: format!("Unlisted security {code}"),
                    industry: "unknown".to_string(),
                    main_business: "no description available".to_string(),
                }
            }
        }
    }
}

#[async_trait]
impl QuoteSource for MaiRuiClient {
    async fn latest_price(&self, code: &str) -> Result<Decimal, MarketDataError> {
        let quote = self.realtime_quote(code).await?;
        if quote.price <= Decimal::ZERO {
            return Err(MarketDataError::InvalidData(format!(
                "non-positive price {} for {code}",
                quote.price
            )));
        }
        Ok(quote.price)
    }
}

/// Simple moving average over the last `period` closes; `None` when the
/// history is shorter than the period.
pub fn moving_average(bars: &[KlineBar], period: usize) -> Option<Decimal> {
    if bars.len() < period || period == 0 {
        return None;
    }
    let sum: Decimal = bars[bars.len() - period..].iter().map(|b| b.close).sum();
    Some(sum / Decimal::from(period as u64))
}

/// Derives the `TechnicalSummary` from kline history; `None` when there is no
/// history at all.
pub fn summarize(bars: &[KlineBar]) -> Option<TechnicalSummary> {
    let latest = bars.last()?;
    Some(TechnicalSummary {
        ma5: moving_average(bars, 5),
        ma10: moving_average(bars, 10),
        ma20: moving_average(bars, 20),
        volume: latest.volume,
        turnover_rate: latest.turnover_rate,
    })
}
