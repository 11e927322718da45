use rust_decimal::Decimal;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub portfolio: PortfolioSettings,
    pub market_data: MarketDataSettings,
    pub news: NewsSettings,
    pub financials: FinancialsSettings,
    pub llm: LlmSettings,
    pub storage: StorageSettings,
}

/// Parameters for the simulated portfolio.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioSettings {
    /// The default starting cash balance when none is given on the command line.
    pub initial_balance: Decimal,
}

/// Endpoints and credentials for the quote/kline provider.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketDataSettings {
    /// The primary API host.
    pub base_url: String,
    /// The backup host tried once whenever a request to the primary fails.
    pub backup_url: String,
    /// The provider license token, appended to every request path.
    /// Override via `AUGUR__MARKET_DATA__LICENSE` rather than committing it.
    pub license: String,
}

/// The headline/news feed provider.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsSettings {
    pub base_url: String,
    /// Override via `AUGUR__NEWS__API_KEY`.
    pub api_key: String,
    /// The feed category requested for market news (e.g., "stocks").
    pub category: String,
    /// The minimum number of articles a daily-news fetch should yield.
    pub min_count: usize,
}

/// The financial-statements provider.
#[derive(Debug, Clone, Deserialize)]
pub struct FinancialsSettings {
    pub base_url: String,
    /// Override via `AUGUR__FINANCIALS__TOKEN`.
    pub token: String,
}

/// The chat-completions service used for analysis.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Override via `AUGUR__LLM__API_KEY`.
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Where analysis results and fetched news are persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Path of the SQLite database file, created on first use.
    pub db_path: String,
}
