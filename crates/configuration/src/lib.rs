use crate::error::ConfigError;
use rust_decimal::Decimal;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    Config, FinancialsSettings, LlmSettings, MarketDataSettings, NewsSettings, PortfolioSettings,
    StorageSettings,
};

/// Loads the application configuration from the `config.toml` file.
///
/// Values can be overridden through `AUGUR__*` environment variables with `__`
/// as the level separator (e.g. `AUGUR__LLM__API_KEY`), which is how secrets
/// are expected to arrive; the file only carries placeholders for them.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from("config.toml")
}

/// Loads configuration from an explicit file path. Split out from
/// [`load_config`] so tests can point at a fixture file.
pub fn load_config_from(path: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(config::Environment::with_prefix("AUGUR").separator("__"))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

/// Rejects configurations that would make the simulation meaningless.
fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.portfolio.initial_balance <= Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "portfolio.initial_balance must be greater than 0".to_string(),
        ));
    }
    if config.news.min_count == 0 {
        return Err(ConfigError::ValidationError(
            "news.min_count must be at least 1".to_string(),
        ));
    }
    Ok(())
}
