use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Failed to build or send the HTTP request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The provider returned an error: {0}")]
    Api(String),

    #[error("Failed to deserialize the provider response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from provider: {0}")]
    InvalidData(String),
}
