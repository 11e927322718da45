use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Failed to build or send the HTTP request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The model API returned an error: {0}")]
    Api(String),

    #[error("The model returned an empty response")]
    EmptyResponse,

    #[error("No security codes could be parsed from the model's recommendations")]
    NoRecommendations,

    #[error("Could not fetch details for any recommended security")]
    NoCandidateDetails,

    #[error("Market data error: {0}")]
    MarketData(#[from] market_data::MarketDataError),
}
