//! # Augur Advisor Crate
//!
//! Turns market context into trading advice by way of a large language model.
//! It owns the chat-completions client, the prompts, and the parser that
//! recovers structured advice from the model's prose.
//!
//! ## Architectural Principles
//!
//! - **Parsing is a component, not a side effect.** The model client returns
//!   text; `parser` turns text into a `TradingAdvice` with an explicit
//!   "no match" per field. The two are coupled only through the prompt's
//!   advice-block contract, so either can be swapped independently.
//! - **The executor never sees this crate's internals.** Downstream code
//!   depends on the `InstructionSource` trait and the core-types advice
//!   struct, nothing else.

use crate::client::ChatClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use configuration::LlmSettings;
use core_types::{AnalysisContext, FinancialSnapshot, NewsArticle, StockAnalysis};
use market_data::{FinancialsClient, MaiRuiClient, NewsClient};
use rust_decimal::Decimal;

pub mod client;
pub mod error;
pub mod parser;
pub mod prompt;

// Re-export the key components to provide a clean, public-facing API.
pub use error::AdvisorError;

/// How many articles feed the stage-one recommendation prompt.
const SCAN_NEWS_IN_PROMPT: usize = 10;

/// The result of a news-driven market scan.
#[derive(Debug, Clone)]
pub struct MarketScan {
    pub narrative: String,
    /// The security codes the model put forward in stage one.
    pub recommended: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// The abstract source of trading instructions the rest of the system
/// consumes. The context is assembled by the caller; how an implementation
/// turns it into advice is its own business.
#[async_trait]
pub trait InstructionSource: Send + Sync {
    async fn analyze_position(&self, ctx: &AnalysisContext) -> Result<StockAnalysis, AdvisorError>;
}

/// The production `InstructionSource`: prompt, model round-trip, parse.
pub struct LlmAdvisor {
    chat: ChatClient,
}

impl LlmAdvisor {
    pub fn new(settings: &LlmSettings) -> Self {
        Self {
            chat: ChatClient::new(settings),
        }
    }

    /// Runs the two-stage market scan.
    ///
    /// Stage one asks the model for securities worth watching given the day's
    /// news and extracts their codes. Stage two fetches details for each code
    /// concurrently and asks for a deep analysis constrained by the available
    /// cash.
    pub async fn scan_market(
        &self,
        news: &[NewsArticle],
        available_cash: Decimal,
        quotes: &MaiRuiClient,
        news_client: &NewsClient,
        financials: &FinancialsClient,
    ) -> Result<MarketScan, AdvisorError> {
        let recommendation_prompt = prompt::market_recommendation(news, SCAN_NEWS_IN_PROMPT);
        let response = self
            .chat
            .complete(prompt::RECOMMEND_SYSTEM, &recommendation_prompt)
            .await?;

        let recommended = parser::extract_security_codes(&response);
        if recommended.is_empty() {
            return Err(AdvisorError::NoRecommendations);
        }
        tracing::info!(codes = ?recommended, "Model recommended securities, fetching details");

        let fetches = recommended
            .iter()
            .map(|code| candidate_details(code, quotes, news_client, financials));
        let candidates: Vec<AnalysisContext> = futures::future::join_all(fetches)
            .await
            .into_iter()
            .flatten()
            .collect();
        if candidates.is_empty() {
            return Err(AdvisorError::NoCandidateDetails);
        }

        let deep_prompt = prompt::deep_analysis(&candidates, available_cash);
        let narrative = self
            .chat
            .complete(prompt::DEEP_ANALYSIS_SYSTEM, &deep_prompt)
            .await?;

        Ok(MarketScan {
            narrative,
            recommended,
            timestamp: Utc::now(),
        })
    }
}

#[async_trait]
impl InstructionSource for LlmAdvisor {
    async fn analyze_position(&self, ctx: &AnalysisContext) -> Result<StockAnalysis, AdvisorError> {
        let user_prompt = prompt::position_analysis(ctx);
        let narrative = self
            .chat
            .complete(prompt::POSITION_SYSTEM, &user_prompt)
            .await?;

        let advice = parser::parse_trading_advice(&narrative);
        if advice.is_empty() {
            tracing::warn!(
                code = %ctx.profile.code,
                "Model response contained no parseable advice block"
            );
        }

        Ok(StockAnalysis {
            code: ctx.profile.code.clone(),
            narrative,
            advice,
            timestamp: Utc::now(),
        })
    }
}

/// Gathers the stage-two details for one recommended code. Missing financials
/// or news degrade to empty context; a failed indicator fetch disqualifies
/// the candidate, because the deep-analysis prompt reasons from indicators
/// instead of prices.
async fn candidate_details(
    code: &str,
    quotes: &MaiRuiClient,
    news_client: &NewsClient,
    financials: &FinancialsClient,
) -> Option<AnalysisContext> {
    let profile = quotes.profile(code);

    let technicals = match quotes.technical_summary(code).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::warn!(code, error = %e, "Skipping candidate without kline history");
            return None;
        }
    };

    let snapshot = match financials.financial_snapshot(code).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!(code, error = %e, "Proceeding without financials for candidate");
            FinancialSnapshot::default()
        }
    };

    let news = match news_client.stock_news(code, &profile.name).await {
        Ok(articles) => articles,
        Err(e) => {
            tracing::warn!(code, error = %e, "Proceeding without news for candidate");
            Vec::new()
        }
    };

    Some(AnalysisContext {
        profile,
        news,
        financials: snapshot,
        technicals,
        held: None,
    })
}
