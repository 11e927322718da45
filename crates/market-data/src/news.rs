use crate::error::MarketDataError;
use crate::responses::NewsEnvelope;
use configuration::NewsSettings;
use core_types::NewsArticle;
use std::time::Duration;

/// How many articles a per-security query returns at most.
const STOCK_NEWS_LIMIT: usize = 10;

/// A client for the headline-feed API.
#[derive(Clone)]
pub struct NewsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    category: String,
}

impl NewsClient {
    pub fn new(settings: &NewsSettings) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build reqwest client"),
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            category: settings.category.clone(),
        }
    }

    /// Fetches the day's market news. At least 40 articles are requested so
    /// that dropping malformed entries still leaves `min_count`; coming up
    /// short is logged, not treated as an error.
    pub async fn daily_news(&self, min_count: usize) -> Result<Vec<NewsArticle>, MarketDataError> {
        let requested = min_count.max(40).to_string();
        let url = format!("{}/api/toutiao/v1/index", self.base_url);

        let envelope: NewsEnvelope = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("type", self.category.as_str()),
                ("num", requested.as_str()),
                ("start", "0"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if envelope.code != 1 {
            return Err(MarketDataError::Api(
                envelope.msg.unwrap_or_else(|| "unspecified feed error".to_string()),
            ));
        }

        let mut articles: Vec<NewsArticle> = envelope
            .data
            .map(|page| page.list)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|raw| {
                // An article without both a title and a body is useless as
                // analysis context.
                let title = raw.title.filter(|t| !t.is_empty())?;
                let content = raw.content.filter(|c| !c.is_empty())?;
                Some(NewsArticle {
                    title,
                    content,
                    source: raw.source.unwrap_or_default(),
                    published: raw.published.unwrap_or_default(),
                    url: raw.url.unwrap_or_default(),
                })
            })
            .collect();

        if articles.len() < min_count {
            tracing::warn!(
                got = articles.len(),
                wanted = min_count,
                "Daily news feed returned fewer articles than requested"
            );
        }
        articles.truncate(min_count);

        Ok(articles)
    }

    /// Fetches news mentioning one security, by filtering the daily feed for
    /// the security's code or name.
    pub async fn stock_news(
        &self,
        code: &str,
        name: &str,
    ) -> Result<Vec<NewsArticle>, MarketDataError> {
        let feed = self.daily_news(40).await?;
        Ok(filter_for_stock(feed, code, name))
    }
}

/// Keeps the articles that mention the security by code or by name, capped at
/// `STOCK_NEWS_LIMIT`.
pub fn filter_for_stock(articles: Vec<NewsArticle>, code: &str, name: &str) -> Vec<NewsArticle> {
    articles
        .into_iter()
        .filter(|article| {
            let mentions = |text: &str| {
                text.contains(code) || (!name.is_empty() && text.contains(name))
            };
            mentions(&article.title) || mentions(&article.content)
        })
        .take(STOCK_NEWS_LIMIT)
        .collect()
}
