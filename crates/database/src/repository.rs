use crate::error::DbError;
use chrono::{DateTime, Utc};
use core_types::{NewsArticle, StockAnalysis, StockProfile};
use rust_decimal::Decimal;
use sqlx::FromRow;
use sqlx::sqlite::SqlitePool;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: SqlitePool,
}

/// A stored per-security analysis row, as read back for the history view.
#[derive(Debug, Clone, FromRow)]
pub struct StoredAnalysis {
    pub id: i64,
    pub stock_code: String,
    pub stock_name: Option<String>,
    pub analysis_data: Option<String>,
    pub trading_advice: Option<String>,
    pub timestamp: Option<String>,
    pub status: Option<String>,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persists one per-security analysis, advice serialized as JSON.
    pub async fn save_stock_analysis(
        &self,
        analysis: &StockAnalysis,
        stock_name: &str,
    ) -> Result<(), DbError> {
        let advice_json = serde_json::to_string(&analysis.advice)?;

        sqlx::query(
            "INSERT OR REPLACE INTO stock_analysis
                (stock_code, stock_name, analysis_data, trading_advice, timestamp, status)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&analysis.code)
        .bind(stock_name)
        .bind(&analysis.narrative)
        .bind(advice_json)
        .bind(analysis.timestamp.to_rfc3339())
        .bind("success")
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Persists the narrative of a market scan together with the cash figure
    /// it was constrained by.
    pub async fn save_market_analysis(
        &self,
        narrative: &str,
        available_cash: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO market_analysis (analysis_data, available_cash, timestamp)
             VALUES (?, ?, ?)",
        )
        .bind(narrative)
        .bind(available_cash.to_string())
        .bind(timestamp.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Persists a batch of articles; `stock_code` is `None` for the daily
    /// market feed.
    pub async fn save_news(
        &self,
        articles: &[NewsArticle],
        stock_code: Option<&str>,
    ) -> Result<(), DbError> {
        let fetch_time = Utc::now().to_rfc3339();
        for article in articles {
            sqlx::query(
                "INSERT INTO news_data
                    (stock_code, title, content, source, news_time, fetch_time, url)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(stock_code)
            .bind(&article.title)
            .bind(&article.content)
            .bind(&article.source)
            .bind(&article.published)
            .bind(&fetch_time)
            .bind(&article.url)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Upserts a company profile.
    pub async fn save_stock_profile(&self, profile: &StockProfile) -> Result<(), DbError> {
        sqlx::query(
            "INSERT OR REPLACE INTO stock_info
                (stock_code, stock_name, industry, main_business, update_time)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&profile.code)
        .bind(&profile.name)
        .bind(&profile.industry)
        .bind(&profile.main_business)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The most recent stored analyses, optionally filtered to one security,
    /// newest first.
    pub async fn recent_analyses(
        &self,
        stock_code: Option<&str>,
        limit: i64,
    ) -> Result<Vec<StoredAnalysis>, DbError> {
        let rows = match stock_code {
            Some(code) => {
                sqlx::query_as::<_, StoredAnalysis>(
                    "SELECT id, stock_code, stock_name, analysis_data, trading_advice, timestamp, status
                     FROM stock_analysis WHERE stock_code = ?
                     ORDER BY timestamp DESC LIMIT ?",
                )
                .bind(code)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, StoredAnalysis>(
                    "SELECT id, stock_code, stock_name, analysis_data, trading_advice, timestamp, status
                     FROM stock_analysis
                     ORDER BY timestamp DESC LIMIT ?",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{connect, init_schema};
    use core_types::TradingAdvice;
    use rust_decimal_macros::dec;

    async fn repository() -> DbRepository {
        let pool = connect(":memory:").await.unwrap();
        init_schema(&pool).await.unwrap();
        DbRepository::new(pool)
    }

    fn analysis(code: &str) -> StockAnalysis {
        StockAnalysis {
            code: code.to_string(),
            narrative: "Fundamentals look stable.".to_string(),
            advice: TradingAdvice {
                price: Some(dec!(10.50)),
                quantity: Some(500),
                ..TradingAdvice::default()
            },
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn analysis_roundtrip() {
        let repo = repository().await;
        repo.save_stock_analysis(&analysis("000001"), "Ping An Bank")
            .await
            .unwrap();

        let rows = repo.recent_analyses(Some("000001"), 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].stock_code, "000001");
        assert_eq!(rows[0].stock_name.as_deref(), Some("Ping An Bank"));

        // The advice column is valid JSON that deserializes back.
        let advice: TradingAdvice =
            serde_json::from_str(rows[0].trading_advice.as_deref().unwrap()).unwrap();
        assert_eq!(advice.price, Some(dec!(10.50)));
    }

    #[tokio::test]
    async fn history_filter_respects_the_code() {
        let repo = repository().await;
        repo.save_stock_analysis(&analysis("000001"), "Ping An Bank")
            .await
            .unwrap();
        repo.save_stock_analysis(&analysis("600000"), "SPD Bank")
            .await
            .unwrap();

        assert_eq!(repo.recent_analyses(Some("600000"), 10).await.unwrap().len(), 1);
        assert_eq!(repo.recent_analyses(None, 10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn schema_init_is_idempotent() {
        let pool = connect(":memory:").await.unwrap();
        init_schema(&pool).await.unwrap();
        init_schema(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn news_and_profile_writes_succeed() {
        let repo = repository().await;
        repo.save_news(
            &[NewsArticle {
                title: "A headline".to_string(),
                content: "A body".to_string(),
                source: "wire".to_string(),
                published: "2025-06-01".to_string(),
                url: String::new(),
            }],
            None,
        )
        .await
        .unwrap();

        repo.save_stock_profile(&StockProfile {
            code: "000001".to_string(),
            name: "Ping An Bank".to_string(),
            industry: "Banking".to_string(),
            main_business: "Commercial banking".to_string(),
        })
        .await
        .unwrap();

        repo.save_market_analysis("Market looks mixed.", dec!(84000), Utc::now())
            .await
            .unwrap();
    }
}
