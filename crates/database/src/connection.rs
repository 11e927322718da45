use crate::error::DbError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Opens (creating if needed) the SQLite database at `db_path`.
pub async fn connect(db_path: &str) -> Result<SqlitePool, DbError> {
    let options = if db_path == ":memory:" {
        SqliteConnectOptions::from_str("sqlite::memory:")?
    } else {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DbError::Sqlx(sqlx::Error::Io(e)))?;
            }
        }
        SqliteConnectOptions::from_str(&format!("sqlite://{db_path}"))?.create_if_missing(true)
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Creates the schema if it does not exist yet. Safe to run on every start.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), DbError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS stock_analysis (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            stock_code TEXT NOT NULL,
            stock_name TEXT,
            analysis_data TEXT,
            trading_advice TEXT,
            timestamp TEXT,
            status TEXT,
            UNIQUE(stock_code, timestamp)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS market_analysis (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            analysis_data TEXT,
            available_cash TEXT,
            timestamp TEXT
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS news_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            stock_code TEXT,
            title TEXT,
            content TEXT,
            source TEXT,
            news_time TEXT,
            fetch_time TEXT,
            url TEXT
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS stock_info (
            stock_code TEXT PRIMARY KEY,
            stock_name TEXT,
            industry TEXT,
            main_business TEXT,
            update_time TEXT
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}
