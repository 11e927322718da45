use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Failed to serialize value for storage: {0}")]
    Serialization(#[from] serde_json::Error),
}
