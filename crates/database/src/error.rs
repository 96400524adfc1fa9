use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Database query failed: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("An error occurred during JSON serialization/deserialization: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Stored record is invalid: {0}")]
    CorruptRecord(String),
}

impl From<core_types::CoreError> for DbError {
    fn from(e: core_types::CoreError) -> Self {
        DbError::CorruptRecord(e.to_string())
    }
}

impl From<analytics::AnalyticsError> for DbError {
    fn from(e: analytics::AnalyticsError) -> Self {
        DbError::CorruptRecord(e.to_string())
    }
}
