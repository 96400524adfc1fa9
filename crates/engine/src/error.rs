use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to fetch history: {0}")]
    Fetch(#[source] database::DbError),

    #[error("Failed to write snapshot: {0}")]
    Write(#[source] database::DbError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),
}
