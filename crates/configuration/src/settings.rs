use crate::error::ConfigError;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseSettings,
    pub analysis: AnalysisSettings,
    pub notifications: NotificationSettings,
    pub logging: LoggingSettings,
}

impl Config {
    /// Rejects values that would make the application misbehave rather than fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.min_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "analysis.min_rounds must be at least 1".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.notifications.telegram_token.is_some() != self.notifications.telegram_chat_id.is_some() {
            return Err(ConfigError::ValidationError(
                "notifications.telegram_token and notifications.telegram_chat_id must be set together".to_string(),
            ));
        }
        Ok(())
    }
}

/// Connection settings for the PostgreSQL store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Falls back to the `DATABASE_URL` environment variable when unset.
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

/// Parameters of the analysis orchestrator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Below this many rounds a recompute is skipped without writing anything.
    pub min_rounds: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self { min_rounds: 5 }
    }
}

/// Where the coach posts its comment after a successful recompute.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Post a message into the user's chat log.
    pub chat_enabled: bool,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            chat_enabled: true,
            telegram_token: None,
            telegram_chat_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
