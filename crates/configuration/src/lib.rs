// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use error::ConfigError;
pub use settings::{AnalysisSettings, Config, DatabaseSettings, LoggingSettings, NotificationSettings};

/// Environment variables with this prefix override file values, e.g.
/// `CASHOUT_ANALYSIS__MIN_ROUNDS=10`.
pub const ENV_PREFIX: &str = "CASHOUT";

/// Loads the application configuration from `config.toml` in the working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from("config.toml")
}

/// Loads and validates the configuration from `path`.
///
/// A missing file is not an error; every section has defaults.
pub fn load_config_from(path: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}
