use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{AnalysisSettings, Config, DataSettings, LoggingSettings};

/// Prefix for environment overrides, e.g. `MOODLENS__DATA__DIRECTORY=/srv/data`.
pub const ENV_PREFIX: &str = "MOODLENS";

/// Loads the application configuration.
///
/// Sources are layered: built-in defaults, then the TOML file at `path`, then
/// `MOODLENS__*` environment variables. The file is optional unless `required`
/// is set, so the tool runs out of the box in a directory holding the two CSVs.
pub fn load_config(path: &Path, required: bool) -> Result<Config, ConfigError> {
    tracing::debug!(path = %path.display(), required, "Loading configuration");
    assemble(config::File::from(path).required(required))
}

fn assemble<S>(file: S) -> Result<Config, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let builder = config::Config::builder()
        .set_default("data.directory", ".")?
        .set_default("data.trades_file", "historical_data.csv")?
        .set_default("data.sentiment_file", "fear_greed_index.csv")?
        .set_default("analysis.top_events", 3_i64)?
        .set_default("logging.level", "info")?
        .add_source(file)
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.data.trades_file.trim().is_empty() {
        return Err(ConfigError::ValidationError("data.trades_file must not be empty".to_string()));
    }
    if config.data.sentiment_file.trim().is_empty() {
        return Err(ConfigError::ValidationError("data.sentiment_file must not be empty".to_string()));
    }
    if config.analysis.top_events == 0 {
        return Err(ConfigError::ValidationError("analysis.top_events must be at least 1".to_string()));
    }
    config
        .filters
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("filters: {e}")))?;
    Ok(())
}
