use core_types::TradeFilter;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataSettings,
    pub analysis: AnalysisSettings,
    pub logging: LoggingSettings,
    /// The selection applied when no filter flags are given on the command line.
    #[serde(default)]
    pub filters: TradeFilter,
}

/// Where the two input tables live.
#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    /// Working directory that holds both CSV files.
    pub directory: PathBuf,
    /// Trading history export, `DD-MM-YYYY HH:MM` timestamps.
    pub trades_file: String,
    /// Daily Fear & Greed index, `YYYY-MM-DD` dates.
    pub sentiment_file: String,
}

impl DataSettings {
    pub fn trades_path(&self) -> PathBuf {
        self.directory.join(&self.trades_file)
    }

    pub fn sentiment_path(&self) -> PathBuf {
        self.directory.join(&self.sentiment_file)
    }
}

/// Knobs for the metrics engine.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    /// How many gain days and loss days `top_events` reports.
    pub top_events: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Default `tracing` filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}
