use crate::error::LoadError;
use crate::sentiment::load_sentiment;
use crate::trades::load_trades;
use configuration::DataSettings;
use core_types::{JoinedTrade, SentimentIndex, Trade};
use tracing::{info, warn};

/// Both input tables, loaded and joined. Read-only after construction.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub joined: Vec<JoinedTrade>,
    pub stats: LoadStats,
}

/// Counters reported after a load, mostly for logging and the CLI header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub trades: usize,
    pub coerced_timestamps: usize,
    /// Timestamped trades whose day has no sentiment record.
    pub unmatched_days: usize,
    pub sentiment_days: usize,
}

/// Attaches each trade to the sentiment record of its calendar day.
///
/// This is a left join: every trade survives, with `sentiment` left empty when
/// the day is missing from the index.
pub fn join_sentiment(trades: Vec<Trade>, index: &SentimentIndex) -> Vec<JoinedTrade> {
    trades
        .into_iter()
        .map(|trade| JoinedTrade::join(trade, index))
        .collect()
}

/// Loads the trading history and the sentiment index from the configured
/// directory and joins them.
pub fn load_dataset(settings: &DataSettings) -> Result<Dataset, LoadError> {
    let table = load_trades(&settings.trades_path())?;
    let sentiment = load_sentiment(&settings.sentiment_path())?;
    if sentiment.is_empty() {
        warn!(
            file = %settings.sentiment_path().display(),
            "Sentiment file has no rows; every sentiment section will be empty"
        );
    }

    let joined = join_sentiment(table.trades, &sentiment);
    let unmatched_days = joined
        .iter()
        .filter(|j| j.trade.timestamp.is_some() && j.sentiment.is_none())
        .count();

    let stats = LoadStats {
        trades: joined.len(),
        coerced_timestamps: table.coerced_timestamps,
        unmatched_days,
        sentiment_days: sentiment.len(),
    };

    if unmatched_days > 0 {
        warn!(
            count = unmatched_days,
            "Trades on days without a sentiment record are excluded from sentiment metrics"
        );
    }
    info!(
        trades = stats.trades,
        sentiment_days = stats.sentiment_days,
        directory = %settings.directory.display(),
        "Dataset ready"
    );

    Ok(Dataset { joined, stats })
}
