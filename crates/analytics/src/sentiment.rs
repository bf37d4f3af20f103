//! Trading performance split by the market mood of the trade day.
//!
//! Only joined trades that found a sentiment record take part; the rest are
//! silently left out of every function here.

use crate::buckets::BucketStats;
use crate::error::AnalyticsError;
use crate::metrics::{checked_sum, ratio, sample_std_dev};
use core_types::{JoinedTrade, Trade, TradeSide};
use rust_decimal::Decimal;
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::BTreeMap;
use tracing::debug;

/// Fear & Greed classifications from most fearful to most greedy.
pub const MOOD_SCALE: [&str; 5] = ["Extreme Fear", "Fear", "Neutral", "Greed", "Extreme Greed"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodStats {
    pub classification: String,
    pub trade_count: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: Decimal,
    pub average_pnl: Decimal,
    pub total_pnl: Decimal,
    /// PnL volatility within the mood; `None` for a single trade.
    pub pnl_std_dev: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodSideStats {
    pub classification: String,
    pub side: TradeSide,
    #[serde(flatten)]
    pub stats: BucketStats,
}

/// One point of the index-value vs PnL scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentValueStats {
    pub value: Decimal,
    pub classification: String,
    pub trade_count: usize,
    pub average_pnl: Decimal,
    pub total_pnl: Decimal,
}

/// Sort key placing known moods on the scale and anything else after it.
fn mood_rank(classification: &str) -> (usize, String) {
    let position = MOOD_SCALE
        .iter()
        .position(|mood| mood.eq_ignore_ascii_case(classification))
        .unwrap_or(MOOD_SCALE.len());
    (position, classification.to_string())
}

fn with_sentiment<T: Borrow<JoinedTrade>>(joined: &[T]) -> impl Iterator<Item = (&str, &Trade)> {
    joined.iter().filter_map(|item| {
        let j: &JoinedTrade = item.borrow();
        j.classification().map(|mood| (mood, &j.trade))
    })
}

fn no_sentiment() -> AnalyticsError {
    AnalyticsError::NotEnoughData("no trade in the selection falls on a day with sentiment data".to_string())
}

pub fn correlate_with_sentiment<T: Borrow<JoinedTrade>>(joined: &[T]) -> Result<Vec<MoodStats>, AnalyticsError> {
    let mut groups: BTreeMap<(usize, String), Vec<&Trade>> = BTreeMap::new();
    for (mood, trade) in with_sentiment(joined) {
        groups.entry(mood_rank(mood)).or_default().push(trade);
    }

    if groups.is_empty() {
        return Err(no_sentiment());
    }
    debug!(moods = groups.len(), "Grouped trades by sentiment.");

    groups
        .into_iter()
        .map(|((_, classification), group)| {
            let trade_count = group.len();
            let winning_trades = group.iter().filter(|t| t.is_win()).count();
            let losing_trades = group.iter().filter(|t| t.is_loss()).count();
            let pnls: Vec<Decimal> = group.iter().map(|t| t.pnl).collect();
            let total_pnl = checked_sum(pnls.iter().copied())?;

            Ok(MoodStats {
                classification,
                trade_count,
                winning_trades,
                losing_trades,
                win_rate: ratio(winning_trades, trade_count),
                average_pnl: total_pnl / Decimal::from(trade_count),
                total_pnl,
                pnl_std_dev: sample_std_dev(&pnls)?,
            })
        })
        .collect()
}

/// The classification with the highest mean PnL. Ties keep the more fearful mood.
pub fn most_profitable_mood(stats: &[MoodStats]) -> Option<&MoodStats> {
    stats.iter().fold(None, |best: Option<&MoodStats>, s| match best {
        Some(current) if current.average_pnl >= s.average_pnl => Some(current),
        _ => Some(s),
    })
}

/// Long vs short performance inside each mood.
pub fn side_by_sentiment<T: Borrow<JoinedTrade>>(joined: &[T]) -> Result<Vec<MoodSideStats>, AnalyticsError> {
    let mut groups: BTreeMap<((usize, String), TradeSide), Vec<&Trade>> = BTreeMap::new();
    for (mood, trade) in with_sentiment(joined) {
        groups.entry((mood_rank(mood), trade.side)).or_default().push(trade);
    }

    if groups.is_empty() {
        return Err(no_sentiment());
    }

    groups
        .into_iter()
        .map(|(((_, classification), side), group)| {
            Ok(MoodSideStats {
                classification,
                side,
                stats: BucketStats::from_trades(&group)?,
            })
        })
        .collect()
}

/// PnL per distinct index value, lowest value first.
pub fn pnl_by_sentiment_value<T: Borrow<JoinedTrade>>(
    joined: &[T],
) -> Result<Vec<SentimentValueStats>, AnalyticsError> {
    let mut groups: BTreeMap<Decimal, (String, Vec<&Trade>)> = BTreeMap::new();
    for item in joined {
        let j: &JoinedTrade = item.borrow();
        if let Some(record) = &j.sentiment {
            groups
                .entry(record.value.normalize())
                .or_insert_with(|| (record.classification.clone(), Vec::new()))
                .1
                .push(&j.trade);
        }
    }

    if groups.is_empty() {
        return Err(no_sentiment());
    }

    groups
        .into_iter()
        .map(|(value, (classification, group))| {
            let total_pnl = checked_sum(group.iter().map(|t| t.pnl))?;
            Ok(SentimentValueStats {
                value,
                classification,
                trade_count: group.len(),
                average_pnl: total_pnl / Decimal::from(group.len()),
                total_pnl,
            })
        })
        .collect()
}
