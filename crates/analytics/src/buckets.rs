//! Time-of-day, day-of-week and monthly performance.
//!
//! Trades without a timestamp are skipped here. Buckets come out in calendar
//! order (hours 0..23, Monday..Sunday, months oldest first) and only buckets
//! that hold at least one trade are reported.

use crate::error::AnalyticsError;
use crate::metrics::{ratio, total_pnl};
use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use core_types::Trade;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Win rate and PnL of one group of trades.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketStats {
    pub trade_count: usize,
    pub winning_trades: usize,
    pub win_rate: Decimal,
    pub total_pnl: Decimal,
    pub average_pnl: Decimal,
}

impl BucketStats {
    /// Callers only build stats for non-empty groups.
    pub(crate) fn from_trades<T: AsRef<Trade>>(trades: &[T]) -> Result<Self, AnalyticsError> {
        let trade_count = trades.len();
        let winning_trades = trades.iter().filter(|t| t.as_ref().is_win()).count();
        let total_pnl = total_pnl(trades)?;
        Ok(Self {
            trade_count,
            winning_trades,
            win_rate: ratio(winning_trades, trade_count),
            total_pnl,
            average_pnl: total_pnl / Decimal::from(trade_count),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourBucket {
    /// Hour of day, 0..=23.
    pub hour: u32,
    #[serde(flatten)]
    pub stats: BucketStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayBucket {
    pub weekday: Weekday,
    #[serde(flatten)]
    pub stats: BucketStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    /// `YYYY-MM`
    pub label: String,
    #[serde(flatten)]
    pub stats: BucketStats,
}

/// Total PnL of one weekday/hour cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub weekday: Weekday,
    pub hour: u32,
    pub trade_count: usize,
    pub total_pnl: Decimal,
}

/// Groups timestamped trades by an ordered key.
fn group_by_time<'a, K, T, F>(trades: &'a [T], key: F) -> BTreeMap<K, Vec<&'a Trade>>
where
    K: Ord,
    T: AsRef<Trade>,
    F: Fn(NaiveDateTime) -> K,
{
    let mut groups: BTreeMap<K, Vec<&'a Trade>> = BTreeMap::new();
    for item in trades {
        let trade: &Trade = item.as_ref();
        if let Some(ts) = trade.timestamp {
            groups.entry(key(ts)).or_default().push(trade);
        }
    }
    groups
}

fn require_timestamps<K, V>(groups: &BTreeMap<K, V>) -> Result<(), AnalyticsError> {
    if groups.is_empty() {
        return Err(AnalyticsError::NotEnoughData("no trade in the selection has a usable timestamp".to_string()));
    }
    Ok(())
}

pub fn bucket_by_hour<T: AsRef<Trade>>(trades: &[T]) -> Result<Vec<HourBucket>, AnalyticsError> {
    let groups = group_by_time(trades, |ts| ts.hour());
    require_timestamps(&groups)?;
    groups
        .into_iter()
        .map(|(hour, group)| Ok(HourBucket { hour, stats: BucketStats::from_trades(&group)? }))
        .collect()
}

pub fn bucket_by_weekday<T: AsRef<Trade>>(trades: &[T]) -> Result<Vec<WeekdayBucket>, AnalyticsError> {
    let groups = group_by_time(trades, |ts| ts.weekday().num_days_from_monday());
    require_timestamps(&groups)?;
    groups
        .into_iter()
        .map(|(day, group)| {
            Ok(WeekdayBucket {
                weekday: WEEK[day as usize],
                stats: BucketStats::from_trades(&group)?,
            })
        })
        .collect()
}

/// Buckets by calendar month, keeping years apart (`2024-11` and `2025-11`
/// are different buckets).
pub fn bucket_by_month<T: AsRef<Trade>>(trades: &[T]) -> Result<Vec<MonthBucket>, AnalyticsError> {
    let groups = group_by_time(trades, |ts| (ts.year(), ts.month()));
    require_timestamps(&groups)?;
    groups
        .into_iter()
        .map(|((year, month), group)| {
            Ok(MonthBucket {
                year,
                month,
                label: format!("{year:04}-{month:02}"),
                stats: BucketStats::from_trades(&group)?,
            })
        })
        .collect()
}

/// PnL per (weekday, hour), Monday first then hour of day.
pub fn hour_weekday_heatmap<T: AsRef<Trade>>(trades: &[T]) -> Result<Vec<HeatmapCell>, AnalyticsError> {
    let groups = group_by_time(trades, |ts| (ts.weekday().num_days_from_monday(), ts.hour()));
    require_timestamps(&groups)?;
    groups
        .into_iter()
        .map(|((day, hour), group)| {
            Ok(HeatmapCell {
                weekday: WEEK[day as usize],
                hour,
                trade_count: group.len(),
                total_pnl: total_pnl(&group)?,
            })
        })
        .collect()
}

/// The hour with the highest total PnL. Ties go to the earlier hour.
pub fn golden_hour<T: AsRef<Trade>>(trades: &[T]) -> Result<HourBucket, AnalyticsError> {
    let buckets = bucket_by_hour(trades)?;
    best_hour(&buckets)
        .cloned()
        .ok_or_else(|| AnalyticsError::InternalError("hour buckets were empty".to_string()))
}

/// The hour with the lowest total PnL. Ties go to the earlier hour.
pub fn worst_hour<T: AsRef<Trade>>(trades: &[T]) -> Result<HourBucket, AnalyticsError> {
    let buckets = bucket_by_hour(trades)?;
    weakest_hour(&buckets)
        .cloned()
        .ok_or_else(|| AnalyticsError::InternalError("hour buckets were empty".to_string()))
}

pub(crate) fn best_hour(buckets: &[HourBucket]) -> Option<&HourBucket> {
    buckets.iter().fold(None, |best: Option<&HourBucket>, b| match best {
        Some(current) if current.stats.total_pnl >= b.stats.total_pnl => Some(current),
        _ => Some(b),
    })
}

pub(crate) fn weakest_hour(buckets: &[HourBucket]) -> Option<&HourBucket> {
    buckets.iter().fold(None, |worst: Option<&HourBucket>, b| match worst {
        Some(current) if current.stats.total_pnl <= b.stats.total_pnl => Some(current),
        _ => Some(b),
    })
}
