//! Performance by how long a position was held.
//!
//! Bucket edges are fixed:
//!
//! | bucket    | holding time  |
//! |-----------|---------------|
//! | Scalp     | < 1 hour      |
//! | Day       | 1 h – < 24 h  |
//! | Swing     | 24 h – < 7 d  |
//! | Long-term | ≥ 7 days      |
//!
//! Trades without an entry/exit pair, or whose exit precedes the entry, are
//! unclassified and only counted.
//!
//! The finer `HoldingRange` split is used to locate the most profitable
//! holding time. Its ranges are closed on the right (`1-4h` holds exactly 4h)
//! and a zero-length hold has no range.

use crate::buckets::BucketStats;
use crate::error::AnalyticsError;
use crate::metrics::checked_sum;
use chrono::Duration;
use core_types::Trade;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub const SCALP_LIMIT_HOURS: i64 = 1;
pub const DAY_LIMIT_HOURS: i64 = 24;
pub const SWING_LIMIT_HOURS: i64 = 24 * 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingBucket {
    Scalp,
    Day,
    Swing,
    LongTerm,
}

impl HoldingBucket {
    /// Classifies a holding period; negative periods have no bucket.
    pub fn classify(period: Duration) -> Option<Self> {
        if period < Duration::zero() {
            None
        } else if period < Duration::hours(SCALP_LIMIT_HOURS) {
            Some(HoldingBucket::Scalp)
        } else if period < Duration::hours(DAY_LIMIT_HOURS) {
            Some(HoldingBucket::Day)
        } else if period < Duration::hours(SWING_LIMIT_HOURS) {
            Some(HoldingBucket::Swing)
        } else {
            Some(HoldingBucket::LongTerm)
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HoldingBucket::Scalp => "Scalp (<1h)",
            HoldingBucket::Day => "Day (1-24h)",
            HoldingBucket::Swing => "Swing (1-7d)",
            HoldingBucket::LongTerm => "Long-term (>=7d)",
        }
    }
}

/// Upper edges, in hours, of every `HoldingRange` but the last.
const RANGE_EDGES_HOURS: [i64; 6] = [1, 4, 12, 24, 72, 168];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingRange {
    UpToOneHour,
    OneToFourHours,
    FourToTwelveHours,
    TwelveToTwentyFourHours,
    OneToThreeDays,
    ThreeToSevenDays,
    OverSevenDays,
}

impl HoldingRange {
    const ALL: [HoldingRange; 7] = [
        HoldingRange::UpToOneHour,
        HoldingRange::OneToFourHours,
        HoldingRange::FourToTwelveHours,
        HoldingRange::TwelveToTwentyFourHours,
        HoldingRange::OneToThreeDays,
        HoldingRange::ThreeToSevenDays,
        HoldingRange::OverSevenDays,
    ];

    /// Zero and negative periods have no range.
    pub fn classify(period: Duration) -> Option<Self> {
        if period <= Duration::zero() {
            return None;
        }
        let index = RANGE_EDGES_HOURS
            .iter()
            .position(|edge| period <= Duration::hours(*edge))
            .unwrap_or(RANGE_EDGES_HOURS.len());
        Some(Self::ALL[index])
    }

    pub fn label(&self) -> &'static str {
        match self {
            HoldingRange::UpToOneHour => "<1h",
            HoldingRange::OneToFourHours => "1-4h",
            HoldingRange::FourToTwelveHours => "4-12h",
            HoldingRange::TwelveToTwentyFourHours => "12-24h",
            HoldingRange::OneToThreeDays => "1-3d",
            HoldingRange::ThreeToSevenDays => "3-7d",
            HoldingRange::OverSevenDays => ">7d",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingRangeStats {
    pub range: HoldingRange,
    #[serde(flatten)]
    pub stats: BucketStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingBucketStats {
    pub bucket: HoldingBucket,
    #[serde(flatten)]
    pub stats: BucketStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingBreakdown {
    /// Scalp first, Long-term last.
    pub buckets: Vec<HoldingBucketStats>,
    pub unclassified: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingTimeSummary {
    pub trades: usize,
    pub mean_hours: Decimal,
    pub median_hours: Decimal,
}

fn no_durations() -> AnalyticsError {
    AnalyticsError::NotEnoughData("no trade in the selection has both an entry and an exit time".to_string())
}

/// The entry with the highest average PnL. Ties keep the earlier (shorter) one.
fn best_by_average<T>(items: &[T], stats: impl Fn(&T) -> &BucketStats) -> Option<&T> {
    items.iter().fold(None, |best: Option<&T>, item| match best {
        Some(current) if stats(current).average_pnl >= stats(item).average_pnl => Some(current),
        _ => Some(item),
    })
}

fn usable_period(trade: &Trade) -> Option<Duration> {
    trade.holding_period.filter(|p| *p >= Duration::zero())
}

fn hours(period: Duration) -> Decimal {
    Decimal::from(period.num_seconds()) / Decimal::from(3600)
}

pub fn bucket_by_holding_duration<T: AsRef<Trade>>(trades: &[T]) -> Result<HoldingBreakdown, AnalyticsError> {
    let mut groups: BTreeMap<HoldingBucket, Vec<&Trade>> = BTreeMap::new();
    let mut unclassified = 0;

    for item in trades {
        let trade: &Trade = item.as_ref();
        match trade.holding_period.and_then(HoldingBucket::classify) {
            Some(bucket) => groups.entry(bucket).or_default().push(trade),
            None => unclassified += 1,
        }
    }

    if groups.is_empty() {
        return Err(no_durations());
    }

    Ok(HoldingBreakdown {
        buckets: groups
            .into_iter()
            .map(|(bucket, group)| Ok(HoldingBucketStats { bucket, stats: BucketStats::from_trades(&group)? }))
            .collect::<Result<_, AnalyticsError>>()?,
        unclassified,
    })
}

/// The holding bucket with the best average PnL per trade.
pub fn optimal_holding_bucket(breakdown: &HoldingBreakdown) -> Option<&HoldingBucketStats> {
    best_by_average(&breakdown.buckets, |b| &b.stats)
}

/// Performance per `HoldingRange`, shortest range first. Only ranges holding
/// a trade are reported.
pub fn bucket_by_holding_range<T: AsRef<Trade>>(trades: &[T]) -> Result<Vec<HoldingRangeStats>, AnalyticsError> {
    let mut groups: BTreeMap<HoldingRange, Vec<&Trade>> = BTreeMap::new();
    for item in trades {
        let trade: &Trade = item.as_ref();
        if let Some(range) = trade.holding_period.and_then(HoldingRange::classify) {
            groups.entry(range).or_default().push(trade);
        }
    }

    if groups.is_empty() {
        return Err(no_durations());
    }

    groups
        .into_iter()
        .map(|(range, group)| Ok(HoldingRangeStats { range, stats: BucketStats::from_trades(&group)? }))
        .collect()
}

/// The most profitable holding time: the range with the highest average PnL.
/// Ties go to the shorter range.
pub fn best_holding_bucket(ranges: &[HoldingRangeStats]) -> Option<&HoldingRangeStats> {
    best_by_average(ranges, |r| &r.stats)
}

/// Mean and median holding time in hours.
pub fn holding_time_summary<T: AsRef<Trade>>(trades: &[T]) -> Result<HoldingTimeSummary, AnalyticsError> {
    let mut periods: Vec<Decimal> = trades
        .iter()
        .filter_map(|t| usable_period(t.as_ref()))
        .map(hours)
        .collect();

    if periods.is_empty() {
        return Err(no_durations());
    }

    periods.sort();
    let count = periods.len();
    let mean_hours = checked_sum(periods.iter().copied())? / Decimal::from(count);
    let median_hours = if count % 2 == 1 {
        periods[count / 2]
    } else {
        (periods[count / 2 - 1] + periods[count / 2]) / Decimal::TWO
    };

    Ok(HoldingTimeSummary { trades: count, mean_hours, median_hours })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::TradeSide;
    use rust_decimal_macros::dec;

    fn held(pnl: Decimal, minutes: i64) -> Trade {
        Trade::new(1, None, pnl, TradeSide::Long, "BTC").with_holding_period(Duration::minutes(minutes))
    }

    #[test]
    fn thresholds_are_half_open() {
        assert_eq!(HoldingBucket::classify(Duration::minutes(59)), Some(HoldingBucket::Scalp));
        assert_eq!(HoldingBucket::classify(Duration::hours(1)), Some(HoldingBucket::Day));
        assert_eq!(HoldingBucket::classify(Duration::hours(24)), Some(HoldingBucket::Swing));
        assert_eq!(HoldingBucket::classify(Duration::hours(167)), Some(HoldingBucket::Swing));
        assert_eq!(HoldingBucket::classify(Duration::days(7)), Some(HoldingBucket::LongTerm));
        assert_eq!(HoldingBucket::classify(Duration::minutes(-1)), None);
        assert_eq!(HoldingBucket::classify(Duration::zero()), Some(HoldingBucket::Scalp));
    }

    #[test]
    fn buckets_in_duration_order_with_unclassified_count() {
        let trades = vec![
            held(dec!(5), 60 * 24 * 10),
            held(dec!(-2), 15),
            held(dec!(4), 30),
            held(dec!(7), 60 * 3),
            held(dec!(1), -30),
            Trade::new(9, None, dec!(3), TradeSide::Short, "ETH"),
        ];
        let breakdown = bucket_by_holding_duration(&trades).unwrap();

        let order: Vec<HoldingBucket> = breakdown.buckets.iter().map(|b| b.bucket).collect();
        assert_eq!(order, vec![HoldingBucket::Scalp, HoldingBucket::Day, HoldingBucket::LongTerm]);
        assert_eq!(breakdown.unclassified, 2);

        let scalp = &breakdown.buckets[0].stats;
        assert_eq!(scalp.trade_count, 2);
        assert_eq!(scalp.win_rate, dec!(0.5));
        assert_eq!(scalp.total_pnl, dec!(2));
    }

    #[test]
    fn no_durations_is_not_enough_data() {
        let trades = vec![Trade::new(1, None, dec!(1), TradeSide::Long, "BTC")];
        assert!(bucket_by_holding_duration(&trades).unwrap_err().is_not_enough_data());
        assert!(holding_time_summary(&trades).unwrap_err().is_not_enough_data());
        assert!(bucket_by_holding_range(&trades).unwrap_err().is_not_enough_data());
    }

    #[test]
    fn range_edges_are_closed_on_the_right() {
        let hours = |h: i64| HoldingRange::classify(Duration::hours(h));
        assert_eq!(HoldingRange::classify(Duration::zero()), None);
        assert_eq!(HoldingRange::classify(Duration::seconds(1)), Some(HoldingRange::UpToOneHour));
        assert_eq!(hours(1), Some(HoldingRange::UpToOneHour));
        assert_eq!(HoldingRange::classify(Duration::minutes(61)), Some(HoldingRange::OneToFourHours));
        assert_eq!(hours(4), Some(HoldingRange::OneToFourHours));
        assert_eq!(hours(12), Some(HoldingRange::FourToTwelveHours));
        assert_eq!(hours(24), Some(HoldingRange::TwelveToTwentyFourHours));
        assert_eq!(hours(25), Some(HoldingRange::OneToThreeDays));
        assert_eq!(hours(72), Some(HoldingRange::OneToThreeDays));
        assert_eq!(hours(168), Some(HoldingRange::ThreeToSevenDays));
        assert_eq!(hours(169), Some(HoldingRange::OverSevenDays));
        assert_eq!(hours(-2), None);
    }

    #[test]
    fn ranges_report_average_and_total() {
        let trades = vec![
            held(dec!(10), 30),
            held(dec!(-4), 60),
            held(dec!(9), 60 * 3),
            held(dec!(1), 60 * 24 * 10),
            held(dec!(7), 0),
        ];
        let ranges = bucket_by_holding_range(&trades).unwrap();

        let order: Vec<HoldingRange> = ranges.iter().map(|r| r.range).collect();
        assert_eq!(
            order,
            vec![HoldingRange::UpToOneHour, HoldingRange::OneToFourHours, HoldingRange::OverSevenDays]
        );
        assert_eq!(ranges[0].stats.trade_count, 2);
        assert_eq!(ranges[0].stats.total_pnl, dec!(6));
        assert_eq!(ranges[0].stats.average_pnl, dec!(3));
        assert_eq!(best_holding_bucket(&ranges).unwrap().range, HoldingRange::OneToFourHours);
    }

    #[test]
    fn best_range_tie_goes_to_the_shorter_hold() {
        let trades = vec![held(dec!(5), 60 * 5), held(dec!(5), 60 * 30), held(dec!(2), 20)];
        let ranges = bucket_by_holding_range(&trades).unwrap();
        assert_eq!(best_holding_bucket(&ranges).unwrap().range, HoldingRange::FourToTwelveHours);
        assert!(best_holding_bucket(&[]).is_none());
    }

    #[test]
    fn optimal_bucket_by_average_pnl() {
        let trades = vec![held(dec!(2), 15), held(dec!(8), 60 * 2), held(dec!(-1), 60 * 2), held(dec!(3), 60 * 30)];
        let breakdown = bucket_by_holding_duration(&trades).unwrap();
        // Day averages 3.5, Swing 3, Scalp 2
        assert_eq!(optimal_holding_bucket(&breakdown).unwrap().bucket, HoldingBucket::Day);
    }

    #[test]
    fn mean_and_median_hours() {
        let trades = vec![held(dec!(1), 30), held(dec!(1), 90), held(dec!(1), 600), held(dec!(1), 120)];
        let summary = holding_time_summary(&trades).unwrap();
        assert_eq!(summary.trades, 4);
        // 0.5h, 1.5h, 2h, 10h
        assert_eq!(summary.mean_hours, dec!(3.5));
        assert_eq!(summary.median_hours, dec!(1.75));
    }
}
