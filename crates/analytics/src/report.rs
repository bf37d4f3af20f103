use crate::buckets::{HeatmapCell, HourBucket, MonthBucket, WeekdayBucket};
use crate::error::AnalyticsError;
use crate::events::{DailySummary, TopEvents};
use crate::holding::{HoldingBreakdown, HoldingBucket, HoldingRange, HoldingRangeStats, HoldingTimeSummary};
use crate::metrics::overflow;
use crate::sentiment::{MoodSideStats, MoodStats, SentimentValueStats};
use core_types::TradeFilter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Gross profit over gross loss, or the sentinel for a set with no losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ProfitFactor {
    Ratio(Decimal),
    /// Gross loss is zero, so the ratio is undefined (unbounded when there is profit).
    NoLosses,
}

impl ProfitFactor {
    pub(crate) fn from_gross(gross_profit: Decimal, gross_loss: Decimal) -> Result<Self, AnalyticsError> {
        if gross_loss > Decimal::ZERO {
            gross_profit
                .checked_div(gross_loss)
                .map(ProfitFactor::Ratio)
                .ok_or_else(|| overflow("profit factor"))
        } else {
            Ok(ProfitFactor::NoLosses)
        }
    }
}

/// Aggregate performance over a set of trades.
///
/// Only produced for a non-empty set, so the ratios that depend on the trade
/// count are plain values. Figures that need a winning or losing trade to
/// exist stay `Option`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    // I. Core Profitability Metrics
    pub total_net_profit: Decimal,
    pub gross_profit: Decimal,
    pub gross_loss: Decimal,
    pub profit_factor: ProfitFactor,
    pub expectancy: Decimal,

    // II. Trade-Level Statistics
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub breakeven_trades: usize,
    /// Fraction in `[0, 1]`.
    pub win_rate: Decimal,
    pub average_win: Option<Decimal>,
    /// Negative, as it appears in the log.
    pub average_loss: Option<Decimal>,
    pub payoff_ratio: Option<Decimal>, // None without losses
    /// Win rate at which this payoff ratio nets zero: `|avg loss| / (|avg loss| + avg win)`.
    pub breakeven_win_rate: Option<Decimal>,
    pub largest_win: Option<Decimal>,
    pub largest_loss: Option<Decimal>,

    // III. Dispersion
    pub pnl_std_dev: Option<Decimal>, // None below two trades
}

impl PerformanceReport {
    /// Creates a new, zeroed-out report as the starting point of `summarize`.
    pub(crate) fn new() -> Self {
        Self {
            total_net_profit: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            profit_factor: ProfitFactor::NoLosses,
            expectancy: Decimal::ZERO,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            breakeven_trades: 0,
            win_rate: Decimal::ZERO,
            average_win: None,
            average_loss: None,
            payoff_ratio: None,
            breakeven_win_rate: None,
            largest_win: None,
            largest_loss: None,
            pnl_std_dev: None,
        }
    }
}

/// Every dashboard section for one filter selection.
///
/// Sections that had nothing to work with after filtering (no timestamps, no
/// sentiment days, no holding durations) are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub filter: TradeFilter,
    pub summary: PerformanceReport,
    pub hours: Option<Vec<HourBucket>>,
    pub golden_hour: Option<HourBucket>,
    pub worst_hour: Option<HourBucket>,
    pub weekdays: Option<Vec<WeekdayBucket>>,
    pub months: Option<Vec<MonthBucket>>,
    pub heatmap: Option<Vec<HeatmapCell>>,
    pub holding: Option<HoldingBreakdown>,
    pub holding_time: Option<HoldingTimeSummary>,
    pub optimal_holding_bucket: Option<HoldingBucket>,
    pub holding_ranges: Option<Vec<HoldingRangeStats>>,
    pub best_holding_range: Option<HoldingRange>,
    pub sentiment: Option<Vec<MoodStats>>,
    pub most_profitable_mood: Option<String>,
    pub side_by_sentiment: Option<Vec<MoodSideStats>>,
    pub sentiment_values: Option<Vec<SentimentValueStats>>,
    pub daily: Option<Vec<DailySummary>>,
    pub events: Option<TopEvents>,
}
