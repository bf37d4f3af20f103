//! # Moodlens Analytics Engine
//!
//! This crate turns the joined trade table into the figures a trader reads:
//! aggregate performance, time-of-day and calendar patterns, holding-time
//! buckets, performance per market mood, the best and worst days, and what-if
//! scenarios.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** No knowledge of files, terminals or configuration. It
//!   depends only on `core-types`.
//! - **Stateless calculation:** Every operation is a function of its input
//!   slice. The `AnalyticsEngine` only carries the number of top events to keep.
//! - **Explicit empty states:** Nothing divides by an empty set. An operation
//!   without enough input returns `AnalyticsError::NotEnoughData`, which the
//!   engine turns into an absent report section.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: applies a `TradeFilter` and builds a `DashboardReport`.
//! - The free functions in each module, usable on any filtered subset.
//! - `AnalyticsError`: the error type of every operation.

pub mod buckets;
pub mod engine;
pub mod error;
pub mod events;
pub mod holding;
pub mod metrics;
pub mod report;
pub mod scenario;
pub mod sentiment;

pub use buckets::{
    bucket_by_hour, bucket_by_month, bucket_by_weekday, golden_hour, hour_weekday_heatmap, worst_hour, BucketStats,
    HeatmapCell, HourBucket, MonthBucket, WeekdayBucket,
};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use events::{daily_overview, top_events, DailyEvent, DailySummary, TopEvents, DEFAULT_TOP_EVENTS};
pub use holding::{
    best_holding_bucket, bucket_by_holding_duration, bucket_by_holding_range, holding_time_summary,
    optimal_holding_bucket, HoldingBreakdown, HoldingBucket, HoldingBucketStats, HoldingRange, HoldingRangeStats,
    HoldingTimeSummary,
};
pub use metrics::{compute_expectancy, compute_profit_factor, compute_win_rate, summarize};
pub use report::{DashboardReport, PerformanceReport, ProfitFactor};
pub use scenario::{compare_scenario, what_if_simulate, ScenarioComparison, ScenarioDelta, ScenarioOutcome};
pub use sentiment::{
    correlate_with_sentiment, most_profitable_mood, pnl_by_sentiment_value, side_by_sentiment, MoodSideStats,
    MoodStats, SentimentValueStats, MOOD_SCALE,
};
