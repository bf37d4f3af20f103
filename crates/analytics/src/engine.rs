use crate::buckets::{self, best_hour, weakest_hour};
use crate::error::{optional, AnalyticsError};
use crate::events::{self, DEFAULT_TOP_EVENTS};
use crate::holding;
use crate::metrics;
use crate::report::DashboardReport;
use crate::sentiment;
use core_types::{JoinedTrade, TradeFilter};
use tracing::{debug, info};

/// A stateless calculator that turns joined trades into every dashboard section.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    top_events: usize,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self { top_events: DEFAULT_TOP_EVENTS }
    }
}

impl AnalyticsEngine {
    /// # Arguments
    ///
    /// * `top_events` - How many gain days and loss days the events section keeps.
    pub fn new(top_events: usize) -> Self {
        Self { top_events }
    }

    /// The main entry point: filters the trades and computes every section.
    ///
    /// # Returns
    ///
    /// `AnalyticsError::NotEnoughData` when the filter leaves no trades. Any
    /// section that has nothing to work with on its own (no timestamps, no
    /// sentiment days, no durations) is `None` in the report.
    pub fn analyze(&self, joined: &[JoinedTrade], filter: &TradeFilter) -> Result<DashboardReport, AnalyticsError> {
        let selected = filter.apply(joined);
        info!(selected = selected.len(), total = joined.len(), "Applied trade filter.");

        if selected.is_empty() {
            return Err(AnalyticsError::NotEnoughData("the filter selects no trades".to_string()));
        }

        let summary = metrics::summarize(&selected)?;

        let hours = optional(buckets::bucket_by_hour(&selected))?;
        let golden_hour = hours.as_deref().and_then(best_hour).cloned();
        let worst_hour = hours.as_deref().and_then(weakest_hour).cloned();
        let weekdays = optional(buckets::bucket_by_weekday(&selected))?;
        let months = optional(buckets::bucket_by_month(&selected))?;
        let heatmap = optional(buckets::hour_weekday_heatmap(&selected))?;
        debug!(hours = hours.as_ref().map_or(0, Vec::len), "Computed time buckets.");

        let holding = optional(holding::bucket_by_holding_duration(&selected))?;
        let holding_time = optional(holding::holding_time_summary(&selected))?;
        let optimal_holding_bucket = holding
            .as_ref()
            .and_then(holding::optimal_holding_bucket)
            .map(|b| b.bucket);
        let holding_ranges = optional(holding::bucket_by_holding_range(&selected))?;
        let best_holding_range = holding_ranges
            .as_deref()
            .and_then(holding::best_holding_bucket)
            .map(|r| r.range);

        let sentiment = optional(sentiment::correlate_with_sentiment(&selected))?;
        let most_profitable_mood = sentiment
            .as_deref()
            .and_then(sentiment::most_profitable_mood)
            .map(|mood| mood.classification.clone());
        let side_by_sentiment = optional(sentiment::side_by_sentiment(&selected))?;
        let sentiment_values = optional(sentiment::pnl_by_sentiment_value(&selected))?;
        debug!(moods = sentiment.as_ref().map_or(0, Vec::len), "Computed sentiment sections.");

        let daily = optional(events::daily_overview(&selected))?;
        let events = optional(events::top_events(&selected, self.top_events))?;

        Ok(DashboardReport {
            filter: filter.clone(),
            summary,
            hours,
            golden_hour,
            worst_hour,
            weekdays,
            months,
            heatmap,
            holding,
            holding_time,
            optimal_holding_bucket,
            holding_ranges,
            best_holding_range,
            sentiment,
            most_profitable_mood,
            side_by_sentiment,
            sentiment_values,
            daily,
            events,
        })
    }
}
