use crate::enums::TradeSide;
use crate::error::CoreError;
use crate::structs::JoinedTrade;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An immutable selection over the joined trade table.
///
/// Every field left as `None` accepts all trades, so `TradeFilter::all()` is
/// the identity filter. Date bounds are inclusive and compare calendar days.
/// A trade with no timestamp never passes a date bound, and a trade with no
/// sentiment day never passes a mood selection. Moods match regardless of case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub symbols: Option<BTreeSet<String>>,
    pub sides: Option<BTreeSet<TradeSide>>,
    pub moods: Option<BTreeSet<String>>,
}

impl TradeFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols = Some(symbols.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_sides(mut self, sides: impl IntoIterator<Item = TradeSide>) -> Self {
        self.sides = Some(sides.into_iter().collect());
        self
    }

    pub fn with_moods<I, S>(mut self, moods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.moods = Some(moods.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Rejects a range whose lower bound is after its upper bound.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(CoreError::InvalidInput(
                    "date range".to_string(),
                    format!("start {from} is after end {to}"),
                ));
            }
        }
        Ok(())
    }

    pub fn matches(&self, joined: &JoinedTrade) -> bool {
        let trade = &joined.trade;

        if self.from.is_some() || self.to.is_some() {
            let Some(date) = trade.date() else {
                return false;
            };
            if self.from.is_some_and(|from| date < from) || self.to.is_some_and(|to| date > to) {
                return false;
            }
        }

        if let Some(symbols) = &self.symbols {
            if !symbols.contains(&trade.symbol) {
                return false;
            }
        }

        if let Some(sides) = &self.sides {
            if !sides.contains(&trade.side) {
                return false;
            }
        }

        if let Some(moods) = &self.moods {
            match joined.classification() {
                Some(mood) if moods.iter().any(|m| m.eq_ignore_ascii_case(mood)) => {}
                _ => return false,
            }
        }

        true
    }

    /// Returns the matching subset, leaving the input untouched.
    pub fn apply<'a>(&self, trades: &'a [JoinedTrade]) -> Vec<&'a JoinedTrade> {
        trades.iter().filter(|t| self.matches(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::{SentimentRecord, Trade};
    use rust_decimal_macros::dec;

    fn joined(ts: Option<&str>, side: TradeSide, symbol: &str, mood: Option<&str>) -> JoinedTrade {
        let timestamp = ts.map(|s| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap());
        let trade = Trade::new(1, timestamp, dec!(1), side, symbol);
        let sentiment = mood.map(|m| SentimentRecord {
            date: timestamp.map(|t| t.date()).unwrap_or_default(),
            value: dec!(50),
            classification: m.to_string(),
        });
        JoinedTrade { trade, sentiment }
    }

    #[test]
    fn identity_filter_accepts_everything() {
        let filter = TradeFilter::all();
        assert!(filter.is_identity());
        assert!(filter.matches(&joined(None, TradeSide::Short, "ETH", None)));
        assert!(filter.matches(&joined(Some("2024-01-01 10:00"), TradeSide::Long, "BTC", Some("Fear"))));
    }

    #[test]
    fn date_bounds_are_inclusive_and_drop_untimed_trades() {
        let filter = TradeFilter::all().between(
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 1, 31),
        );
        assert!(filter.matches(&joined(Some("2024-01-01 00:00"), TradeSide::Long, "BTC", None)));
        assert!(filter.matches(&joined(Some("2024-01-31 23:59"), TradeSide::Long, "BTC", None)));
        assert!(!filter.matches(&joined(Some("2024-02-01 00:00"), TradeSide::Long, "BTC", None)));
        assert!(!filter.matches(&joined(None, TradeSide::Long, "BTC", None)));
    }

    #[test]
    fn only_long_trades_on_fear_days() {
        let filter = TradeFilter::all()
            .with_sides([TradeSide::Long])
            .with_moods(["Fear"]);
        assert!(filter.matches(&joined(Some("2024-01-01 10:00"), TradeSide::Long, "BTC", Some("Fear"))));
        assert!(!filter.matches(&joined(Some("2024-01-01 10:00"), TradeSide::Short, "BTC", Some("Fear"))));
        assert!(!filter.matches(&joined(Some("2024-01-01 10:00"), TradeSide::Long, "BTC", Some("Greed"))));
        assert!(!filter.matches(&joined(Some("2024-01-01 10:00"), TradeSide::Long, "BTC", None)));
    }

    #[test]
    fn mood_selection_ignores_case() {
        let filter = TradeFilter::all().with_moods(["extreme fear"]);
        assert!(filter.matches(&joined(Some("2024-01-01 10:00"), TradeSide::Long, "BTC", Some("Extreme Fear"))));
        assert!(!filter.matches(&joined(Some("2024-01-01 10:00"), TradeSide::Long, "BTC", Some("Fear"))));

        let filter = TradeFilter::all().with_moods(["FEAR"]);
        assert!(filter.matches(&joined(Some("2024-01-01 10:00"), TradeSide::Short, "ETH", Some("Fear"))));
    }

    #[test]
    fn symbol_selection() {
        let filter = TradeFilter::all().with_symbols(["BTC", "SOL"]);
        assert!(filter.matches(&joined(None, TradeSide::Long, "SOL", None)));
        assert!(!filter.matches(&joined(None, TradeSide::Long, "ETH", None)));
    }

    #[test]
    fn inverted_range_is_invalid() {
        let filter = TradeFilter::all().between(
            NaiveDate::from_ymd_opt(2024, 2, 1),
            NaiveDate::from_ymd_opt(2024, 1, 1),
        );
        assert!(filter.validate().is_err());
        assert!(TradeFilter::all().validate().is_ok());
    }
}
