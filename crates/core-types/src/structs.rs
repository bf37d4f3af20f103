use crate::enums::TradeSide;
use crate::error::CoreError;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single closed trade from the trading history log.
///
/// Trades are immutable once loaded. A malformed timestamp does not reject the
/// row; it leaves `timestamp` empty so the trade still counts toward the
/// aggregate figures but drops out of every time-based view.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    /// 1-based data row in the source file (header excluded).
    pub row: usize,
    /// Local exchange time (IST in the reference export), no offset applied.
    pub timestamp: Option<NaiveDateTime>,
    pub pnl: Decimal,
    pub side: TradeSide,
    pub symbol: String,
    /// Exit minus entry, when the log carries both.
    pub holding_period: Option<Duration>,
}

impl Trade {
    pub fn new(
        row: usize,
        timestamp: Option<NaiveDateTime>,
        pnl: Decimal,
        side: TradeSide,
        symbol: impl Into<String>,
    ) -> Self {
        Self { row, timestamp, pnl, side, symbol: symbol.into(), holding_period: None }
    }

    pub fn with_holding_period(mut self, holding_period: Duration) -> Self {
        self.holding_period = Some(holding_period);
        self
    }

    /// The calendar day the trade belongs to, used as the sentiment join key.
    pub fn date(&self) -> Option<NaiveDate> {
        self.timestamp.map(|ts| ts.date())
    }

    pub fn is_win(&self) -> bool {
        self.pnl > Decimal::ZERO
    }

    pub fn is_loss(&self) -> bool {
        self.pnl < Decimal::ZERO
    }
}

impl AsRef<Trade> for Trade {
    fn as_ref(&self) -> &Trade {
        self
    }
}

/// One day of the Fear & Greed index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub date: NaiveDate,
    pub value: Decimal,
    pub classification: String,
}

/// Day-keyed sentiment lookup. Holds at most one record per calendar day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentimentIndex {
    days: BTreeMap<NaiveDate, SentimentRecord>,
}

impl SentimentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, refusing a second record for a day already present.
    pub fn insert(&mut self, record: SentimentRecord) -> Result<(), CoreError> {
        if self.days.contains_key(&record.date) {
            return Err(CoreError::DuplicateSentimentDay(record.date));
        }
        self.days.insert(record.date, record);
        Ok(())
    }

    pub fn get(&self, date: NaiveDate) -> Option<&SentimentRecord> {
        self.days.get(&date)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// First and last day covered by the index.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.days.keys().next()?;
        let last = self.days.keys().next_back()?;
        Some((*first, *last))
    }
}

impl TryFrom<Vec<SentimentRecord>> for SentimentIndex {
    type Error = CoreError;

    fn try_from(records: Vec<SentimentRecord>) -> Result<Self, Self::Error> {
        let mut index = SentimentIndex::new();
        for record in records {
            index.insert(record)?;
        }
        Ok(index)
    }
}

/// A trade enriched with the sentiment of its calendar day.
///
/// `sentiment` is `None` when the trade has no timestamp or the index has no
/// record for that day.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedTrade {
    pub trade: Trade,
    pub sentiment: Option<SentimentRecord>,
}

impl JoinedTrade {
    /// Looks the trade's day up in the index (many trades to one day).
    pub fn join(trade: Trade, index: &SentimentIndex) -> Self {
        let sentiment = trade.date().and_then(|date| index.get(date)).cloned();
        Self { trade, sentiment }
    }

    pub fn classification(&self) -> Option<&str> {
        self.sentiment.as_ref().map(|s| s.classification.as_str())
    }
}

impl AsRef<Trade> for JoinedTrade {
    fn as_ref(&self) -> &Trade {
        &self.trade
    }
}
