//! Per-day aggregation: the daily overview and the best and worst trading days.

use crate::error::AnalyticsError;
use crate::metrics::overflow;
use chrono::NaiveDate;
use core_types::{JoinedTrade, Trade};
use rust_decimal::Decimal;
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::BTreeMap;

pub const DEFAULT_TOP_EVENTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub net_pnl: Decimal,
    pub trade_count: usize,
    pub sentiment_value: Option<Decimal>,
    pub classification: Option<String>,
}

/// A calendar day whose net PnL stood out, with that day's market mood.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyEvent {
    pub date: NaiveDate,
    pub net_pnl: Decimal,
    /// `|net_pnl|`
    pub magnitude: Decimal,
    pub trade_count: usize,
    pub sentiment_value: Option<Decimal>,
    pub classification: Option<String>,
}

impl From<DailySummary> for DailyEvent {
    fn from(day: DailySummary) -> Self {
        Self {
            date: day.date,
            net_pnl: day.net_pnl,
            magnitude: day.net_pnl.abs(),
            trade_count: day.trade_count,
            sentiment_value: day.sentiment_value,
            classification: day.classification,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopEvents {
    /// Biggest gain first.
    pub gains: Vec<DailyEvent>,
    /// Biggest loss first.
    pub losses: Vec<DailyEvent>,
}

/// Net PnL and trade count per day, oldest day first.
fn pnl_by_day<'a, I>(trades: I) -> Result<BTreeMap<NaiveDate, (Decimal, usize)>, AnalyticsError>
where
    I: IntoIterator<Item = &'a Trade>,
{
    let mut days: BTreeMap<NaiveDate, (Decimal, usize)> = BTreeMap::new();
    for trade in trades {
        if let Some(date) = trade.date() {
            let entry = days.entry(date).or_insert((Decimal::ZERO, 0));
            entry.0 = entry.0.checked_add(trade.pnl).ok_or_else(|| overflow("daily PnL"))?;
            entry.1 += 1;
        }
    }
    Ok(days)
}

/// One row per trading day with the day's sentiment reading, ordered by date.
pub fn daily_overview<T: Borrow<JoinedTrade>>(joined: &[T]) -> Result<Vec<DailySummary>, AnalyticsError> {
    let days = pnl_by_day(joined.iter().map(|item| {
        let j: &JoinedTrade = item.borrow();
        &j.trade
    }))?;
    if days.is_empty() {
        return Err(AnalyticsError::NotEnoughData(
            "no trade in the selection has a usable timestamp".to_string(),
        ));
    }

    // every trade of a day joins the same record
    let mut moods: BTreeMap<NaiveDate, (Decimal, String)> = BTreeMap::new();
    for item in joined {
        let j: &JoinedTrade = item.borrow();
        if let Some(record) = &j.sentiment {
            moods
                .entry(record.date)
                .or_insert_with(|| (record.value, record.classification.clone()));
        }
    }

    Ok(days
        .into_iter()
        .map(|(date, (net_pnl, trade_count))| {
            let mood = moods.get(&date);
            DailySummary {
                date,
                net_pnl,
                trade_count,
                sentiment_value: mood.map(|(value, _)| *value),
                classification: mood.map(|(_, label)| label.clone()),
            }
        })
        .collect())
}

/// Up to `n` best and `n` worst days by net PnL.
///
/// Flat days (net zero) are in neither list. Equal PnL keeps the earlier day first.
pub fn top_events<T: Borrow<JoinedTrade>>(joined: &[T], n: usize) -> Result<TopEvents, AnalyticsError> {
    let (mut gains, mut losses): (Vec<DailyEvent>, Vec<DailyEvent>) = daily_overview(joined)?
        .into_iter()
        .filter(|day| !day.net_pnl.is_zero())
        .map(DailyEvent::from)
        .partition(|e| e.net_pnl > Decimal::ZERO);

    // stable sorts, so ties stay in date order
    gains.sort_by(|a, b| b.net_pnl.cmp(&a.net_pnl));
    losses.sort_by(|a, b| a.net_pnl.cmp(&b.net_pnl));
    gains.truncate(n);
    losses.truncate(n);

    Ok(TopEvents { gains, losses })
}
