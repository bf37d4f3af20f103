//! What-if analysis: recompute the headline figures as if only some trades
//! had been taken.
//!
//! Predicates are plain closures, so a scenario can be anything from "only long
//! trades" to a full `TradeFilter`:
//!
//! ```ignore
//! let outcome = what_if_simulate(&joined, |j: &JoinedTrade| filter.matches(j))?;
//! ```

use crate::error::AnalyticsError;
use crate::metrics::{compute_expectancy, compute_profit_factor, compute_win_rate, overflow, total_pnl};
use crate::report::ProfitFactor;
use core_types::Trade;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub trade_count: usize,
    pub total_pnl: Decimal,
    pub win_rate: Decimal,
    pub expectancy: Decimal,
    pub profit_factor: ProfitFactor,
}

/// Scenario minus baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioDelta {
    pub total_pnl: Decimal,
    pub trade_count: i64,
    pub expectancy: Decimal,
    pub win_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioComparison {
    pub baseline: ScenarioOutcome,
    pub scenario: ScenarioOutcome,
    pub delta: ScenarioDelta,
}

fn outcome<T: AsRef<Trade>>(trades: &[T]) -> Result<ScenarioOutcome, AnalyticsError> {
    Ok(ScenarioOutcome {
        trade_count: trades.len(),
        total_pnl: total_pnl(trades)?,
        win_rate: compute_win_rate(trades)?,
        expectancy: compute_expectancy(trades)?,
        profit_factor: compute_profit_factor(trades)?,
    })
}

fn difference(scenario: Decimal, baseline: Decimal, figure: &str) -> Result<Decimal, AnalyticsError> {
    scenario.checked_sub(baseline).ok_or_else(|| overflow(figure))
}

/// Metrics over the trades the predicate keeps. The input is left untouched.
pub fn what_if_simulate<T, F>(trades: &[T], predicate: F) -> Result<ScenarioOutcome, AnalyticsError>
where
    T: AsRef<Trade>,
    F: Fn(&T) -> bool,
{
    let kept: Vec<&T> = trades.iter().filter(|t| predicate(*t)).collect();
    debug!(kept = kept.len(), total = trades.len(), "Simulated scenario.");
    if kept.is_empty() {
        return Err(AnalyticsError::NotEnoughData("the scenario keeps no trades".to_string()));
    }
    outcome(&kept)
}

/// The scenario next to the actual results over every trade.
pub fn compare_scenario<T, F>(trades: &[T], predicate: F) -> Result<ScenarioComparison, AnalyticsError>
where
    T: AsRef<Trade>,
    F: Fn(&T) -> bool,
{
    let baseline = outcome(trades)?;
    let scenario = what_if_simulate(trades, predicate)?;
    let delta = ScenarioDelta {
        total_pnl: difference(scenario.total_pnl, baseline.total_pnl, "scenario PnL delta")?,
        trade_count: scenario.trade_count as i64 - baseline.trade_count as i64,
        expectancy: difference(scenario.expectancy, baseline.expectancy, "scenario expectancy delta")?,
        win_rate: scenario.win_rate - baseline.win_rate,
    };
    Ok(ScenarioComparison { baseline, scenario, delta })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::summarize;
    use chrono::NaiveDate;
    use core_types::{JoinedTrade, SentimentRecord, TradeFilter, TradeSide};
    use rust_decimal_macros::dec;

    fn trade(pnl: Decimal, side: TradeSide) -> Trade {
        let ts = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap().and_hms_opt(10, 0, 0);
        Trade::new(1, ts, pnl, side, "BTC")
    }

    fn sample() -> Vec<Trade> {
        vec![
            trade(dec!(100), TradeSide::Long),
            trade(dec!(-50), TradeSide::Long),
            trade(dec!(-40), TradeSide::Short),
            trade(dec!(20), TradeSide::Short),
            trade(dec!(-30), TradeSide::Short),
        ]
    }

    #[test]
    fn accept_all_reproduces_the_baseline() {
        let trades = sample();
        let outcome = what_if_simulate(&trades, |_| true).unwrap();
        let report = summarize(&trades).unwrap();

        assert_eq!(outcome.trade_count, report.total_trades);
        assert_eq!(outcome.total_pnl, report.total_net_profit);
        assert_eq!(outcome.win_rate, report.win_rate);
        assert_eq!(outcome.expectancy, report.expectancy);
        assert_eq!(outcome.profit_factor, report.profit_factor);
    }

    #[test]
    fn long_only_scenario() {
        let trades = sample();
        let outcome = what_if_simulate(&trades, |t| t.side == TradeSide::Long).unwrap();
        assert_eq!(outcome.trade_count, 2);
        assert_eq!(outcome.total_pnl, dec!(50));
        assert_eq!(outcome.win_rate, dec!(0.5));
        assert_eq!(outcome.expectancy, dec!(25));
        assert_eq!(outcome.profit_factor, ProfitFactor::Ratio(dec!(2)));
        assert_eq!(trades.len(), 5);
    }

    #[test]
    fn empty_scenario_is_not_enough_data() {
        let trades = sample();
        assert!(what_if_simulate(&trades, |t| t.pnl > dec!(1000)).unwrap_err().is_not_enough_data());
    }

    #[test]
    fn comparison_reports_deltas_against_actual() {
        let trades = sample();
        let comparison = compare_scenario(&trades, |t| t.side == TradeSide::Long).unwrap();

        assert_eq!(comparison.baseline.total_pnl, dec!(0));
        assert_eq!(comparison.delta.total_pnl, dec!(50));
        assert_eq!(comparison.delta.trade_count, -3);
        assert_eq!(comparison.delta.expectancy, dec!(25));
        assert_eq!(comparison.delta.win_rate, dec!(0.1));
    }

    #[test]
    fn trade_filter_works_as_a_predicate() {
        let record = SentimentRecord {
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            value: dec!(80),
            classification: "Extreme Greed".to_string(),
        };
        let joined: Vec<JoinedTrade> = sample()
            .into_iter()
            .map(|t| {
                let sentiment = (t.side == TradeSide::Short).then(|| record.clone());
                JoinedTrade { trade: t, sentiment }
            })
            .collect();

        let filter = TradeFilter::all().with_moods(["Extreme Greed"]);
        let outcome = what_if_simulate(&joined, |j| filter.matches(j)).unwrap();
        assert_eq!(outcome.trade_count, 3);
        assert_eq!(outcome.total_pnl, dec!(-50));
    }
}
