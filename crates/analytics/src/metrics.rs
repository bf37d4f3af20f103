//! Aggregate trade statistics: win rate, profit factor, expectancy and the
//! full `PerformanceReport`.
//!
//! Every function accepts any slice whose items are `AsRef<Trade>`, so the same
//! code runs over raw trades, joined trades and filtered subsets of references.

use crate::error::AnalyticsError;
use crate::report::{PerformanceReport, ProfitFactor};
use core_types::Trade;
use rust_decimal::{Decimal, MathematicalOps};
use tracing::warn;

fn ensure_not_empty<T>(trades: &[T], metric: &str) -> Result<(), AnalyticsError> {
    if trades.is_empty() {
        return Err(AnalyticsError::NotEnoughData(format!("{metric} needs at least one trade")));
    }
    Ok(())
}

/// Fraction of trades with a positive PnL, in `[0, 1]`.
pub fn compute_win_rate<T: AsRef<Trade>>(trades: &[T]) -> Result<Decimal, AnalyticsError> {
    ensure_not_empty(trades, "win rate")?;
    let wins = trades.iter().filter(|t| t.as_ref().is_win()).count();
    Ok(ratio(wins, trades.len()))
}

/// Gross profit divided by the absolute gross loss.
///
/// A set without a single losing trade has no defined ratio and yields
/// `ProfitFactor::NoLosses`.
pub fn compute_profit_factor<T: AsRef<Trade>>(trades: &[T]) -> Result<ProfitFactor, AnalyticsError> {
    ensure_not_empty(trades, "profit factor")?;
    let (gross_profit, gross_loss) = gross(trades)?;
    ProfitFactor::from_gross(gross_profit, gross_loss)
}

/// Mean PnL per trade.
pub fn compute_expectancy<T: AsRef<Trade>>(trades: &[T]) -> Result<Decimal, AnalyticsError> {
    ensure_not_empty(trades, "expectancy")?;
    Ok(total_pnl(trades)? / Decimal::from(trades.len()))
}

/// Computes every aggregate metric in a single pass.
pub fn summarize<T: AsRef<Trade>>(trades: &[T]) -> Result<PerformanceReport, AnalyticsError> {
    ensure_not_empty(trades, "performance summary")?;

    let mut report = PerformanceReport::new();
    report.total_trades = trades.len();

    for item in trades {
        let trade: &Trade = item.as_ref();
        let pnl = trade.pnl;
        report.total_net_profit = add(report.total_net_profit, pnl, "net profit")?;

        if trade.is_win() {
            report.gross_profit = add(report.gross_profit, pnl, "gross profit")?;
            report.winning_trades += 1;
            report.largest_win = Some(report.largest_win.map_or(pnl, |best| best.max(pnl)));
        } else if trade.is_loss() {
            report.gross_loss = add(report.gross_loss, pnl.abs(), "gross loss")?;
            report.losing_trades += 1;
            report.largest_loss = Some(report.largest_loss.map_or(pnl, |worst| worst.min(pnl)));
        } else {
            report.breakeven_trades += 1;
        }
    }

    report.win_rate = ratio(report.winning_trades, report.total_trades);
    report.profit_factor = ProfitFactor::from_gross(report.gross_profit, report.gross_loss)?;
    report.expectancy = report.total_net_profit / Decimal::from(report.total_trades);

    if report.winning_trades > 0 {
        report.average_win = Some(report.gross_profit / Decimal::from(report.winning_trades));
    }
    if report.losing_trades > 0 {
        let average_loss = report.gross_loss / Decimal::from(report.losing_trades);
        report.average_loss = Some(-average_loss);
        report.payoff_ratio = report.average_win.and_then(|win| win.checked_div(average_loss));
        report.breakeven_win_rate = report
            .average_win
            .and_then(|win| win.checked_add(average_loss))
            .and_then(|sum| average_loss.checked_div(sum));
    }

    let pnls: Vec<Decimal> = trades.iter().map(|t| t.as_ref().pnl).collect();
    report.pnl_std_dev = sample_std_dev(&pnls)?;

    Ok(report)
}

pub(crate) fn overflow(figure: &str) -> AnalyticsError {
    AnalyticsError::InternalError(format!("{figure} exceeds the decimal range"))
}

fn add(total: Decimal, value: Decimal, figure: &str) -> Result<Decimal, AnalyticsError> {
    total.checked_add(value).ok_or_else(|| overflow(figure))
}

/// Overflow-checked sum.
pub(crate) fn checked_sum<I>(values: I) -> Result<Decimal, AnalyticsError>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, |total, value| add(total, value, "PnL total"))
}

pub(crate) fn total_pnl<T: AsRef<Trade>>(trades: &[T]) -> Result<Decimal, AnalyticsError> {
    checked_sum(trades.iter().map(|t| t.as_ref().pnl))
}

/// Gross profit and the absolute gross loss.
pub(crate) fn gross<T: AsRef<Trade>>(trades: &[T]) -> Result<(Decimal, Decimal), AnalyticsError> {
    trades.iter().map(|t| t.as_ref().pnl).try_fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(profit, loss), pnl| {
            if pnl > Decimal::ZERO {
                Ok((add(profit, pnl, "gross profit")?, loss))
            } else {
                Ok((profit, add(loss, -pnl, "gross loss")?))
            }
        },
    )
}

/// `part / whole`; callers guarantee `whole > 0`.
pub(crate) fn ratio(part: usize, whole: usize) -> Decimal {
    Decimal::from(part) / Decimal::from(whole)
}

/// Sample standard deviation (n - 1 denominator).
///
/// `None` below two values, and also when the squared deviations leave the
/// decimal range.
pub(crate) fn sample_std_dev(values: &[Decimal]) -> Result<Option<Decimal>, AnalyticsError> {
    if values.len() < 2 {
        return Ok(None);
    }

    let count = Decimal::from(values.len());
    let mean = checked_sum(values.iter().copied())? / count;
    let squared = values.iter().try_fold(Decimal::ZERO, |total, v| {
        let deviation = v.checked_sub(mean)?;
        total.checked_add(deviation.checked_mul(deviation)?)
    });
    let Some(squared) = squared else {
        warn!(values = values.len(), "PnL dispersion is out of the decimal range; skipping std dev.");
        return Ok(None);
    };

    (squared / (count - Decimal::ONE))
        .sqrt()
        .map(Some)
        .ok_or_else(|| AnalyticsError::InternalError("Failed to calculate square root for variance".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use core_types::TradeSide;
    use rust_decimal_macros::dec;

    fn trade(pnl: Decimal, ts: &str) -> Trade {
        let timestamp = NaiveDateTime::parse_from_str(ts, "%d-%m-%Y %H:%M").ok();
        Trade::new(1, timestamp, pnl, TradeSide::Long, "BTC")
    }

    fn reference_pair() -> Vec<Trade> {
        vec![trade(dec!(100), "01-01-2024 10:00"), trade(dec!(-50), "01-01-2024 11:00")]
    }

    #[test]
    fn reference_pair_metrics() {
        let trades = reference_pair();
        assert_eq!(compute_win_rate(&trades).unwrap(), dec!(0.5));
        assert_eq!(compute_profit_factor(&trades).unwrap(), ProfitFactor::Ratio(dec!(2)));
        assert_eq!(compute_expectancy(&trades).unwrap(), dec!(25));
    }

    #[test]
    fn empty_input_signals_not_enough_data() {
        let trades: Vec<Trade> = Vec::new();
        assert!(compute_win_rate(&trades).unwrap_err().is_not_enough_data());
        assert!(compute_profit_factor(&trades).unwrap_err().is_not_enough_data());
        assert!(compute_expectancy(&trades).unwrap_err().is_not_enough_data());
        assert!(summarize(&trades).unwrap_err().is_not_enough_data());
    }

    #[test]
    fn profit_factor_without_losses_is_sentinel() {
        let trades = vec![trade(dec!(10), "01-01-2024 10:00"), trade(dec!(0), "01-01-2024 11:00")];
        assert_eq!(compute_profit_factor(&trades).unwrap(), ProfitFactor::NoLosses);

        let flat = vec![trade(dec!(0), "01-01-2024 10:00")];
        assert_eq!(compute_profit_factor(&flat).unwrap(), ProfitFactor::NoLosses);
    }

    #[test]
    fn profit_factor_with_only_losses_is_zero() {
        let trades = vec![trade(dec!(-10), "01-01-2024 10:00"), trade(dec!(-5), "01-01-2024 11:00")];
        assert_eq!(compute_profit_factor(&trades).unwrap(), ProfitFactor::Ratio(Decimal::ZERO));
    }

    #[test]
    fn win_rate_stays_in_unit_interval() {
        let sets = [
            vec![dec!(1)],
            vec![dec!(-1)],
            vec![dec!(0), dec!(0), dec!(3)],
            vec![dec!(5), dec!(-2), dec!(7), dec!(-9), dec!(0.01)],
        ];
        for pnls in sets {
            let trades: Vec<Trade> = pnls.into_iter().map(|p| trade(p, "01-01-2024 10:00")).collect();
            let rate = compute_win_rate(&trades).unwrap();
            assert!(rate >= Decimal::ZERO && rate <= Decimal::ONE, "{rate} out of range");
        }
    }

    #[test]
    fn summary_counts_breakeven_separately() {
        let trades = vec![
            trade(dec!(30), "01-01-2024 10:00"),
            trade(dec!(10), "01-01-2024 10:05"),
            trade(dec!(-20), "01-01-2024 10:10"),
            trade(dec!(0), "01-01-2024 10:15"),
        ];
        let report = summarize(&trades).unwrap();

        assert_eq!(report.total_trades, 4);
        assert_eq!(report.winning_trades, 2);
        assert_eq!(report.losing_trades, 1);
        assert_eq!(report.breakeven_trades, 1);
        assert_eq!(report.total_net_profit, dec!(20));
        assert_eq!(report.gross_profit, dec!(40));
        assert_eq!(report.gross_loss, dec!(20));
        assert_eq!(report.win_rate, dec!(0.5));
        assert_eq!(report.profit_factor, ProfitFactor::Ratio(dec!(2)));
        assert_eq!(report.expectancy, dec!(5));
        assert_eq!(report.average_win, Some(dec!(20)));
        assert_eq!(report.average_loss, Some(dec!(-20)));
        assert_eq!(report.payoff_ratio, Some(dec!(1)));
        assert_eq!(report.largest_win, Some(dec!(30)));
        assert_eq!(report.largest_loss, Some(dec!(-20)));
    }

    #[test]
    fn summary_agrees_with_single_metrics() {
        let trades = reference_pair();
        let report = summarize(&trades).unwrap();
        assert_eq!(report.win_rate, compute_win_rate(&trades).unwrap());
        assert_eq!(report.expectancy, compute_expectancy(&trades).unwrap());
        assert_eq!(report.profit_factor, compute_profit_factor(&trades).unwrap());
    }

    #[test]
    fn std_dev_uses_sample_denominator() {
        // values 2, 4, 4, 4, 5, 5, 7, 9: sum of squared deviations = 32, n - 1 = 7
        let values = [2, 4, 4, 4, 5, 5, 7, 9].map(Decimal::from);
        let sd = sample_std_dev(&values).unwrap().unwrap();
        let expected = (dec!(32) / dec!(7)).sqrt().unwrap();
        assert_eq!(sd, expected);
        assert_eq!(sample_std_dev(&[dec!(1)]).unwrap(), None);
    }

    #[test]
    fn huge_pnl_values_do_not_panic() {
        let trades = vec![
            trade(dec!(300000000000000), "01-01-2024 10:00"),
            trade(dec!(-300000000000000), "01-01-2024 11:00"),
        ];
        let report = summarize(&trades).unwrap();
        assert_eq!(report.total_net_profit, Decimal::ZERO);
        assert_eq!(report.profit_factor, ProfitFactor::Ratio(Decimal::ONE));
        assert_eq!(report.pnl_std_dev, None);
    }

    #[test]
    fn totals_past_the_decimal_range_are_an_error() {
        let trades = vec![trade(Decimal::MAX, "01-01-2024 10:00"), trade(Decimal::MAX, "01-01-2024 11:00")];
        assert!(matches!(summarize(&trades), Err(AnalyticsError::InternalError(_))));
        assert!(matches!(compute_expectancy(&trades), Err(AnalyticsError::InternalError(_))));
        assert!(matches!(compute_profit_factor(&trades), Err(AnalyticsError::InternalError(_))));
    }

    #[test]
    fn breakeven_win_rate_from_average_win_and_loss() {
        // average win 30, average loss 10: break even at 10 / 40
        let trades = vec![
            trade(dec!(40), "01-01-2024 10:00"),
            trade(dec!(20), "01-01-2024 10:05"),
            trade(dec!(-10), "01-01-2024 10:10"),
        ];
        let report = summarize(&trades).unwrap();
        assert_eq!(report.breakeven_win_rate, Some(dec!(0.25)));

        let no_losses = summarize(&[trade(dec!(5), "01-01-2024 10:00")]).unwrap();
        assert_eq!(no_losses.breakeven_win_rate, None);
    }

    #[test]
    fn works_over_reference_slices() {
        let trades = reference_pair();
        let refs: Vec<&Trade> = trades.iter().collect();
        assert_eq!(compute_expectancy(&refs).unwrap(), dec!(25));
    }
}
