//! Terminal rendering of the analytics results.

use analytics::{
    DailySummary, DashboardReport, HeatmapCell, HoldingBreakdown, HoldingBucket, HoldingRange, HoldingRangeStats,
    HoldingTimeSummary, HourBucket, MonthBucket, MoodSideStats, MoodStats, PerformanceReport, ProfitFactor,
    ScenarioComparison, ScenarioOutcome, SentimentValueStats, TopEvents, WeekdayBucket,
};
use chrono::Weekday;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub const NO_DATA: &str = "No data for this selection.";

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h).add_attribute(Attribute::Bold)));
    table
}

fn heading(title: &str) {
    println!();
    println!("{title}");
    println!();
}

pub fn format_pnl(value: Decimal) -> String {
    if value >= Decimal::ZERO {
        format!("+{value:.2}")
    } else {
        format!("{value:.2}")
    }
}

pub fn format_percent(fraction: Decimal) -> String {
    format!("{:.1}%", fraction * Decimal::ONE_HUNDRED)
}

pub fn format_profit_factor(pf: &ProfitFactor) -> String {
    match pf {
        ProfitFactor::Ratio(value) => format!("{value:.2}"),
        ProfitFactor::NoLosses => "∞ (no losses)".to_string(),
    }
}

fn format_optional(value: Option<Decimal>) -> String {
    value.map(format_pnl).unwrap_or_else(|| "-".to_string())
}

/// `Greed (72)`, or `-` for a day without sentiment.
fn format_mood(classification: Option<&str>, value: Option<Decimal>) -> String {
    match (classification, value) {
        (Some(mood), Some(value)) => format!("{mood} ({value:.0})"),
        (Some(mood), None) => mood.to_string(),
        _ => "-".to_string(),
    }
}

fn pnl_cell(value: Decimal) -> Cell {
    let color = if value >= Decimal::ZERO { Color::Green } else { Color::Red };
    Cell::new(format_pnl(value)).fg(color)
}

pub fn print_summary(report: &PerformanceReport) {
    heading("Performance Summary");
    let mut table = new_table(&["Metric", "Value"]);
    let rows: Vec<(&str, String)> = vec![
        ("Total trades", report.total_trades.to_string()),
        (
            "Wins / Losses / Breakeven",
            format!("{} / {} / {}", report.winning_trades, report.losing_trades, report.breakeven_trades),
        ),
        ("Win rate", format_percent(report.win_rate)),
        ("Net PnL", format_pnl(report.total_net_profit)),
        ("Gross profit", format_pnl(report.gross_profit)),
        ("Gross loss", format_pnl(-report.gross_loss)),
        ("Profit factor", format_profit_factor(&report.profit_factor)),
        ("Expectancy", format_pnl(report.expectancy)),
        ("Average win", format_optional(report.average_win)),
        ("Average loss", format_optional(report.average_loss)),
        (
            "Payoff ratio",
            report.payoff_ratio.map(|r| format!("{r:.2}")).unwrap_or_else(|| "-".to_string()),
        ),
        (
            "Break-even win rate",
            report.breakeven_win_rate.map(format_percent).unwrap_or_else(|| "-".to_string()),
        ),
        ("Largest win", format_optional(report.largest_win)),
        ("Largest loss", format_optional(report.largest_loss)),
        (
            "PnL std dev",
            report.pnl_std_dev.map(|sd| format!("{sd:.2}")).unwrap_or_else(|| "-".to_string()),
        ),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    println!("{table}");
}

pub fn print_hours(buckets: &[HourBucket], golden: Option<&HourBucket>, worst: Option<&HourBucket>) {
    heading("Performance by Hour of Day");
    let mut table = new_table(&["Hour", "Trades", "Win%", "Total PnL", "Avg PnL"]);
    for b in buckets {
        table.add_row(vec![
            Cell::new(format!("{:02}:00", b.hour)),
            Cell::new(b.stats.trade_count),
            Cell::new(format_percent(b.stats.win_rate)),
            pnl_cell(b.stats.total_pnl),
            Cell::new(format_pnl(b.stats.average_pnl)),
        ]);
    }
    println!("{table}");
    if let Some(golden) = golden {
        println!("  Golden hour: {:02}:00 ({})", golden.hour, format_pnl(golden.stats.total_pnl));
    }
    if let Some(worst) = worst {
        println!("  Worst hour:  {:02}:00 ({})", worst.hour, format_pnl(worst.stats.total_pnl));
    }
}

pub fn print_weekdays(buckets: &[WeekdayBucket]) {
    heading("Performance by Day of Week");
    let mut table = new_table(&["Day", "Trades", "Win%", "Total PnL", "Avg PnL"]);
    for b in buckets {
        table.add_row(vec![
            Cell::new(b.weekday),
            Cell::new(b.stats.trade_count),
            Cell::new(format_percent(b.stats.win_rate)),
            pnl_cell(b.stats.total_pnl),
            Cell::new(format_pnl(b.stats.average_pnl)),
        ]);
    }
    println!("{table}");
}

pub fn print_months(buckets: &[MonthBucket]) {
    heading("Performance by Month");
    let mut table = new_table(&["Month", "Trades", "Win%", "Total PnL", "Avg PnL"]);
    for b in buckets {
        table.add_row(vec![
            Cell::new(&b.label),
            Cell::new(b.stats.trade_count),
            Cell::new(format_percent(b.stats.win_rate)),
            pnl_cell(b.stats.total_pnl),
            Cell::new(format_pnl(b.stats.average_pnl)),
        ]);
    }
    println!("{table}");
}

/// One row per weekday, one column per hour that saw a trade.
pub fn print_heatmap(cells: &[HeatmapCell]) {
    heading("PnL Heatmap (weekday x hour)");
    let mut hours: Vec<u32> = cells.iter().map(|c| c.hour).collect();
    hours.sort_unstable();
    hours.dedup();

    let mut rows: BTreeMap<u32, (Weekday, BTreeMap<u32, Decimal>)> = BTreeMap::new();
    for cell in cells {
        rows.entry(cell.weekday.num_days_from_monday())
            .or_insert_with(|| (cell.weekday, BTreeMap::new()))
            .1
            .insert(cell.hour, cell.total_pnl);
    }

    let mut headers = vec!["Day".to_string()];
    headers.extend(hours.iter().map(|h| format!("{h:02}")));
    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    let mut table = new_table(&header_refs);

    for (weekday, by_hour) in rows.values() {
        let mut row = vec![Cell::new(weekday)];
        row.extend(hours.iter().map(|h| match by_hour.get(h) {
            Some(pnl) => pnl_cell(*pnl),
            None => Cell::new(""),
        }));
        table.add_row(row);
    }
    println!("{table}");
}

pub fn print_holding(
    breakdown: &HoldingBreakdown,
    summary: Option<&HoldingTimeSummary>,
    optimal: Option<HoldingBucket>,
) {
    heading("Performance by Holding Time");
    let mut table = new_table(&["Bucket", "Trades", "Win%", "Total PnL", "Avg PnL"]);
    for b in &breakdown.buckets {
        table.add_row(vec![
            Cell::new(b.bucket.label()),
            Cell::new(b.stats.trade_count),
            Cell::new(format_percent(b.stats.win_rate)),
            pnl_cell(b.stats.total_pnl),
            Cell::new(format_pnl(b.stats.average_pnl)),
        ]);
    }
    println!("{table}");
    if let Some(summary) = summary {
        println!(
            "  Holding time over {} trades: mean {:.2}h, median {:.2}h",
            summary.trades, summary.mean_hours, summary.median_hours
        );
    }
    if let Some(optimal) = optimal {
        println!("  Best average PnL per trade: {}", optimal.label());
    }
    if breakdown.unclassified > 0 {
        println!("  {} trades without a usable holding time", breakdown.unclassified);
    }
}

pub fn print_holding_ranges(ranges: &[HoldingRangeStats], best: Option<HoldingRange>) {
    heading("Optimal Holding Time");
    let mut table = new_table(&["Duration", "Trades", "Avg PnL", "Total PnL"]);
    for r in ranges {
        table.add_row(vec![
            Cell::new(r.range.label()),
            Cell::new(r.stats.trade_count),
            Cell::new(format_pnl(r.stats.average_pnl)),
            pnl_cell(r.stats.total_pnl),
        ]);
    }
    println!("{table}");
    if let Some(best) = best {
        println!("  Most profitable duration: {}", best.label());
    }
}

pub fn print_sentiment(
    moods: &[MoodStats],
    most_profitable: Option<&str>,
    sides: Option<&[MoodSideStats]>,
    values: Option<&[SentimentValueStats]>,
) {
    heading("Performance by Market Mood");
    let mut table = new_table(&["Mood", "Trades", "Wins", "Losses", "Win%", "Avg PnL", "Total PnL", "Volatility"]);
    for m in moods {
        table.add_row(vec![
            Cell::new(&m.classification),
            Cell::new(m.trade_count),
            Cell::new(m.winning_trades),
            Cell::new(m.losing_trades),
            Cell::new(format_percent(m.win_rate)),
            Cell::new(format_pnl(m.average_pnl)),
            pnl_cell(m.total_pnl),
            Cell::new(m.pnl_std_dev.map(|sd| format!("{sd:.2}")).unwrap_or_else(|| "-".to_string())),
        ]);
    }
    println!("{table}");
    if let Some(mood) = most_profitable {
        println!("  Most profitable mood: {mood}");
    }

    if let Some(sides) = sides {
        heading("Long vs Short per Mood");
        let mut table = new_table(&["Mood", "Side", "Trades", "Win%", "Avg PnL"]);
        for s in sides {
            table.add_row(vec![
                Cell::new(&s.classification),
                Cell::new(s.side),
                Cell::new(s.stats.trade_count),
                Cell::new(format_percent(s.stats.win_rate)),
                Cell::new(format_pnl(s.stats.average_pnl)),
            ]);
        }
        println!("{table}");
    }

    if let Some(values) = values {
        heading("PnL by Index Value");
        let mut table = new_table(&["Value", "Mood", "Trades", "Avg PnL", "Total PnL"]);
        for v in values {
            table.add_row(vec![
                Cell::new(v.value),
                Cell::new(&v.classification),
                Cell::new(v.trade_count),
                Cell::new(format_pnl(v.average_pnl)),
                pnl_cell(v.total_pnl),
            ]);
        }
        println!("{table}");
    }
}

pub fn print_events(events: &TopEvents) {
    heading("Top Gain and Loss Days");
    let mut table = new_table(&["", "Date", "Net PnL", "Trades", "Sentiment"]);
    for (label, list) in [("Gain", &events.gains), ("Loss", &events.losses)] {
        for e in list {
            table.add_row(vec![
                Cell::new(label),
                Cell::new(e.date),
                pnl_cell(e.net_pnl),
                Cell::new(e.trade_count),
                Cell::new(format_mood(e.classification.as_deref(), e.sentiment_value)),
            ]);
        }
    }
    println!("{table}");
}

pub fn print_daily(days: &[DailySummary]) {
    heading("Daily PnL and Sentiment");
    let mut table = new_table(&["Date", "Net PnL", "Trades", "Index", "Mood"]);
    for d in days {
        table.add_row(vec![
            Cell::new(d.date),
            pnl_cell(d.net_pnl),
            Cell::new(d.trade_count),
            Cell::new(d.sentiment_value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())),
            Cell::new(d.classification.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
}

fn outcome_cells(label: &str, outcome: &ScenarioOutcome) -> Vec<Cell> {
    vec![
        Cell::new(label),
        Cell::new(outcome.trade_count),
        pnl_cell(outcome.total_pnl),
        Cell::new(format_percent(outcome.win_rate)),
        Cell::new(format_pnl(outcome.expectancy)),
        Cell::new(format_profit_factor(&outcome.profit_factor)),
    ]
}

pub fn print_scenario(comparison: &ScenarioComparison) {
    heading("What-if Scenario");
    let mut table = new_table(&["", "Trades", "Total PnL", "Win%", "Expectancy", "Profit Factor"]);
    table.add_row(outcome_cells("Actual", &comparison.baseline));
    table.add_row(outcome_cells("Scenario", &comparison.scenario));
    table.add_row(vec![
        Cell::new("vs Actual").add_attribute(Attribute::Bold),
        Cell::new(format!("{:+}", comparison.delta.trade_count)),
        pnl_cell(comparison.delta.total_pnl),
        Cell::new(format!("{:+.1} pts", comparison.delta.win_rate * Decimal::ONE_HUNDRED)),
        Cell::new(format_pnl(comparison.delta.expectancy)),
        Cell::new(""),
    ]);
    println!("{table}");
}

pub fn print_dashboard(report: &DashboardReport) {
    print_summary(&report.summary);
    if let Some(hours) = &report.hours {
        print_hours(hours, report.golden_hour.as_ref(), report.worst_hour.as_ref());
    }
    if let Some(weekdays) = &report.weekdays {
        print_weekdays(weekdays);
    }
    if let Some(months) = &report.months {
        print_months(months);
    }
    if let Some(heatmap) = &report.heatmap {
        print_heatmap(heatmap);
    }
    if let Some(holding) = &report.holding {
        print_holding(holding, report.holding_time.as_ref(), report.optimal_holding_bucket);
    }
    if let Some(ranges) = &report.holding_ranges {
        print_holding_ranges(ranges, report.best_holding_range);
    }
    if let Some(moods) = &report.sentiment {
        print_sentiment(
            moods,
            report.most_profitable_mood.as_deref(),
            report.side_by_sentiment.as_deref(),
            report.sentiment_values.as_deref(),
        );
    }
    if let Some(events) = &report.events {
        print_events(events);
    }
    if let Some(daily) = &report.daily {
        print_daily(daily);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pnl_carries_an_explicit_sign() {
        assert_eq!(format_pnl(dec!(12.5)), "+12.50");
        assert_eq!(format_pnl(dec!(-3)), "-3.00");
        assert_eq!(format_pnl(Decimal::ZERO), "+0.00");
    }

    #[test]
    fn percent_and_profit_factor() {
        assert_eq!(format_percent(dec!(0.5)), "50.0%");
        assert_eq!(format_profit_factor(&ProfitFactor::Ratio(dec!(2))), "2.00");
        assert_eq!(format_profit_factor(&ProfitFactor::NoLosses), "∞ (no losses)");
    }

    #[test]
    fn event_mood_shows_label_and_score() {
        assert_eq!(format_mood(Some("Extreme Fear"), Some(dec!(12))), "Extreme Fear (12)");
        assert_eq!(format_mood(None, None), "-");
    }
}
