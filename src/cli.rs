use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use core_types::{TradeFilter, TradeSide};
use std::path::PathBuf;

/// Trading performance against the market's Fear & Greed mood.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file [default: config.toml, skipped when absent].
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding both CSV files, overriding `data.directory`.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Selection flags. Any flag given replaces the matching `[filters]` entry of the config.
#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// First trade day to include (YYYY-MM-DD).
    #[arg(long, global = true)]
    pub from: Option<NaiveDate>,

    /// Last trade day to include (YYYY-MM-DD).
    #[arg(long, global = true)]
    pub to: Option<NaiveDate>,

    /// Keep only this symbol. Repeatable.
    #[arg(long = "symbol", global = true)]
    pub symbols: Vec<String>,

    /// Keep only this side (long/buy, short/sell). Repeatable.
    #[arg(long = "side", global = true)]
    pub sides: Vec<TradeSide>,

    /// Keep only trades on days with this classification, e.g. "Extreme Fear". Repeatable.
    #[arg(long = "mood", global = true)]
    pub moods: Vec<String>,
}

impl FilterArgs {
    /// Layers the command-line selection over the configured one.
    pub fn merge_into(&self, base: TradeFilter) -> TradeFilter {
        let mut filter = base;
        if self.from.is_some() {
            filter.from = self.from;
        }
        if self.to.is_some() {
            filter.to = self.to;
        }
        if !self.symbols.is_empty() {
            filter = filter.with_symbols(self.symbols.iter().cloned());
        }
        if !self.sides.is_empty() {
            filter = filter.with_sides(self.sides.iter().copied());
        }
        if !self.moods.is_empty() {
            filter = filter.with_moods(self.moods.iter().cloned());
        }
        filter
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Headline figures: win rate, profit factor, expectancy and more.
    Summary,
    /// Performance per hour of day, with the golden and worst hour.
    Hours,
    /// Performance per day of week.
    Weekdays,
    /// Performance per calendar month.
    Months,
    /// Total PnL per weekday and hour.
    Heatmap,
    /// Performance per holding-time bucket and the most profitable holding time.
    Holding,
    /// Performance per market mood.
    Sentiment,
    /// Best and worst trading days.
    Events(EventsArgs),
    /// Net PnL per day next to that day's sentiment.
    Daily,
    /// What if only some trades had been taken?
    Simulate(SimulateArgs),
    /// Every section at once.
    Report,
}

#[derive(Debug, Args)]
pub struct EventsArgs {
    /// How many gain and loss days to show, overriding `analysis.top_events`.
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Keep only trades on days with this classification. Repeatable.
    #[arg(long = "only-mood")]
    pub only_moods: Vec<String>,

    /// Keep only trades on this side. Repeatable.
    #[arg(long = "only-side")]
    pub only_sides: Vec<TradeSide>,
}

impl SimulateArgs {
    /// The scenario as a filter, or `None` when no condition was given.
    pub fn scenario(&self) -> Option<TradeFilter> {
        if self.only_moods.is_empty() && self.only_sides.is_empty() {
            return None;
        }
        let mut scenario = TradeFilter::all();
        if !self.only_moods.is_empty() {
            scenario = scenario.with_moods(self.only_moods.iter().cloned());
        }
        if !self.only_sides.is_empty() {
            scenario = scenario.with_sides(self.only_sides.iter().copied());
        }
        Some(scenario)
    }
}
