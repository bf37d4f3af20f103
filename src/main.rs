use analytics::{AnalyticsEngine, AnalyticsError};
use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, OutputFormat};
use configuration::{load_config, Config, LoggingSettings};
use core_types::{JoinedTrade, TradeFilter};
use data_loader::{load_dataset, Dataset};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod output;

const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// The main entry point for the Moodlens command-line dashboard.
fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // A missing .env file is fine; it only carries optional MOODLENS__* overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Only an explicitly named config file has to exist.
    let (config_path, required) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    let mut config = load_config(&config_path, required)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;
    if let Some(dir) = &cli.data_dir {
        config.data.directory = dir.clone();
    }

    let _guard = init_tracing(&config.logging)?;
    debug!(?config, "Configuration loaded.");

    let filter = cli.filter.merge_into(config.filters.clone());
    filter.validate().context("Invalid trade filter")?;

    let dataset = load_dataset(&config.data)?;
    let selection = filter.apply(&dataset.joined);
    info!(selected = selection.len(), "Selection ready.");

    if cli.format == OutputFormat::Table {
        print_header(&dataset, &filter, selection.len());
    }

    execute(&cli, &config, &dataset, &filter, &selection)
}

/// Sets up `tracing`: stderr always, plus a daily rolling file when a log
/// directory is configured. The returned guard must live until exit.
fn init_tracing(settings: &LoggingSettings) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .with_context(|| format!("Invalid logging level '{}'", settings.level))?;
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "moodlens.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry().with(env_filter).with(stderr_layer).try_init()?;
            Ok(None)
        }
    }
}

fn print_header(dataset: &Dataset, filter: &TradeFilter, selected: usize) {
    let stats = &dataset.stats;
    println!(
        "{} trades loaded ({} without a usable timestamp, {} on days without sentiment), {} sentiment days",
        stats.trades, stats.coerced_timestamps, stats.unmatched_days, stats.sentiment_days
    );
    if filter.is_identity() {
        println!("Selection: all {selected} trades");
    } else {
        println!("Selection: {selected} trades");
    }
}

fn execute(
    cli: &Cli,
    config: &Config,
    dataset: &Dataset,
    filter: &TradeFilter,
    selection: &[&JoinedTrade],
) -> Result<()> {
    let format = cli.format;

    match &cli.command {
        Commands::Summary => render(format, analytics::summarize(selection), output::print_summary),
        Commands::Hours => render(
            format,
            analytics::bucket_by_hour(selection).map(|hours| HoursSection {
                golden_hour: analytics::golden_hour(selection).ok(),
                worst_hour: analytics::worst_hour(selection).ok(),
                hours,
            }),
            |s| output::print_hours(&s.hours, s.golden_hour.as_ref(), s.worst_hour.as_ref()),
        ),
        Commands::Weekdays => render(format, analytics::bucket_by_weekday(selection), |b| output::print_weekdays(b)),
        Commands::Months => render(format, analytics::bucket_by_month(selection), |b| output::print_months(b)),
        Commands::Heatmap => render(format, analytics::hour_weekday_heatmap(selection), |c| output::print_heatmap(c)),
        Commands::Holding => render(
            format,
            analytics::bucket_by_holding_duration(selection).map(|holding| {
                let ranges = analytics::bucket_by_holding_range(selection).ok();
                HoldingSection {
                    optimal_bucket: analytics::optimal_holding_bucket(&holding).map(|b| b.bucket),
                    holding_time: analytics::holding_time_summary(selection).ok(),
                    best_range: ranges.as_deref().and_then(analytics::best_holding_bucket).map(|r| r.range),
                    ranges,
                    holding,
                }
            }),
            |s| {
                output::print_holding(&s.holding, s.holding_time.as_ref(), s.optimal_bucket);
                if let Some(ranges) = &s.ranges {
                    output::print_holding_ranges(ranges, s.best_range);
                }
            },
        ),
        Commands::Sentiment => render(
            format,
            analytics::correlate_with_sentiment(selection).map(|moods| SentimentSection {
                most_profitable_mood: analytics::most_profitable_mood(&moods).map(|m| m.classification.clone()),
                side_by_sentiment: analytics::side_by_sentiment(selection).ok(),
                sentiment_values: analytics::pnl_by_sentiment_value(selection).ok(),
                moods,
            }),
            |s| {
                output::print_sentiment(
                    &s.moods,
                    s.most_profitable_mood.as_deref(),
                    s.side_by_sentiment.as_deref(),
                    s.sentiment_values.as_deref(),
                )
            },
        ),
        Commands::Events(args) => {
            let top = args.top.unwrap_or(config.analysis.top_events);
            render(format, analytics::top_events(selection, top), output::print_events)
        }
        Commands::Daily => render(format, analytics::daily_overview(selection), |d| output::print_daily(d)),
        Commands::Simulate(args) => {
            let scenario = args
                .scenario()
                .context("simulate needs at least one --only-mood or --only-side condition")?;
            info!(?scenario, "Running what-if scenario.");
            render(
                format,
                analytics::compare_scenario(selection, |j| scenario.matches(j)),
                output::print_scenario,
            )
        }
        Commands::Report => {
            let engine = AnalyticsEngine::new(config.analysis.top_events);
            render(format, engine.analyze(&dataset.joined, filter), output::print_dashboard)
        }
    }
}

#[derive(Debug, Serialize)]
struct HoursSection {
    hours: Vec<analytics::HourBucket>,
    golden_hour: Option<analytics::HourBucket>,
    worst_hour: Option<analytics::HourBucket>,
}

#[derive(Debug, Serialize)]
struct HoldingSection {
    holding: analytics::HoldingBreakdown,
    holding_time: Option<analytics::HoldingTimeSummary>,
    optimal_bucket: Option<analytics::HoldingBucket>,
    ranges: Option<Vec<analytics::HoldingRangeStats>>,
    best_range: Option<analytics::HoldingRange>,
}

#[derive(Debug, Serialize)]
struct SentimentSection {
    moods: Vec<analytics::MoodStats>,
    most_profitable_mood: Option<String>,
    side_by_sentiment: Option<Vec<analytics::MoodSideStats>>,
    sentiment_values: Option<Vec<analytics::SentimentValueStats>>,
}

/// Prints one result in the chosen format. An empty selection is a message, not an error.
fn render<T, F>(format: OutputFormat, result: Result<T, AnalyticsError>, print_table: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&T),
{
    let value = match result {
        Ok(value) => value,
        Err(AnalyticsError::NotEnoughData(reason)) => {
            info!(%reason, "Nothing to show.");
            match format {
                OutputFormat::Table => println!("{}", output::NO_DATA),
                OutputFormat::Json => println!("null"),
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    match format {
        OutputFormat::Table => print_table(&value),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value)?),
    }
    Ok(())
}
