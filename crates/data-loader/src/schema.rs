//! Column layouts of the two input files.
//!
//! Headers are resolved to column indices once, before any row is read, so a
//! renamed or missing column fails the load immediately instead of surfacing as
//! a missing value deep inside a metric.

use crate::error::LoadError;
use csv::StringRecord;
use rust_decimal::Decimal;
use std::str::FromStr;

pub const TRADE_TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M";
pub const SENTIMENT_DATE_FORMAT: &str = "%Y-%m-%d";

pub const TRADES_EXPECTED: &str =
    "CSV with columns 'Timestamp IST' (DD-MM-YYYY HH:MM), 'Closed PnL' (decimal), 'Side' (long/short or BUY/SELL), 'Symbol' or 'Coin'";
pub const SENTIMENT_EXPECTED: &str =
    "CSV with columns 'date' (YYYY-MM-DD), 'value' (number), 'classification' (e.g. Fear, Greed)";

struct Column {
    name: &'static str,
    aliases: &'static [&'static str],
}

const TIMESTAMP: Column = Column { name: "Timestamp IST", aliases: &["Timestamp"] };
const CLOSED_PNL: Column = Column { name: "Closed PnL", aliases: &[] };
const SIDE: Column = Column { name: "Side", aliases: &[] };
const SYMBOL: Column = Column { name: "Symbol", aliases: &["Coin"] };
const ENTRY_TIME: Column = Column { name: "Entry Time", aliases: &[] };
const EXIT_TIME: Column = Column { name: "Exit Time", aliases: &[] };

const DATE: Column = Column { name: "date", aliases: &[] };
const VALUE: Column = Column { name: "value", aliases: &[] };
const CLASSIFICATION: Column = Column { name: "classification", aliases: &[] };

fn normalize(header: &str) -> &str {
    header.trim_start_matches('\u{feff}').trim()
}

/// Finds a column by its canonical name first, then by alias.
fn locate(headers: &StringRecord, column: &Column) -> Option<usize> {
    std::iter::once(column.name)
        .chain(column.aliases.iter().copied())
        .find_map(|wanted| {
            headers
                .iter()
                .position(|h| normalize(h).eq_ignore_ascii_case(wanted))
        })
}

fn require(
    headers: &StringRecord,
    column: &Column,
    file: &str,
    expected: &'static str,
) -> Result<usize, LoadError> {
    locate(headers, column).ok_or_else(|| LoadError::MissingColumn {
        file: file.to_string(),
        column: column.name,
        found: headers.iter().map(normalize).collect::<Vec<_>>().join(", "),
        expected,
    })
}

/// Resolved column positions of the trading history export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeSchema {
    pub timestamp: usize,
    pub pnl: usize,
    pub side: usize,
    pub symbol: usize,
    /// Entry/exit times are only used when both columns exist.
    pub entry_exit: Option<(usize, usize)>,
}

impl TradeSchema {
    pub fn from_headers(headers: &StringRecord, file: &str) -> Result<Self, LoadError> {
        let entry = locate(headers, &ENTRY_TIME);
        let exit = locate(headers, &EXIT_TIME);
        Ok(Self {
            timestamp: require(headers, &TIMESTAMP, file, TRADES_EXPECTED)?,
            pnl: require(headers, &CLOSED_PNL, file, TRADES_EXPECTED)?,
            side: require(headers, &SIDE, file, TRADES_EXPECTED)?,
            symbol: require(headers, &SYMBOL, file, TRADES_EXPECTED)?,
            entry_exit: entry.zip(exit),
        })
    }

    pub fn pnl_column(&self) -> &'static str {
        CLOSED_PNL.name
    }

    pub fn side_column(&self) -> &'static str {
        SIDE.name
    }
}

/// Resolved column positions of the Fear & Greed index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentimentSchema {
    pub date: usize,
    pub value: usize,
    pub classification: usize,
}

impl SentimentSchema {
    pub fn from_headers(headers: &StringRecord, file: &str) -> Result<Self, LoadError> {
        Ok(Self {
            date: require(headers, &DATE, file, SENTIMENT_EXPECTED)?,
            value: require(headers, &VALUE, file, SENTIMENT_EXPECTED)?,
            classification: require(headers, &CLASSIFICATION, file, SENTIMENT_EXPECTED)?,
        })
    }

    pub fn date_column(&self) -> &'static str {
        DATE.name
    }

    pub fn value_column(&self) -> &'static str {
        VALUE.name
    }

    pub fn classification_column(&self) -> &'static str {
        CLASSIFICATION.name
    }
}

/// Parses plain or scientific decimal notation (`-12.5`, `1.2E-5`).
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn resolves_hyperliquid_style_headers() {
        let headers = StringRecord::from(vec![
            "Account", "Coin", "Execution Price", "Side", "Timestamp IST", "Closed PnL", "Fee",
        ]);
        let schema = TradeSchema::from_headers(&headers, "historical_data.csv").unwrap();
        assert_eq!(schema.symbol, 1);
        assert_eq!(schema.side, 3);
        assert_eq!(schema.timestamp, 4);
        assert_eq!(schema.pnl, 5);
        assert_eq!(schema.entry_exit, None);
    }

    #[test]
    fn entry_exit_needs_both_columns() {
        let both = StringRecord::from(vec!["Timestamp IST", "Closed PnL", "Side", "Symbol", "Entry Time", "Exit Time"]);
        let one = StringRecord::from(vec!["Timestamp IST", "Closed PnL", "Side", "Symbol", "Entry Time"]);
        assert_eq!(TradeSchema::from_headers(&both, "t.csv").unwrap().entry_exit, Some((4, 5)));
        assert_eq!(TradeSchema::from_headers(&one, "t.csv").unwrap().entry_exit, None);
    }

    #[test]
    fn headers_are_trimmed_and_case_insensitive() {
        let headers = StringRecord::from(vec!["\u{feff}Date", " Value ", "CLASSIFICATION"]);
        let schema = SentimentSchema::from_headers(&headers, "fear_greed_index.csv").unwrap();
        assert_eq!((schema.date, schema.value, schema.classification), (0, 1, 2));
    }

    #[test]
    fn missing_column_lists_what_was_found() {
        let headers = StringRecord::from(vec!["Timestamp IST", "Side", "Symbol"]);
        let err = TradeSchema::from_headers(&headers, "historical_data.csv").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Closed PnL"));
        assert!(message.contains("Timestamp IST, Side, Symbol"));
        assert!(message.contains("historical_data.csv"));
    }

    #[test]
    fn decimal_parsing_accepts_scientific_notation() {
        assert_eq!(parse_decimal(" -12.50 "), Some(dec!(-12.50)));
        assert_eq!(parse_decimal("1.5e-2"), Some(dec!(0.015)));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("n/a"), None);
    }
}
