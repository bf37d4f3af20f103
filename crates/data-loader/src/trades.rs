use crate::error::LoadError;
use crate::open_source;
use crate::schema::{parse_decimal, TradeSchema, TRADES_EXPECTED, TRADE_TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use core_types::{Trade, TradeSide};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// The parsed trading history.
#[derive(Debug, Clone, Default)]
pub struct TradeTable {
    pub trades: Vec<Trade>,
    /// Rows whose timestamp was blank or not `DD-MM-YYYY HH:MM`. These trades
    /// are kept with no timestamp.
    pub coerced_timestamps: usize,
}

/// Loads the trading history export from disk.
pub fn load_trades(path: &Path) -> Result<TradeTable, LoadError> {
    let file = open_source(path, "trading history", TRADES_EXPECTED)?;
    let label = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    read_trades(file, &label)
}

/// Reads a trading history from any reader. `label` names the source in errors.
pub fn read_trades<R: Read>(reader: R, label: &str) -> Result<TradeTable, LoadError> {
    let csv_error = |source: csv::Error| LoadError::Csv { file: label.to_string(), source };

    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = reader.headers().map_err(csv_error)?.clone();
    let schema = TradeSchema::from_headers(&headers, label)?;
    debug!(file = label, ?schema, "Resolved trade columns");

    let mut table = TradeTable::default();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let row = index + 1;
        let trade = parse_row(&record, &schema, label, row)?;
        if trade.timestamp.is_none() {
            table.coerced_timestamps += 1;
        }
        table.trades.push(trade);
    }

    if table.coerced_timestamps > 0 {
        warn!(
            file = label,
            count = table.coerced_timestamps,
            expected = TRADE_TIMESTAMP_FORMAT,
            "Trades with a blank or malformed timestamp are kept but excluded from time-based views"
        );
    }
    info!(file = label, trades = table.trades.len(), "Loaded trading history");

    Ok(table)
}

fn parse_row(record: &StringRecord, schema: &TradeSchema, label: &str, row: usize) -> Result<Trade, LoadError> {
    let field = |column: usize| record.get(column).unwrap_or("");
    let parse_error = |column: &'static str, value: &str, expected: &'static str| LoadError::Parse {
        file: label.to_string(),
        row,
        column,
        value: value.to_string(),
        expected,
    };

    let raw_pnl = field(schema.pnl);
    let pnl = parse_decimal(raw_pnl).ok_or_else(|| parse_error(schema.pnl_column(), raw_pnl, "a decimal number"))?;

    let raw_side = field(schema.side);
    let side: TradeSide = raw_side
        .parse()
        .map_err(|_| parse_error(schema.side_column(), raw_side, "long, short, BUY or SELL"))?;

    let timestamp = parse_timestamp(field(schema.timestamp));
    let mut trade = Trade::new(row, timestamp, pnl, side, field(schema.symbol));

    if let Some((entry, exit)) = schema.entry_exit {
        if let (Some(entry), Some(exit)) = (parse_timestamp(field(entry)), parse_timestamp(field(exit))) {
            trade = trade.with_holding_period(exit - entry);
        }
    }

    Ok(trade)
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TRADE_TIMESTAMP_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Timelike};
    use rust_decimal_macros::dec;

    fn read(csv: &str) -> Result<TradeTable, LoadError> {
        read_trades(csv.as_bytes(), "historical_data.csv")
    }

    #[test]
    fn reads_rows_in_source_order() {
        let table = read(
            "Timestamp IST,Closed PnL,Side,Symbol\n\
             01-01-2024 10:00,100,BUY,BTC\n\
             01-01-2024 11:00,-50,SELL,ETH\n",
        )
        .unwrap();

        assert_eq!(table.trades.len(), 2);
        assert_eq!(table.coerced_timestamps, 0);

        let first = &table.trades[0];
        assert_eq!(first.row, 1);
        assert_eq!(first.pnl, dec!(100));
        assert_eq!(first.side, TradeSide::Long);
        assert_eq!(first.symbol, "BTC");
        assert_eq!(first.date(), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(first.timestamp.unwrap().hour(), 10);

        assert_eq!(table.trades[1].side, TradeSide::Short);
        assert_eq!(table.trades[1].pnl, dec!(-50));
    }

    #[test]
    fn malformed_timestamp_is_coerced_not_fatal() {
        let table = read(
            "Timestamp IST,Closed PnL,Side,Symbol\n\
             2024/01/01 10:00,5,long,BTC\n\
             ,1,short,BTC\n\
             02-01-2024 09:30,2,long,BTC\n",
        )
        .unwrap();
        assert_eq!(table.trades.len(), 3);
        assert_eq!(table.coerced_timestamps, 2);
        assert!(table.trades[0].timestamp.is_none());
        assert!(table.trades[2].timestamp.is_some());
    }

    #[test]
    fn bad_pnl_names_row_and_column() {
        let err = read(
            "Timestamp IST,Closed PnL,Side,Symbol\n\
             01-01-2024 10:00,12,BUY,BTC\n\
             01-01-2024 11:00,twelve,BUY,BTC\n",
        )
        .unwrap_err();

        match &err {
            LoadError::Parse { row, column, value, .. } => {
                assert_eq!(*row, 2);
                assert_eq!(*column, "Closed PnL");
                assert_eq!(value, "twelve");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("historical_data.csv, row 2"));
    }

    #[test]
    fn unknown_side_is_rejected() {
        let err = read("Timestamp IST,Closed PnL,Side,Symbol\n01-01-2024 10:00,1,HOLD,BTC\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse { column: "Side", .. }));
    }

    #[test]
    fn holding_period_from_entry_and_exit() {
        let table = read(
            "Timestamp IST,Closed PnL,Side,Coin,Entry Time,Exit Time\n\
             01-01-2024 12:00,3,long,BTC,01-01-2024 10:00,01-01-2024 12:30\n\
             01-01-2024 12:00,3,long,BTC,,01-01-2024 12:30\n",
        )
        .unwrap();
        assert_eq!(table.trades[0].holding_period, Some(Duration::minutes(150)));
        assert_eq!(table.trades[1].holding_period, None);
    }

    #[test]
    fn missing_file_names_the_file() {
        let err = load_trades(Path::new("/nonexistent/dir/historical_data.csv")).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
        assert!(message.contains("'historical_data.csv'"));
        assert!(message.contains("DD-MM-YYYY HH:MM"));
    }

    #[test]
    fn header_only_file_yields_empty_table() {
        let table = read("Timestamp IST,Closed PnL,Side,Symbol\n").unwrap();
        assert!(table.trades.is_empty());
    }
}
