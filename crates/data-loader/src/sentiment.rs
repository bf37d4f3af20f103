use crate::error::LoadError;
use crate::open_source;
use crate::schema::{parse_decimal, SentimentSchema, SENTIMENT_DATE_FORMAT, SENTIMENT_EXPECTED};
use chrono::NaiveDate;
use core_types::{SentimentIndex, SentimentRecord};
use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Loads the daily Fear & Greed index from disk.
pub fn load_sentiment(path: &Path) -> Result<SentimentIndex, LoadError> {
    let file = open_source(path, "Fear & Greed index", SENTIMENT_EXPECTED)?;
    let label = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    read_sentiment(file, &label)
}

/// Reads a sentiment index from any reader. Rows may arrive in any order, but
/// each calendar day may appear only once.
pub fn read_sentiment<R: Read>(reader: R, label: &str) -> Result<SentimentIndex, LoadError> {
    let csv_error = |source: csv::Error| LoadError::Csv { file: label.to_string(), source };

    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = reader.headers().map_err(csv_error)?.clone();
    let schema = SentimentSchema::from_headers(&headers, label)?;

    let mut index = SentimentIndex::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let row = i + 1;
        let field = |column: usize| record.get(column).unwrap_or("");
        let parse_error = |column: &'static str, value: &str, expected: &'static str| LoadError::Parse {
            file: label.to_string(),
            row,
            column,
            value: value.to_string(),
            expected,
        };

        let raw_date = field(schema.date);
        let date = NaiveDate::parse_from_str(raw_date, SENTIMENT_DATE_FORMAT)
            .map_err(|_| parse_error(schema.date_column(), raw_date, "a date formatted YYYY-MM-DD"))?;

        let raw_value = field(schema.value);
        let value = parse_decimal(raw_value)
            .ok_or_else(|| parse_error(schema.value_column(), raw_value, "a number"))?;

        let classification = field(schema.classification);
        if classification.is_empty() {
            return Err(parse_error(
                schema.classification_column(),
                classification,
                "a non-empty label such as Fear or Greed",
            ));
        }

        index
            .insert(SentimentRecord { date, value, classification: classification.to_string() })
            .map_err(|source| LoadError::DuplicateDay { file: label.to_string(), row, source })?;
    }

    if let Some((first, last)) = index.date_range() {
        info!(file = label, days = index.len(), %first, %last, "Loaded sentiment index");
    } else {
        info!(file = label, days = 0, "Loaded sentiment index");
    }

    Ok(index)
}
