use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Sentiment index already holds a record for {0}; only one record per day is allowed")]
    DuplicateSentimentDay(NaiveDate),
}
