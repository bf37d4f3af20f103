use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// The "no data for this selection" state. Every operation returns this
    /// instead of dividing by an empty set.
    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("An unexpected error occurred during analytics calculation: {0}")]
    InternalError(String),
}

impl AnalyticsError {
    pub fn is_not_enough_data(&self) -> bool {
        matches!(self, AnalyticsError::NotEnoughData(_))
    }
}

/// Turns the "insufficient data" signal into an empty section while letting
/// real failures through.
pub(crate) fn optional<T>(result: Result<T, AnalyticsError>) -> Result<Option<T>, AnalyticsError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(AnalyticsError::NotEnoughData(_)) => Ok(None),
        Err(other) => Err(other),
    }
}
