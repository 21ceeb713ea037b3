use chrono::{DateTime, Utc};
use std::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid granularity: {0}")]
    InvalidGranularity(std::string::String),
    #[error("Invalid window: {start} is after {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("Event source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),
    #[error("Query cancelled")]
    Cancelled,
}

/// Opaque failure of an event source read
#[derive(Debug, Error)]
#[error(transparent)]
pub struct SourceError(Box<dyn error::Error + Send + Sync>);

impl SourceError {
    pub fn new<E>(err: E) -> Self
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        SourceError(err.into())
    }
}
