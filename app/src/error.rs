use irrigation_core::error::{AnalyticsError, SourceError};
use std::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DBError {
    #[error(transparent)]
    SQLError(#[from] sqlx::Error),
    #[error(transparent)]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

impl From<DBError> for SourceError {
    fn from(err: DBError) -> Self {
        SourceError::new(err)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid farm_id")]
    InvalidFarmId(std::string::String),
    #[error("invalid compare: {0}")]
    InvalidCompare(std::string::String),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub enum ServiceError {
    User(Box<dyn error::Error + Send + Sync>),
    Internal(Box<dyn error::Error + Send + Sync>),
    Unavailable(Box<dyn error::Error + Send + Sync>),
}

impl From<AnalyticsError> for ServiceError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::InvalidGranularity(_) => ServiceError::User(Box::from(
                "invalid aggregation",
            )),
            AnalyticsError::InvalidWindow { .. } => ServiceError::User(Box::from(err)),
            AnalyticsError::SourceUnavailable(_) => ServiceError::Internal(Box::from(err)),
            AnalyticsError::Cancelled => ServiceError::Unavailable(Box::from(err)),
        }
    }
}

impl From<DBError> for ServiceError {
    fn from(err: DBError) -> Self {
        ServiceError::Internal(Box::from(err))
    }
}

impl From<ApiError> for ServiceError {
    fn from(err: ApiError) -> Self {
        ServiceError::User(Box::from(err))
    }
}
