use crate::error::{ApiError, ServiceError};
use irrigation_core::error::AnalyticsError;
use irrigation_core::{compute_analytics, Analytics, AnalyticsQuery, EventSource};
use std::fmt::Debug;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[cfg(test)]
mod test;

const MONTHS_PER_YEAR: u32 = 12;

/// Optional second window a query is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Comparison {
    #[default]
    Disabled,
    PreviousYear,
}

impl FromStr for Comparison {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Comparison::Disabled),
            "previous_year" => Ok(Comparison::PreviousYear),
            other => Err(ApiError::InvalidCompare(other.to_owned())),
        }
    }
}

pub struct Period {
    pub query: AnalyticsQuery,
    pub analytics: Analytics,
}

pub struct FarmAnalytics {
    pub current: Period,
    pub previous_year: Option<Period>,
}

pub struct AnalyticsService {
    source: Arc<dyn EventSource>,
    shutdown: CancellationToken,
    query_timeout: Duration,
}

impl Debug for AnalyticsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsService")
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}

impl AnalyticsService {
    pub fn new(
        source: Arc<dyn EventSource>,
        shutdown: CancellationToken,
        query_timeout: Duration,
    ) -> Arc<Self> {
        Arc::new(AnalyticsService {
            source,
            shutdown,
            query_timeout,
        })
    }

    /// Analytics of `query`, and if requested of the same window one year earlier.
    /// Both windows are computed independently of each other
    #[tracing::instrument(skip(self))]
    pub async fn farm_analytics(
        &self,
        query: AnalyticsQuery,
        comparison: Comparison,
    ) -> Result<FarmAnalytics, ServiceError> {
        let (current, previous_year) = match comparison {
            Comparison::Disabled => (self.period(query).await?, None),
            Comparison::PreviousYear => {
                let previous = query.shifted_back(MONTHS_PER_YEAR)?;
                let (current, previous) =
                    tokio::try_join!(self.period(query), self.period(previous))?;
                (current, Some(previous))
            }
        };

        info!(
            farm_id = query.farm_id(),
            events = current.analytics.summary.event_count,
            buckets = current.analytics.time_series.len(),
            "Computed farm analytics"
        );
        Ok(FarmAnalytics {
            current,
            previous_year,
        })
    }

    /// Reason why the event source is not reachable, if any
    pub async fn source_state(&self) -> Result<(), String> {
        self.source.ping().await.map_err(|e| format!("{}", e))
    }

    async fn period(&self, query: AnalyticsQuery) -> Result<Period, AnalyticsError> {
        let cancel = self.shutdown.child_token();
        let computation = compute_analytics(self.source.as_ref(), &query, &cancel);

        match tokio::time::timeout(self.query_timeout, computation).await {
            Ok(res) => Ok(Period {
                query,
                analytics: res?,
            }),
            Err(_) => {
                cancel.cancel();
                warn!(
                    farm_id = query.farm_id(),
                    "Query exceeded {} ms",
                    self.query_timeout.as_millis()
                );
                Err(AnalyticsError::Cancelled)
            }
        }
    }
}
