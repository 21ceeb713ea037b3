use crate::bucket::Granularity;
use crate::error::AnalyticsError;
use crate::event::{EventFilter, FarmId, SectorId};
use crate::reducer::Reducer;
use crate::report::Analytics;
use crate::stream::EventSource;
use chrono::{DateTime, Duration, Months, Utc};
use futures::TryStreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Length of the window used when a caller does not supply one
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// The trailing default window ending at `now`
pub fn default_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (now - Duration::days(DEFAULT_WINDOW_DAYS), now)
}

/// A validated analytics request.
///
/// Can only be built with `window_start <= window_end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticsQuery {
    farm_id: FarmId,
    sector_id: Option<SectorId>,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    granularity: Granularity,
}

impl AnalyticsQuery {
    pub fn new(
        farm_id: FarmId,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        sector_id: Option<SectorId>,
        granularity: Granularity,
    ) -> Result<Self, AnalyticsError> {
        if window_start > window_end {
            return Err(AnalyticsError::InvalidWindow {
                start: window_start,
                end: window_end,
            });
        }

        Ok(AnalyticsQuery {
            farm_id,
            sector_id,
            window_start,
            window_end,
            granularity,
        })
    }

    /// Same as `new`, but takes the granularity in its textual form
    pub fn parse(
        farm_id: FarmId,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        sector_id: Option<SectorId>,
        granularity: &str,
    ) -> Result<Self, AnalyticsError> {
        let granularity = granularity.parse()?;
        Self::new(farm_id, window_start, window_end, sector_id, granularity)
    }

    pub fn farm_id(&self) -> FarmId {
        self.farm_id
    }

    pub fn sector_id(&self) -> Option<SectorId> {
        self.sector_id
    }

    pub fn window_start(&self) -> DateTime<Utc> {
        self.window_start
    }

    pub fn window_end(&self) -> DateTime<Utc> {
        self.window_end
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn filter(&self) -> EventFilter {
        EventFilter {
            farm_id: self.farm_id,
            sector_id: self.sector_id,
            from: self.window_start,
            until: self.window_end,
        }
    }

    /// The same query with both window bounds moved `months` calendar months back
    pub fn shifted_back(&self, months: u32) -> Result<Self, AnalyticsError> {
        let shift = |instant: DateTime<Utc>| {
            instant
                .checked_sub_months(Months::new(months))
                .ok_or(AnalyticsError::InvalidWindow {
                    start: self.window_start,
                    end: self.window_end,
                })
        };

        Self::new(
            self.farm_id,
            shift(self.window_start)?,
            shift(self.window_end)?,
            self.sector_id,
            self.granularity,
        )
    }
}

/// Computes the bucketed time series and the window summary of `query`.
///
/// The events are folded while they are streamed from `source`. Between two
/// reads the `cancel` token is checked, a cancelled query never returns
/// partial results.
#[tracing::instrument(skip_all, fields(farm_id = query.farm_id(), granularity = %query.granularity()))]
pub async fn compute_analytics(
    source: &dyn EventSource,
    query: &AnalyticsQuery,
    cancel: &CancellationToken,
) -> Result<Analytics, AnalyticsError> {
    if cancel.is_cancelled() {
        return Err(AnalyticsError::Cancelled);
    }

    let filter = query.filter();
    let mut events = source.query_events(filter);
    let mut reducer = Reducer::new(query.granularity());
    let mut skipped = 0;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(read = reducer.event_count(), "Query cancelled");
                return Err(AnalyticsError::Cancelled);
            }
            next = events.try_next() => next?,
        };

        match next {
            Some(event) if filter.matches(&event) => reducer.push(&event),
            Some(_) => skipped += 1,
            None => break,
        }
    }

    if skipped > 0 {
        debug!(skipped = skipped, "Dropped events outside of the query filter");
    }
    debug!(events = reducer.event_count(), "Aggregated events");
    Ok(reducer.finish())
}
