use crate::analytics::Comparison;
use crate::error::{ApiError, ServiceError};
use chrono::{DateTime, Utc};
use irrigation_core::{default_window, AnalyticsQuery, Granularity};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

/// Raw query string of the analytics endpoint.
///
/// Everything is kept as text, so a bad value never turns into a rejection
#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyticsParams {
    /// RFC 3339, defaults to seven days before now
    pub start_date: Option<String>,
    /// RFC 3339, defaults to now
    pub end_date: Option<String>,
    /// Restricts the result to a single sector of the farm
    pub sector_id: Option<String>,
    /// One of `daily`, `weekly` or `monthly`, defaults to `daily`
    pub aggregation: Option<String>,
    /// `previous_year` adds the same window one year earlier
    pub compare: Option<String>,
}

impl AnalyticsParams {
    pub fn into_query(
        self,
        farm_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(AnalyticsQuery, Comparison), ServiceError> {
        let farm_id =
            parse_id(farm_id).ok_or_else(|| ApiError::InvalidFarmId(farm_id.to_owned()))?;
        let granularity = match self.aggregation.as_deref() {
            Some(aggregation) => aggregation.parse()?,
            None => Granularity::default(),
        };
        let comparison = match self.compare.as_deref() {
            Some(compare) => compare.parse()?,
            None => Comparison::default(),
        };

        let (mut start, mut end) = default_window(now);
        if let Some(parsed) = self.start_date.as_deref().and_then(parse_date) {
            start = parsed;
        }
        if let Some(parsed) = self.end_date.as_deref().and_then(parse_date) {
            end = parsed;
        }
        let sector_id = self.sector_id.as_deref().and_then(parse_id);

        let query = AnalyticsQuery::new(farm_id, start, end, sector_id, granularity)?;
        Ok((query, comparison))
    }
}

/// Ids are unsigned, but stored as `int4`
fn parse_id(value: &str) -> Option<i32> {
    value.parse::<u32>().ok().and_then(|id| i32::try_from(id).ok())
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
