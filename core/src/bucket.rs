use crate::error::AnalyticsError;
use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width of a time series bucket.
///
/// All buckets are cut in UTC:
/// - `Daily` starts at 00:00 of the calendar day
/// - `Weekly` starts at Monday 00:00 of the ISO week
/// - `Monthly` starts at 00:00 of the first day of the month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }

    /// Start of the bucket containing `instant`
    pub fn bucket_start(self, instant: DateTime<Utc>) -> DateTime<Utc> {
        let date = instant.date_naive();
        let first_day = match self {
            Granularity::Daily => date,
            Granularity::Weekly => {
                date - Duration::days(date.weekday().num_days_from_monday() as i64)
            }
            Granularity::Monthly => date - Duration::days(date.day0() as i64),
        };
        DateTime::<Utc>::from_naive_utc_and_offset(first_day.and_time(NaiveTime::default()), Utc)
    }

    /// Start of the bucket following the one containing `instant`,
    /// `None` if it is not representable
    pub fn next_bucket_start(self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let start = self.bucket_start(instant);
        match self {
            Granularity::Daily => start.checked_add_signed(Duration::days(1)),
            Granularity::Weekly => start.checked_add_signed(Duration::weeks(1)),
            Granularity::Monthly => start.checked_add_months(Months::new(1)),
        }
    }
}

impl FromStr for Granularity {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Granularity::Daily),
            "weekly" => Ok(Granularity::Weekly),
            "monthly" => Ok(Granularity::Monthly),
            other => Err(AnalyticsError::InvalidGranularity(other.to_owned())),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
