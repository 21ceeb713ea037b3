use crate::reducer::Accumulator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reported for average, min and max efficiency of a window without events
pub const NO_DATA: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRow {
    pub bucket_start: DateTime<Utc>,
    pub nominal_total: f64,
    pub real_total: f64,
    pub average_efficiency: f64,
    pub event_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSummary {
    pub nominal_total: f64,
    pub event_count: u64,
    pub average_efficiency: f64,
    pub min_efficiency: f64,
    pub max_efficiency: f64,
}

/// Result of one analytics query, series ordered by ascending `bucket_start`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub time_series: Vec<TimeSeriesRow>,
    pub summary: WindowSummary,
}

impl TimeSeriesRow {
    fn from_bucket(bucket_start: DateTime<Utc>, acc: &Accumulator) -> Self {
        TimeSeriesRow {
            bucket_start,
            nominal_total: acc.nominal_sum(),
            real_total: acc.real_sum(),
            average_efficiency: acc.efficiency_sum() / acc.count() as f64,
            event_count: acc.count(),
        }
    }
}

impl From<&Accumulator> for WindowSummary {
    fn from(acc: &Accumulator) -> Self {
        if acc.is_empty() {
            return WindowSummary {
                nominal_total: 0.0,
                event_count: 0,
                average_efficiency: NO_DATA,
                min_efficiency: NO_DATA,
                max_efficiency: NO_DATA,
            };
        }

        WindowSummary {
            nominal_total: acc.nominal_sum(),
            event_count: acc.count(),
            average_efficiency: acc.efficiency_sum() / acc.count() as f64,
            min_efficiency: acc.min_efficiency(),
            max_efficiency: acc.max_efficiency(),
        }
    }
}

pub(crate) fn finalize(buckets: HashMap<DateTime<Utc>, Accumulator>, window: &Accumulator) -> Analytics {
    let mut time_series: Vec<TimeSeriesRow> = buckets
        .iter()
        .filter(|(_, acc)| !acc.is_empty())
        .map(|(start, acc)| TimeSeriesRow::from_bucket(*start, acc))
        .collect();
    time_series.sort_by_key(|row| row.bucket_start);

    Analytics {
        time_series,
        summary: WindowSummary::from(window),
    }
}
