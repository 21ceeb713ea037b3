use super::query::AnalyticsParams;
use super::{build_response, ErrorResponseDto};
use self::dto::FarmAnalyticsDto;
use crate::analytics::AnalyticsService;
use chrono::Utc;
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    service: &Arc<AnalyticsService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    farm_analytics(service.clone())
}

/// GET v1/farms/:farm_id/irrigation/analytics
///
/// Aggregated irrigation metrics of a farm
///
/// Returns a `FarmAnalyticsDto` with the bucketed time series
/// and the summary of the whole window
#[utoipa::path(
    get,
    path = "/v1/farms/{farm_id}/irrigation/analytics",
    tag = "analytics",
    params(
        ("farm_id" = i32, Path, description = "Farm identifier"),
        AnalyticsParams
    ),
    responses(
        (status = 200, description = "Analytics of the requested window", body = FarmAnalyticsDto),
        (status = 400, description = "Invalid farm, aggregation, compare or window", body = ErrorResponseDto),
        (status = 500, description = "Irrigation data could not be read"),
        (status = 503, description = "Query timed out or the server is shutting down", body = ErrorResponseDto)
    )
)]
pub(super) fn farm_analytics(
    service: Arc<AnalyticsService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || service.clone())
        .and(warp::get())
        .and(warp::path!("v1" / "farms" / String / "irrigation" / "analytics"))
        .and(warp::query::<AnalyticsParams>())
        .and_then(
            |service: Arc<AnalyticsService>, farm_id: String, params: AnalyticsParams| async move {
                let resp = match params.into_query(&farm_id, Utc::now()) {
                    Ok((query, comparison)) => service
                        .farm_analytics(query, comparison)
                        .await
                        .map(FarmAnalyticsDto::from),
                    Err(err) => Err(err),
                };
                build_response(resp)
            },
        )
        .boxed()
}

///
/// DTO
///
pub mod dto {
    use crate::analytics::{FarmAnalytics, Period};
    use chrono::{DateTime, Utc};
    use irrigation_core::{TimeSeriesRow, WindowSummary};
    use serde::{Deserialize, Serialize};
    use utoipa::ToSchema;

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct TimeSeriesRowDto {
        pub bucket_start: DateTime<Utc>,
        pub nominal_amount_mm: f64,
        pub real_amount_mm: f64,
        pub average_efficiency: f64,
        pub event_count: u64,
    }

    /// Efficiencies are reported as 0 if the window holds no events
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct SummaryDto {
        pub total_nominal_mm: f64,
        pub total_events: u64,
        pub average_efficiency: f64,
        pub min_efficiency: f64,
        pub max_efficiency: f64,
    }

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct PeriodDto {
        pub start_date: DateTime<Utc>,
        pub end_date: DateTime<Utc>,
        pub time_series: Vec<TimeSeriesRowDto>,
        pub summary: SummaryDto,
    }

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct FarmAnalyticsDto {
        pub farm_id: i32,
        pub sector_id: Option<i32>,
        pub aggregation: String,
        pub start_date: DateTime<Utc>,
        pub end_date: DateTime<Utc>,
        pub time_series: Vec<TimeSeriesRowDto>,
        pub summary: SummaryDto,
        pub previous_year: Option<PeriodDto>,
    }

    impl From<TimeSeriesRow> for TimeSeriesRowDto {
        fn from(row: TimeSeriesRow) -> Self {
            TimeSeriesRowDto {
                bucket_start: row.bucket_start,
                nominal_amount_mm: row.nominal_total,
                real_amount_mm: row.real_total,
                average_efficiency: row.average_efficiency,
                event_count: row.event_count,
            }
        }
    }

    impl From<WindowSummary> for SummaryDto {
        fn from(summary: WindowSummary) -> Self {
            SummaryDto {
                total_nominal_mm: summary.nominal_total,
                total_events: summary.event_count,
                average_efficiency: summary.average_efficiency,
                min_efficiency: summary.min_efficiency,
                max_efficiency: summary.max_efficiency,
            }
        }
    }

    impl From<Period> for PeriodDto {
        fn from(mut period: Period) -> Self {
            PeriodDto {
                start_date: period.query.window_start(),
                end_date: period.query.window_end(),
                time_series: period
                    .analytics
                    .time_series
                    .drain(..)
                    .map(TimeSeriesRowDto::from)
                    .collect(),
                summary: period.analytics.summary.into(),
            }
        }
    }

    impl From<FarmAnalytics> for FarmAnalyticsDto {
        fn from(analytics: FarmAnalytics) -> Self {
            let query = analytics.current.query;
            let current = PeriodDto::from(analytics.current);
            FarmAnalyticsDto {
                farm_id: query.farm_id(),
                sector_id: query.sector_id(),
                aggregation: query.granularity().to_string(),
                start_date: current.start_date,
                end_date: current.end_date,
                time_series: current.time_series,
                summary: current.summary,
                previous_year: analytics.previous_year.map(PeriodDto::from),
            }
        }
    }
}

///
/// TEST
///
#[cfg(test)]
mod test {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone};
    use futures::{stream, StreamExt};
    use irrigation_core::error::SourceError;
    use irrigation_core::stubs::MemoryEventSource;
    use irrigation_core::{EventFilter, EventSource, EventStream, IrrigationEvent};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    struct FailingSource;

    #[async_trait]
    impl EventSource for FailingSource {
        fn query_events(&self, _filter: EventFilter) -> EventStream<'_> {
            stream::iter(vec![Err::<IrrigationEvent, _>(SourceError::new("connection reset by peer"))]).boxed()
        }
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn event(sector_id: i32, start: DateTime<Utc>, nominal: f64, efficiency: f64) -> IrrigationEvent {
        IrrigationEvent {
            farm_id: 1,
            sector_id,
            start_time: start,
            end_time: start + chrono::Duration::minutes(30),
            nominal_amount: nominal,
            real_amount: nominal * efficiency,
            efficiency,
        }
    }

    fn build_mocked_service(source: Arc<dyn EventSource>) -> Arc<AnalyticsService> {
        AnalyticsService::new(source, CancellationToken::new(), Duration::from_secs(5))
    }

    fn farm_source() -> Arc<MemoryEventSource> {
        Arc::new(MemoryEventSource::new(vec![
            event(1, utc(2024, 5, 1, 6), 10.0, 0.8),
            event(2, utc(2024, 5, 1, 18), 20.0, 0.6),
            event(1, utc(2024, 5, 8, 6), 5.0, 0.5),
            event(2, utc(2023, 5, 1, 6), 40.0, 0.4),
        ]))
    }

    #[tokio::test]
    async fn test_rest_daily_analytics() {
        // Prepare
        let service = build_mocked_service(farm_source());
        let routes = routes(&service);

        // Execute
        let res = warp::test::request()
            .path("/v1/farms/1/irrigation/analytics?start_date=2024-05-01T00:00:00Z&end_date=2024-05-01T23:59:59Z")
            .reply(&routes)
            .await;

        // Validate
        assert_eq!(200, res.status());
        let body: dto::FarmAnalyticsDto = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(1, body.farm_id);
        assert_eq!("daily", body.aggregation);
        assert_eq!(1, body.time_series.len());
        assert_eq!(utc(2024, 5, 1, 0), body.time_series[0].bucket_start);
        assert_eq!(30.0, body.time_series[0].nominal_amount_mm);
        assert_eq!(2, body.time_series[0].event_count);
        assert!((body.time_series[0].average_efficiency - 0.7).abs() < 1e-9);
        assert_eq!(30.0, body.summary.total_nominal_mm);
        assert_eq!(2, body.summary.total_events);
        assert_eq!(0.6, body.summary.min_efficiency);
        assert_eq!(0.8, body.summary.max_efficiency);
        assert!(body.previous_year.is_none());
    }

    #[tokio::test]
    async fn test_rest_weekly_sector_analytics() {
        // Prepare
        let service = build_mocked_service(farm_source());
        let routes = routes(&service);

        // Execute
        let res = warp::test::request()
            .path("/v1/farms/1/irrigation/analytics?start_date=2024-04-29T00:00:00Z&end_date=2024-05-12T00:00:00Z&aggregation=weekly&sector_id=1")
            .reply(&routes)
            .await;

        // Validate
        assert_eq!(200, res.status());
        let body: dto::FarmAnalyticsDto = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(Some(1), body.sector_id);
        assert_eq!(2, body.time_series.len());
        assert!(body.time_series.iter().all(|row| row.event_count == 1));
        assert_eq!(15.0, body.summary.total_nominal_mm);
    }

    #[tokio::test]
    async fn test_rest_previous_year() {
        // Prepare
        let service = build_mocked_service(farm_source());
        let routes = routes(&service);

        // Execute
        let res = warp::test::request()
            .path("/v1/farms/1/irrigation/analytics?start_date=2024-05-01T00:00:00Z&end_date=2024-05-31T00:00:00Z&aggregation=monthly&compare=previous_year")
            .reply(&routes)
            .await;

        // Validate
        assert_eq!(200, res.status());
        let body: dto::FarmAnalyticsDto = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(3, body.summary.total_events);
        let previous = body.previous_year.unwrap();
        assert_eq!(utc(2023, 5, 1, 0), previous.start_date);
        assert_eq!(1, previous.summary.total_events);
        assert_eq!(40.0, previous.summary.total_nominal_mm);
    }

    #[tokio::test]
    async fn test_rest_empty_window() {
        // Prepare
        let service = build_mocked_service(farm_source());
        let routes = routes(&service);

        // Execute
        let res = warp::test::request()
            .path("/v1/farms/2/irrigation/analytics")
            .reply(&routes)
            .await;

        // Validate
        assert_eq!(200, res.status());
        let body: dto::FarmAnalyticsDto = serde_json::from_slice(res.body()).unwrap();
        assert!(body.time_series.is_empty());
        assert_eq!(0, body.summary.total_events);
        assert_eq!(0.0, body.summary.average_efficiency);
        assert_eq!(0.0, body.summary.min_efficiency);
        assert_eq!(0.0, body.summary.max_efficiency);
    }

    #[tokio::test]
    async fn test_rest_invalid_aggregation() {
        // Prepare
        let source = farm_source();
        let service = build_mocked_service(source.clone());
        let routes = routes(&service);

        // Execute
        let res = warp::test::request()
            .path("/v1/farms/1/irrigation/analytics?aggregation=hourly")
            .reply(&routes)
            .await;

        // Validate
        assert_eq!(400, res.status());
        let body: ErrorResponseDto = serde_json::from_slice(res.body()).unwrap();
        assert_eq!("invalid aggregation", body.error);
        assert_eq!(0, source.query_count());
    }

    #[tokio::test]
    async fn test_rest_invalid_farm_id() {
        // Prepare
        let service = build_mocked_service(farm_source());
        let routes = routes(&service);

        // Execute
        let res = warp::test::request()
            .path("/v1/farms/abc/irrigation/analytics")
            .reply(&routes)
            .await;

        // Validate
        assert_eq!(400, res.status());
        let body: ErrorResponseDto = serde_json::from_slice(res.body()).unwrap();
        assert_eq!("invalid farm_id", body.error);
    }

    #[tokio::test]
    async fn test_rest_negative_farm_id() {
        // Prepare
        let service = build_mocked_service(farm_source());
        let routes = routes(&service);

        // Execute
        let res = warp::test::request()
            .path("/v1/farms/-1/irrigation/analytics")
            .reply(&routes)
            .await;

        // Validate
        assert_eq!(400, res.status());
        let body: ErrorResponseDto = serde_json::from_slice(res.body()).unwrap();
        assert_eq!("invalid farm_id", body.error);
    }

    #[tokio::test]
    async fn test_rest_inverted_window() {
        // Prepare
        let service = build_mocked_service(farm_source());
        let routes = routes(&service);

        // Execute
        let res = warp::test::request()
            .path("/v1/farms/1/irrigation/analytics?start_date=2024-05-02T00:00:00Z&end_date=2024-05-01T00:00:00Z")
            .reply(&routes)
            .await;

        // Validate
        assert_eq!(400, res.status());
    }

    #[tokio::test]
    async fn test_rest_source_unavailable() {
        // Prepare
        let service = build_mocked_service(Arc::new(FailingSource));
        let routes = routes(&service);

        // Execute
        let res = warp::test::request()
            .path("/v1/farms/1/irrigation/analytics")
            .reply(&routes)
            .await;

        // Validate
        assert_eq!(500, res.status());
    }
}
