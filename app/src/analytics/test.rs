use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures::{stream, StreamExt};
use irrigation_core::error::SourceError;
use irrigation_core::stubs::MemoryEventSource;
use irrigation_core::{
    AnalyticsQuery, EventFilter, EventSource, EventStream, Granularity, IrrigationEvent,
};
use tokio_util::sync::CancellationToken;

use super::*;

struct StalledSource;

#[async_trait]
impl EventSource for StalledSource {
    fn query_events(&self, _filter: EventFilter) -> EventStream<'_> {
        stream::pending::<Result<IrrigationEvent, SourceError>>().boxed()
    }
}

fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 8, 0, 0).unwrap()
}

fn event(start: DateTime<Utc>, nominal: f64) -> IrrigationEvent {
    IrrigationEvent {
        farm_id: 1,
        sector_id: 1,
        start_time: start,
        end_time: start + chrono::Duration::hours(1),
        nominal_amount: nominal,
        real_amount: nominal,
        efficiency: 0.9,
    }
}

fn build_service(source: Arc<dyn EventSource>) -> Arc<AnalyticsService> {
    AnalyticsService::new(source, CancellationToken::new(), Duration::from_secs(5))
}

fn may_query() -> AnalyticsQuery {
    AnalyticsQuery::new(1, utc(2024, 5, 1), utc(2024, 5, 31), None, Granularity::Monthly)
        .unwrap()
}

#[tokio::test]
async fn test_farm_analytics() {
    // prepare
    let source = MemoryEventSource::new(vec![event(utc(2024, 5, 3), 10.0), event(utc(2024, 5, 9), 5.0)]);
    let service = build_service(Arc::new(source));

    // execute
    let res = service
        .farm_analytics(may_query(), Comparison::Disabled)
        .await
        .unwrap();

    // validate
    assert_eq!(15.0, res.current.analytics.summary.nominal_total);
    assert_eq!(1, res.current.analytics.time_series.len());
    assert!(res.previous_year.is_none());
}

#[tokio::test]
async fn test_previous_year() {
    // prepare
    let source = MemoryEventSource::new(vec![
        event(utc(2024, 5, 3), 10.0),
        event(utc(2023, 5, 4), 7.0),
        event(utc(2023, 5, 20), 3.0),
        event(utc(2023, 6, 20), 100.0),
    ]);
    let source = Arc::new(source);
    let service = build_service(source.clone());

    // execute
    let res = service
        .farm_analytics(may_query(), Comparison::PreviousYear)
        .await
        .unwrap();

    // validate
    let previous = res.previous_year.unwrap();
    assert_eq!(utc(2023, 5, 1), previous.query.window_start());
    assert_eq!(utc(2023, 5, 31), previous.query.window_end());
    assert_eq!(10.0, previous.analytics.summary.nominal_total);
    assert_eq!(2, previous.analytics.summary.event_count);
    assert_eq!(10.0, res.current.analytics.summary.nominal_total);
    assert_eq!(2, source.query_count());
}

#[tokio::test]
async fn test_timeout_cancels_query() {
    // prepare
    let service = AnalyticsService::new(
        Arc::new(StalledSource),
        CancellationToken::new(),
        Duration::from_millis(20),
    );

    // execute
    let res = service.farm_analytics(may_query(), Comparison::Disabled).await;

    // validate
    assert!(matches!(res, Err(ServiceError::Unavailable(_))));
}

#[tokio::test]
async fn test_shutdown_cancels_query() {
    // prepare
    let shutdown = CancellationToken::new();
    let service = AnalyticsService::new(
        Arc::new(StalledSource),
        shutdown.clone(),
        Duration::from_secs(60),
    );
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    // execute
    let res = service.farm_analytics(may_query(), Comparison::Disabled).await;

    // validate
    assert!(matches!(res, Err(ServiceError::Unavailable(_))));
}

#[tokio::test]
async fn test_source_state() {
    let service = build_service(Arc::new(MemoryEventSource::default()));
    assert!(service.source_state().await.is_ok());
}

#[test]
fn test_parse_comparison() {
    assert_eq!(Comparison::PreviousYear, "previous_year".parse().unwrap());
    assert_eq!(Comparison::Disabled, "none".parse().unwrap());
    assert!("yoy".parse::<Comparison>().is_err());
}
