use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use irrigation_core::error::SourceError;
use irrigation_core::{EventFilter, EventSource, EventStream, IrrigationEvent};
use sqlx::PgPool;

use crate::error::DBError;

#[derive(sqlx::FromRow, Debug)]
pub struct IrrigationDataDao {
    pub(crate) farm_id: i32,
    pub(crate) irrigation_sector_id: i32,
    pub(crate) start_time: DateTime<Utc>,
    pub(crate) end_time: DateTime<Utc>,
    pub(crate) nominal_amount: f64,
    pub(crate) real_amount: f64,
    pub(crate) efficiency: f64,
}

impl From<IrrigationDataDao> for IrrigationEvent {
    fn from(val: IrrigationDataDao) -> Self {
        IrrigationEvent {
            farm_id: val.farm_id,
            sector_id: val.irrigation_sector_id,
            start_time: val.start_time,
            end_time: val.end_time,
            nominal_amount: val.nominal_amount,
            real_amount: val.real_amount,
            efficiency: val.efficiency,
        }
    }
}

/// Streams all rows matching `filter` ordered by start time,
/// the window is inclusive on both ends
pub fn stream_window(
    conn: &PgPool,
    filter: EventFilter,
) -> BoxStream<'_, Result<IrrigationDataDao, DBError>> {
    sql_stmnt!(
        IrrigationDataDao,
        r#"SELECT farm_id, irrigation_sector_id, start_time, end_time, nominal_amount, real_amount, efficiency
            FROM irrigation_data
            WHERE farm_id = $1
            AND ($2::int4 IS NULL OR irrigation_sector_id = $2)
            AND start_time >= $3 AND start_time <= $4
            ORDER BY start_time, id"#,
        filter.farm_id,
        filter.sector_id,
        filter.from,
        filter.until
    )
    .fetch(conn)
    .map_err(DBError::from)
    .boxed()
}

/// Postgres backed event source
#[derive(Debug, Clone)]
pub struct PgEventSource {
    conn: PgPool,
}

impl PgEventSource {
    pub fn new(conn: PgPool) -> Self {
        PgEventSource { conn }
    }
}

#[async_trait]
impl EventSource for PgEventSource {
    fn query_events(&self, filter: EventFilter) -> EventStream<'_> {
        stream_window(&self.conn, filter)
            .map_ok(IrrigationEvent::from)
            .map_err(SourceError::from)
            .boxed()
    }

    async fn ping(&self) -> Result<(), SourceError> {
        super::check_schema(&self.conn).await?;
        Ok(())
    }
}
