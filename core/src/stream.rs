use crate::error::SourceError;
use crate::event::{EventFilter, IrrigationEvent};
use async_trait::async_trait;
use futures::stream::BoxStream;

pub type EventStream<'a> = BoxStream<'a, Result<IrrigationEvent, SourceError>>;

/// Read access to persisted irrigation events.
///
/// Implementations may yield events in any order and in as many pages as
/// they like; the stream is consumed lazily and never collected as a whole.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Events matching `filter`, with the window inclusive on both ends
    fn query_events(&self, filter: EventFilter) -> EventStream<'_>;

    /// Checks if the source is reachable
    async fn ping(&self) -> Result<(), SourceError> {
        Ok(())
    }
}
