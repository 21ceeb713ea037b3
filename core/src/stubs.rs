use crate::event::{EventFilter, IrrigationEvent};
use crate::stream::{EventSource, EventStream};
use async_trait::async_trait;
use futures::{stream, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};

const DEFAULT_PAGE_SIZE: usize = 64;

/// Event source backed by a plain vector.
///
/// Events are handed out in pages with a yield between them,
/// which mimics a paginated remote store.
#[derive(Debug, Default)]
pub struct MemoryEventSource {
    events: Vec<IrrigationEvent>,
    page_size: usize,
    queries: AtomicUsize,
}

impl MemoryEventSource {
    pub fn new(events: Vec<IrrigationEvent>) -> Self {
        MemoryEventSource {
            events,
            page_size: DEFAULT_PAGE_SIZE,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Number of `query_events` calls so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EventSource for MemoryEventSource {
    fn query_events(&self, filter: EventFilter) -> EventStream<'_> {
        self.queries.fetch_add(1, Ordering::Relaxed);

        stream::iter(self.events.chunks(self.page_size.max(1)))
            .then(|page| async move {
                tokio::task::yield_now().await;
                page
            })
            .flat_map(move |page| {
                stream::iter(
                    page.iter()
                        .filter(move |event| filter.matches(event))
                        .cloned()
                        .map(Ok),
                )
            })
            .boxed()
    }
}
