use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info};

use crate::{
    domain::{consumer::EventConsumer, models::Event},
    infra::consumer::router::traits::Handler,
};

const DEFAULT_CONCURRENCY: usize = 30;

/// Drains the event channel through a handler, running up to `concurrency`
/// invocations at once. A failed invocation is logged and dropped.
pub struct Consumer<R: Handler> {
    router: Arc<R>,
    concurrency: usize,
}

impl<R: Handler> Consumer<R> {
    pub fn new(router: R) -> Self {
        Self {
            router: Arc::new(router),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

#[async_trait]
impl<R: Handler> EventConsumer for Consumer<R> {
    async fn consume(&self, ch: mpsc::Receiver<Event>) {
        ReceiverStream::new(ch)
            .map(|event| {
                let router = self.router.clone();
                async move {
                    let route = format!("{}/{}", event.collection, event.kind());
                    let id = event.record_id.clone();
                    if let Err(e) = router.handle(event).await {
                        handle_error(&route, &id, e);
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect::<()>()
            .await;

        info!("event channel closed, consumer finished");
    }
}

fn handle_error(route: &str, id: &str, e: anyhow::Error) {
    error!(route, id, "notification not delivered: {:#}", e);
}
