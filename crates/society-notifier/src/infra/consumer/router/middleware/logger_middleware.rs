use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::{
    domain::{models::Event, outcome::Outcome},
    infra::consumer::router::traits::{Handler, Layer},
};

#[non_exhaustive]
pub struct LoggingMiddleware<H> {
    inner: H,
}

impl<H> LoggingMiddleware<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<H: Handler> Handler for LoggingMiddleware<H> {
    async fn handle(&self, event: Event) -> anyhow::Result<Outcome> {
        let collection = event.collection.clone();
        let kind = event.kind();
        let id = event.record_id.clone();
        let started = Instant::now();

        debug!(%collection, %kind, %id, "handling change");
        let res = self.inner.handle(event).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &res {
            Ok(Outcome::Dispatched) => {
                info!(%collection, %kind, %id, elapsed_ms, "notification dispatched")
            }
            Ok(Outcome::Skipped(reason)) => {
                debug!(%collection, %kind, %id, %reason, "nothing to send")
            }
            Err(e) => warn!(%collection, %kind, %id, elapsed_ms, "dispatch failed: {:#}", e),
        }

        res
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer;

impl<H: Handler> Layer<H> for LoggingLayer {
    type Service = LoggingMiddleware<H>;

    fn layer(&self, inner: H) -> Self::Service {
        LoggingMiddleware::new(inner)
    }
}
