use async_trait::async_trait;

use crate::domain::{models::Event, outcome::Outcome};

#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, event: Event) -> anyhow::Result<Outcome>;
}

pub trait Layer<H: Handler> {
    type Service: Handler;

    fn layer(&self, inner: H) -> Self::Service;
}
