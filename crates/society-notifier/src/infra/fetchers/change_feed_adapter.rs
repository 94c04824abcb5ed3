use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use firebase_sdk::{ChangeFeedClient, DocumentChange, TokenManager};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::core::Shutdowner;
use crate::domain::{
    fetcher::EventFetcher,
    models::{Change, ChangeKind, Collection, Event, RecordError},
};
use crate::infra::Config;

const CHANNEL_BUFFER_SIZE: usize = 100;

/// Turns the store's change feed into domain events.
#[non_exhaustive]
pub struct ChangeFeedFetcher {
    client: Mutex<ChangeFeedClient>,
    cancel_token: CancellationToken,
}

impl ChangeFeedFetcher {
    pub fn new(
        config: &Config,
        token_manager: Arc<TokenManager>,
        collections: Vec<String>,
    ) -> Result<Self> {
        let url = config.require("SOCIETY_CHANGE_FEED_URL")?.to_string();
        let cancel_token = CancellationToken::new();

        let client = ChangeFeedClient::new(token_manager, url, collections)
            .with_cancel_token(cancel_token.clone());

        Ok(Self {
            client: Mutex::new(client),
            cancel_token,
        })
    }
}

#[async_trait]
impl Shutdowner for ChangeFeedFetcher {
    async fn shutdown(&self) -> anyhow::Result<()> {
        self.cancel_token.cancel();
        self.client.lock().await.shutdown().await?;
        Ok(())
    }
}

impl Drop for ChangeFeedFetcher {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

#[async_trait]
impl EventFetcher for ChangeFeedFetcher {
    async fn fetch(&self) -> anyhow::Result<mpsc::Receiver<Event>> {
        let mut sdk_rx = self.client.lock().await.connect().await?;
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let cancellation_token = self.cancel_token.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;

                    _ = cancellation_token.cancelled() => {
                        info!("fetcher cancelled, stopping...");
                        break
                    }

                    maybe_change = sdk_rx.recv() => {
                        let Some(change) = maybe_change else {
                            info!("change feed channel closed");
                            break;
                        };

                        let event = match Event::try_from(change) {
                            Ok(event) => event,
                            Err(e) => {
                                warn!("dropping change: {}", e);
                                continue;
                            }
                        };

                        if tx.send(event).await.is_err() {
                            info!("receiver dropped");
                            break;
                        }
                    }
                }
            }
        });

        Ok(rx)
    }
}

impl From<firebase_sdk::ChangeKind> for ChangeKind {
    fn from(kind: firebase_sdk::ChangeKind) -> Self {
        match kind {
            firebase_sdk::ChangeKind::Create => ChangeKind::Create,
            firebase_sdk::ChangeKind::Update => ChangeKind::Update,
            firebase_sdk::ChangeKind::Delete => ChangeKind::Delete,
        }
    }
}

impl TryFrom<DocumentChange> for Event {
    type Error = RecordError;

    fn try_from(change: DocumentChange) -> Result<Self, Self::Error> {
        let kind = ChangeKind::from(change.kind);
        let missing = |image| RecordError::MissingImage { kind, image };

        let change_data = match kind {
            ChangeKind::Create => Change::Created {
                data: change.after.ok_or_else(|| missing("after"))?,
            },
            ChangeKind::Update => Change::Updated {
                before: change.before.ok_or_else(|| missing("before"))?,
                after: change.after.ok_or_else(|| missing("after"))?,
            },
            ChangeKind::Delete => Change::Deleted {
                before: change.before.ok_or_else(|| missing("before"))?,
            },
        };

        Ok(Event {
            collection: Collection::from(change.collection.as_str()),
            record_id: change.document_id,
            change: change_data,
        })
    }
}
