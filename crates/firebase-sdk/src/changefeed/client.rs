use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message as WsMessage,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use super::types::{FeedMessage, SubscribeRequest};
use crate::auth::TokenManager;
use crate::types::DocumentChange;

const CHANNEL_BUFFER_SIZE: usize = 100;
const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(60);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Subscribes to record changes over a WebSocket and forwards them on a
/// channel, reconnecting until cancelled.
#[non_exhaustive]
pub struct ChangeFeedClient {
    token_manager: Arc<TokenManager>,
    url: String,
    collections: Vec<String>,
    reconnect_delay: Duration,
    keepalive_timeout: Duration,
    cancel_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

#[derive(Clone)]
struct FeedLifecycleParams {
    event_tx: mpsc::Sender<DocumentChange>,
    token_manager: Arc<TokenManager>,
    url: String,
    collections: Vec<String>,
    keepalive_timeout: Duration,
    cancel_token: CancellationToken,
}

impl Drop for ChangeFeedClient {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

impl ChangeFeedClient {
    #[must_use]
    pub fn new(token_manager: Arc<TokenManager>, url: String, collections: Vec<String>) -> Self {
        Self {
            token_manager,
            url,
            collections,
            reconnect_delay: RECONNECT_DELAY,
            keepalive_timeout: KEEPALIVE_TIMEOUT,
            cancel_token: CancellationToken::new(),
            handle: None,
        }
    }

    #[must_use]
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    #[must_use]
    pub fn with_keepalive_timeout(mut self, timeout: Duration) -> Self {
        self.keepalive_timeout = timeout;
        self
    }

    pub async fn connect(&mut self) -> Result<mpsc::Receiver<DocumentChange>> {
        Url::parse(&self.url).context("invalid change feed url")?;

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let params = FeedLifecycleParams {
            event_tx: tx,
            token_manager: self.token_manager.clone(),
            url: self.url.clone(),
            collections: self.collections.clone(),
            keepalive_timeout: self.keepalive_timeout,
            cancel_token: self.cancel_token.clone(),
        };
        let cancel = self.cancel_token.clone();
        let reconnect_delay = self.reconnect_delay;

        self.handle = Some(tokio::spawn(async move {
            info!("starting change feed lifecycle...");

            loop {
                tokio::select! {
                    biased;

                    _ = cancel.cancelled() => {
                        info!("change feed cancelled");
                        break;
                    }

                    result = run_lifecycle(params.clone()) => {
                        if let Err(e) = result {
                            if cancel.is_cancelled() {
                                info!("change feed shutdown complete");
                                break;
                            }
                            if params.event_tx.is_closed() {
                                info!("change receiver dropped, stopping feed");
                                break;
                            }
                            error!("change feed connection lost: {:?}. reconnecting in {:?}...", e, reconnect_delay);
                            tokio::time::sleep(reconnect_delay).await;
                        }
                    }
                }
            }
        }));

        Ok(rx)
    }

    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            handle.await?;
        }

        Ok(())
    }
}

async fn run_lifecycle(params: FeedLifecycleParams) -> Result<()> {
    let FeedLifecycleParams {
        event_tx,
        token_manager,
        url,
        collections,
        keepalive_timeout,
        cancel_token,
    } = params;

    let token = token_manager.get_token().await.context("auth failed")?;

    info!("connecting to change feed: {}", url);
    let (mut ws, _) = connect_async(url.as_str())
        .await
        .context("change feed WebSocket connection failed")?;

    let subscribe = serde_json::to_string(&SubscribeRequest::new(&token, &collections))?;
    ws.send(WsMessage::Text(subscribe))
        .await
        .context("failed to send subscribe frame")?;
    info!(?collections, "subscribed to change feed");

    run_feed_loop(ws, event_tx, cancel_token, keepalive_timeout).await
}

async fn run_feed_loop(
    mut ws: WsStream,
    event_tx: mpsc::Sender<DocumentChange>,
    cancel_token: CancellationToken,
    keepalive_timeout: Duration,
) -> Result<()> {
    loop {
        tokio::select! {
            biased;

            _ = cancel_token.cancelled() => {
                info!("change feed loop cancelled");
                let _ = ws.close(None).await;
                return Ok(());
            }

            result = tokio::time::timeout(keepalive_timeout, ws.next()) => {
                match result {
                    Ok(Some(Ok(msg))) => {
                        handle_feed_message(msg, &event_tx).await?;
                    }
                    Ok(Some(Err(e))) => {
                        return Err(anyhow::anyhow!("WebSocket error: {}", e));
                    }
                    Ok(None) => {
                        return Err(anyhow::anyhow!("change feed stream ended"));
                    }
                    Err(_) => {
                        warn!("change feed keepalive timeout, reconnecting...");
                        return Err(anyhow::anyhow!("keepalive timeout"));
                    }
                }
            }
        }
    }
}

async fn handle_feed_message(
    msg: WsMessage,
    event_tx: &mpsc::Sender<DocumentChange>,
) -> Result<()> {
    let text = match msg {
        WsMessage::Text(t) => t,
        WsMessage::Close(_) => {
            info!("change feed sent close frame");
            return Err(anyhow::anyhow!("connection closed"));
        }
        WsMessage::Ping(_) => {
            debug!("change feed PING received");
            return Ok(());
        }
        _ => return Ok(()),
    };

    let parsed = match serde_json::from_str::<FeedMessage>(&text) {
        Ok(p) => p,
        Err(e) => {
            warn!("failed to parse change feed frame: {} - {}", e, text);
            return Ok(());
        }
    };

    match parsed {
        FeedMessage::Change(change) => {
            debug!(
                collection = %change.collection,
                id = %change.document_id,
                kind = ?change.kind,
                "change received"
            );
            if event_tx.send(change).await.is_err() {
                return Err(anyhow::anyhow!("change receiver dropped"));
            }
        }
        FeedMessage::Keepalive => {
            debug!("change feed keepalive");
        }
        FeedMessage::Reconnect => {
            warn!("change feed requested reconnect");
            return Err(anyhow::anyhow!("reconnect requested"));
        }
    }

    Ok(())
}
