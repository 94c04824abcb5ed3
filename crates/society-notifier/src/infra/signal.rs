use async_trait::async_trait;
use tokio::signal::unix::{SignalKind, signal};
use tracing::warn;

use crate::domain::{ShutdownKind, SignalHandler};

#[derive(Default)]
pub struct UnixSignalHandler;

impl UnixSignalHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SignalHandler for UnixSignalHandler {
    async fn wait_for_shutdown(&self) -> ShutdownKind {
        let handlers = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
            signal(SignalKind::hangup()),
        );

        let (Ok(mut sigterm), Ok(mut sigint), Ok(mut sighup)) = handlers else {
            warn!("unix signal handlers unavailable, waiting for ctrl-c only");
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {}, running until killed", e);
                std::future::pending::<()>().await;
            }
            return ShutdownKind::Interrupt;
        };

        tokio::select! {
            _ = sigterm.recv() => ShutdownKind::Terminate,
            _ = sigint.recv() => ShutdownKind::Interrupt,
            _ = sighup.recv() => ShutdownKind::Hangup,
        }
    }
}
