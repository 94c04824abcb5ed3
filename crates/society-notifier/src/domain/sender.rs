use async_trait::async_trait;

use crate::domain::notification::Notification;

/// Opaque push delivery. An `Err` means the transport rejected or failed the
/// send; callers do not retry.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: &Notification) -> anyhow::Result<()>;
}
