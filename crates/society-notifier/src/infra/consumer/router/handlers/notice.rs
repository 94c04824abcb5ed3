use std::sync::Arc;

use async_trait::async_trait;

use super::decode;
use crate::{
    domain::{
        models::{Change, Event, Notice},
        notification::{Channel, Notification},
        outcome::{Outcome, SkipReason},
        sender::NotificationSender,
    },
    infra::consumer::router::traits::Handler,
};

/// Broadcasts every new notice to all residents.
#[non_exhaustive]
pub struct NoticeHandler {
    sender: Arc<dyn NotificationSender>,
}

impl NoticeHandler {
    pub fn new(sender: Arc<dyn NotificationSender>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl Handler for NoticeHandler {
    async fn handle(&self, event: Event) -> anyhow::Result<Outcome> {
        let Change::Created { data } = &event.change else {
            return Ok(Outcome::skipped(SkipReason::Malformed));
        };
        let Some(notice) = decode::<Notice>(&event, data) else {
            return Ok(Outcome::skipped(SkipReason::Malformed));
        };

        self.sender.send(&notice_notification(notice)).await?;
        Ok(Outcome::Dispatched)
    }
}

fn notice_notification(notice: Notice) -> Notification {
    Notification::broadcast(
        Channel::Residents,
        format!("📢 New Notice: {}", notice.title),
        notice.description,
    )
    .with_data("type", "notice")
}
