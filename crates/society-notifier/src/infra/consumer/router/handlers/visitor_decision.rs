use std::sync::Arc;

use async_trait::async_trait;

use super::decode;
use crate::{
    domain::{
        models::{Change, Event, VisitorRequest, VisitorStatus},
        notification::{
            Channel, DeliveryHints, HIGH_IMPORTANCE_CHANNEL, Importance, Notification,
            VisualChannel,
        },
        outcome::{Outcome, SkipReason},
        sender::NotificationSender,
    },
    infra::consumer::router::traits::Handler,
};

/// Lets the gate know a resident approved or rejected a visitor.
#[non_exhaustive]
pub struct VisitorDecisionHandler {
    sender: Arc<dyn NotificationSender>,
}

impl VisitorDecisionHandler {
    pub fn new(sender: Arc<dyn NotificationSender>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl Handler for VisitorDecisionHandler {
    async fn handle(&self, event: Event) -> anyhow::Result<Outcome> {
        let Change::Updated { before, after } = &event.change else {
            return Ok(Outcome::skipped(SkipReason::Malformed));
        };
        let (Some(before), Some(after)) = (
            decode::<VisitorRequest>(&event, before),
            decode::<VisitorRequest>(&event, after),
        ) else {
            return Ok(Outcome::skipped(SkipReason::Malformed));
        };

        let decision = match decision(&before, &after) {
            Ok(status) => status,
            Err(reason) => return Ok(Outcome::skipped(reason)),
        };

        self.sender
            .send(&decision_notification(decision, &after))
            .await?;
        Ok(Outcome::Dispatched)
    }
}

/// The status only counts when this write changed it and landed on a
/// decision; writes to other fields fire updates too.
fn decision(before: &VisitorRequest, after: &VisitorRequest) -> Result<VisitorStatus, SkipReason> {
    if before.status == after.status {
        return Err(SkipReason::StatusUnchanged);
    }

    match after.status {
        Some(status) if status.is_decision() => Ok(status),
        _ => Err(SkipReason::NotADecision),
    }
}

fn decision_notification(status: VisitorStatus, request: &VisitorRequest) -> Notification {
    let label = status.label();
    let glyph = if status == VisitorStatus::Approved {
        "✅"
    } else {
        "🚫"
    };

    Notification::broadcast(
        Channel::Guards,
        format!("Visitor {} {}", label, glyph),
        format!(
            "{} for {}-{} has been {}.",
            request.visitor_name, request.wing, request.flat_number, label
        ),
    )
    .with_hints(DeliveryHints::high(VisualChannel::new(
        HIGH_IMPORTANCE_CHANNEL,
        Importance::High,
    )))
}
