use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;

use super::decode;
use crate::{
    domain::{
        models::{Change, Event, VisitorRequest},
        notification::{
            DeliveryHints, HIGH_IMPORTANCE_CHANNEL, Importance, Notification, VisualChannel,
        },
        outcome::{Outcome, SkipReason},
        sender::NotificationSender,
        store::ProfileStore,
    },
    infra::consumer::router::traits::Handler,
};

const TITLE: &str = "Visitor Arriving! 🏃";

/// Tells the resident a visitor is waiting at the gate for their approval.
#[non_exhaustive]
pub struct VisitorArrivalHandler {
    store: Arc<dyn ProfileStore>,
    sender: Arc<dyn NotificationSender>,
}

impl VisitorArrivalHandler {
    pub fn new(store: Arc<dyn ProfileStore>, sender: Arc<dyn NotificationSender>) -> Self {
        Self { store, sender }
    }
}

#[async_trait]
impl Handler for VisitorArrivalHandler {
    async fn handle(&self, event: Event) -> anyhow::Result<Outcome> {
        let Change::Created { data } = &event.change else {
            return Ok(Outcome::skipped(SkipReason::Malformed));
        };
        let Some(request) = decode::<VisitorRequest>(&event, data) else {
            return Ok(Outcome::skipped(SkipReason::Malformed));
        };
        let Some(resident_id) = request.resident_id.as_deref() else {
            return Ok(Outcome::skipped(SkipReason::MissingResident));
        };

        let Some(profile) = self
            .store
            .profile(resident_id)
            .await
            .with_context(|| format!("profile lookup for resident {resident_id}"))?
        else {
            return Ok(Outcome::skipped(SkipReason::ProfileNotFound));
        };
        let Some(token) = profile.fcm_token else {
            return Ok(Outcome::skipped(SkipReason::NoDeviceToken));
        };

        let notification = arrival_notification(&event.record_id, &request, token);
        self.sender.send(&notification).await?;

        Ok(Outcome::Dispatched)
    }
}

fn arrival_notification(request_id: &str, request: &VisitorRequest, token: String) -> Notification {
    Notification::direct(
        token,
        TITLE,
        format!(
            "{} is here for {}. Approve entry?",
            request.visitor_name, request.purpose
        ),
    )
    .with_data("type", "visitor_request")
    .with_data("requestId", request_id)
    .with_hints(DeliveryHints::high(
        VisualChannel::new(HIGH_IMPORTANCE_CHANNEL, Importance::Max).public(),
    ))
}
