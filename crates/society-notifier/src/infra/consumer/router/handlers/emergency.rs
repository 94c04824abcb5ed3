use std::sync::Arc;

use async_trait::async_trait;

use super::decode;
use crate::{
    domain::{
        models::{Change, Event, SosAlert},
        notification::{
            Channel, DeliveryHints, Importance, Notification, SIREN_SOUND, SOS_CHANNEL,
            VisualChannel,
        },
        outcome::{Outcome, SkipReason},
        sender::NotificationSender,
    },
    infra::consumer::router::traits::Handler,
};

const TITLE: &str = "🚨 SOS EMERGENCY ALERT 🚨";

/// Raises an SOS alarm on every guard and admin device.
///
/// Goes out on the security-alerts topic rather than per-recipient lookups,
/// so guards and admins only receive it once their app has subscribed.
#[non_exhaustive]
pub struct EmergencyHandler {
    sender: Arc<dyn NotificationSender>,
}

impl EmergencyHandler {
    pub fn new(sender: Arc<dyn NotificationSender>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl Handler for EmergencyHandler {
    async fn handle(&self, event: Event) -> anyhow::Result<Outcome> {
        let Change::Created { data } = &event.change else {
            return Ok(Outcome::skipped(SkipReason::Malformed));
        };
        let Some(alert) = decode::<SosAlert>(&event, data) else {
            return Ok(Outcome::skipped(SkipReason::Malformed));
        };

        self.sender
            .send(&sos_notification(&event.record_id, &alert))
            .await?;
        Ok(Outcome::Dispatched)
    }
}

fn sos_notification(alert_id: &str, alert: &SosAlert) -> Notification {
    Notification::broadcast(
        Channel::SecurityAlerts,
        TITLE,
        format!("Emergency at Flat {}. CHECK IMMEDIATELY.", alert.flat_number),
    )
    .with_data("type", "sos_alert")
    .with_data("alertId", alert_id)
    .with_hints(DeliveryHints::high(
        VisualChannel::new(SOS_CHANNEL, Importance::Max)
            .public()
            .with_sound(SIREN_SOUND),
    ))
}
