use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use firebase_sdk::{
    AndroidConfig, AndroidNotification, AndroidPriority, Message, MessageTarget, MessagingClient,
    NotificationPriority, TokenManager, Visibility,
};
use tracing::debug;

use crate::domain::{
    notification::{Importance, Notification, Priority, Target, VisualChannel},
    sender::NotificationSender,
};
use crate::infra::Config;

/// Intent attached to every data-carrying message so that tapping the
/// notification opens the mobile app.
pub const DEFAULT_CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

/// Delivers notifications through Firebase Cloud Messaging.
#[non_exhaustive]
pub struct FcmSender {
    client: MessagingClient,
    click_action: Option<String>,
}

impl FcmSender {
    pub fn new(config: &Config, token_manager: Arc<TokenManager>) -> anyhow::Result<Self> {
        let project_id = config.require("SOCIETY_PROJECT_ID")?.to_string();

        let mut client = MessagingClient::new(token_manager, project_id);
        if let Some(url) = config.optional("SOCIETY_FCM_URL") {
            client = client.with_url(url);
        }

        let click_action = match config.optional("SOCIETY_CLICK_ACTION") {
            Some("") => None,
            Some(action) => Some(action.to_string()),
            None => Some(DEFAULT_CLICK_ACTION.to_string()),
        };

        Ok(Self {
            client,
            click_action,
        })
    }
}

#[async_trait]
impl NotificationSender for FcmSender {
    async fn send(&self, notification: &Notification) -> anyhow::Result<()> {
        let message = to_message(notification, self.click_action.as_deref());
        let name = self
            .client
            .send(&message)
            .await
            .context("FCM send failed")?;

        debug!(message = %name, "FCM accepted message");
        Ok(())
    }
}

pub fn to_message(notification: &Notification, click_action: Option<&str>) -> Message {
    let target = match &notification.target {
        Target::Device(token) => MessageTarget::Token(token.clone()),
        Target::Channel(channel) => MessageTarget::Topic(channel.topic().to_string()),
    };

    let mut data = notification.data.clone();
    if let Some(action) = click_action {
        if !data.is_empty() {
            data.entry("click_action".to_string())
                .or_insert_with(|| action.to_string());
        }
    }

    Message {
        target,
        notification: firebase_sdk::Notification {
            title: notification.title.clone(),
            body: notification.body.clone(),
        },
        data,
        android: android_config(notification),
    }
}

fn android_config(notification: &Notification) -> Option<AndroidConfig> {
    let hints = &notification.hints;
    if hints.priority == Priority::Normal && hints.visual.is_none() {
        return None;
    }

    Some(AndroidConfig {
        priority: Some(match hints.priority {
            Priority::Normal => AndroidPriority::Normal,
            Priority::High => AndroidPriority::High,
        }),
        notification: hints.visual.as_ref().map(android_notification),
    })
}

fn android_notification(visual: &VisualChannel) -> AndroidNotification {
    AndroidNotification {
        channel_id: Some(visual.category.clone()),
        notification_priority: Some(match visual.importance {
            Importance::Default => NotificationPriority::Default,
            Importance::High => NotificationPriority::High,
            Importance::Max => NotificationPriority::Max,
        }),
        visibility: visual.public.then_some(Visibility::Public),
        sound: visual.sound.clone(),
    }
}
