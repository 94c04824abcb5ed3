use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

/// One write observed on the document store, as delivered by the change feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChange {
    pub collection: String,
    pub document_id: String,
    pub kind: ChangeKind,
    #[serde(default)]
    pub before: Option<Map<String, Value>>,
    #[serde(default)]
    pub after: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageTarget {
    Token(String),
    Topic(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Push message in the HTTP v1 wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    #[serde(flatten)]
    pub target: MessageTarget,
    pub notification: Notification,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<AndroidConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AndroidConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<AndroidPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<AndroidNotification>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AndroidPriority {
    Normal,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AndroidNotification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_priority: Option<NotificationPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotificationPriority {
    #[serde(rename = "PRIORITY_DEFAULT")]
    Default,
    #[serde(rename = "PRIORITY_HIGH")]
    High,
    #[serde(rename = "PRIORITY_MAX")]
    Max,
}

/// Lock-screen visibility. Only `PUBLIC` is ever requested; leaving the field
/// out keeps the device default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    Public,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_message_wire_shape() {
        let message = Message {
            target: MessageTarget::Token("tok123".to_string()),
            notification: Notification {
                title: "hello".to_string(),
                body: "world".to_string(),
            },
            data: BTreeMap::from([("type".to_string(), "visitor_request".to_string())]),
            android: Some(AndroidConfig {
                priority: Some(AndroidPriority::High),
                notification: Some(AndroidNotification {
                    channel_id: Some("high_importance_channel".to_string()),
                    notification_priority: Some(NotificationPriority::Max),
                    visibility: Some(Visibility::Public),
                    sound: None,
                }),
            }),
        };

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "token": "tok123",
                "notification": { "title": "hello", "body": "world" },
                "data": { "type": "visitor_request" },
                "android": {
                    "priority": "HIGH",
                    "notification": {
                        "channel_id": "high_importance_channel",
                        "notification_priority": "PRIORITY_MAX",
                        "visibility": "PUBLIC"
                    }
                }
            })
        );
    }

    #[test]
    fn test_topic_message_omits_empty_sections() {
        let message = Message {
            target: MessageTarget::Topic("residents".to_string()),
            notification: Notification {
                title: "t".to_string(),
                body: "b".to_string(),
            },
            data: BTreeMap::new(),
            android: None,
        };

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "topic": "residents",
                "notification": { "title": "t", "body": "b" }
            })
        );
    }

    #[test]
    fn test_parse_document_change() {
        let json = r#"{
            "collection": "visitorRequests",
            "documentId": "req-1",
            "kind": "update",
            "before": { "status": "pending" },
            "after": { "status": "approved" }
        }"#;

        let change: DocumentChange = serde_json::from_str(json).unwrap();
        assert_eq!(change.collection, "visitorRequests");
        assert_eq!(change.document_id, "req-1");
        assert_eq!(change.kind, ChangeKind::Update);
        assert_eq!(change.before.unwrap()["status"], "pending");
        assert_eq!(change.after.unwrap()["status"], "approved");
    }

    #[test]
    fn test_parse_document_change_without_images() {
        let json = r#"{"collection":"notices","documentId":"n1","kind":"delete"}"#;

        let change: DocumentChange = serde_json::from_str(json).unwrap();
        assert_eq!(change.kind, ChangeKind::Delete);
        assert!(change.before.is_none());
        assert!(change.after.is_none());
    }
}
