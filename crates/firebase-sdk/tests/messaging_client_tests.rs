//! Integration tests for MessagingClient against a local HTTP mock.

mod common;

use std::collections::BTreeMap;

use common::{MockHttpServer, test_token_manager};
use firebase_sdk::{
    AndroidConfig, AndroidNotification, AndroidPriority, Message, MessageTarget, MessagingClient,
    Notification, NotificationPriority, Visibility,
};
use serde_json::json;

fn sos_message() -> Message {
    Message {
        target: MessageTarget::Topic("security_alerts".to_string()),
        notification: Notification {
            title: "🚨 SOS EMERGENCY ALERT 🚨".to_string(),
            body: "Emergency at Flat 202. CHECK IMMEDIATELY.".to_string(),
        },
        data: BTreeMap::from([
            ("type".to_string(), "sos_alert".to_string()),
            ("alertId".to_string(), "alert-1".to_string()),
        ]),
        android: Some(AndroidConfig {
            priority: Some(AndroidPriority::High),
            notification: Some(AndroidNotification {
                channel_id: Some("sos_channel".to_string()),
                notification_priority: Some(NotificationPriority::Max),
                visibility: Some(Visibility::Public),
                sound: Some("siren".to_string()),
            }),
        }),
    }
}

#[tokio::test]
async fn test_send_posts_message_with_bearer_token() {
    let mut server = MockHttpServer::start(vec![(
        200,
        r#"{"name":"projects/society-app/messages/0:123"}"#,
    )])
    .await;

    let client = MessagingClient::new(test_token_manager().await, "society-app".to_string())
        .with_url(server.url());

    let name = client.send(&sos_message()).await.unwrap();
    assert_eq!(name, "projects/society-app/messages/0:123");

    let request = server.next_request().await;
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/v1/projects/society-app/messages:send");
    assert_eq!(request.header("authorization"), Some("Bearer ya29.test_token"));

    let body = request.json();
    assert_eq!(body["message"]["topic"], "security_alerts");
    assert_eq!(
        body["message"]["notification"]["body"],
        "Emergency at Flat 202. CHECK IMMEDIATELY."
    );
    assert_eq!(body["message"]["data"]["type"], "sos_alert");
    assert_eq!(body["message"]["android"]["priority"], "HIGH");
    assert_eq!(
        body["message"]["android"]["notification"],
        json!({
            "channel_id": "sos_channel",
            "notification_priority": "PRIORITY_MAX",
            "visibility": "PUBLIC",
            "sound": "siren"
        })
    );
}

#[tokio::test]
async fn test_send_surfaces_rejection() {
    let mut server = MockHttpServer::start(vec![(
        400,
        r#"{"error":{"code":400,"message":"The registration token is not a valid FCM registration token"}}"#,
    )])
    .await;

    let client = MessagingClient::new(test_token_manager().await, "society-app".to_string())
        .with_url(server.url());

    let err = client.send(&sos_message()).await.unwrap_err().to_string();
    assert!(err.contains("400"), "unexpected error: {}", err);
    assert!(err.contains("registration token"), "unexpected error: {}", err);

    server.next_request().await;
}
