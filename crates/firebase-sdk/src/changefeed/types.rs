use serde::{Deserialize, Serialize};

use crate::types::DocumentChange;

/// Frames pushed by the change feed server.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    Change(DocumentChange),
    Keepalive,
    Reconnect,
}

#[derive(Debug, Serialize)]
pub struct SubscribeRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub token: &'a str,
    pub collections: &'a [String],
}

impl<'a> SubscribeRequest<'a> {
    pub fn new(token: &'a str, collections: &'a [String]) -> Self {
        Self {
            kind: "subscribe",
            token,
            collections,
        }
    }
}
