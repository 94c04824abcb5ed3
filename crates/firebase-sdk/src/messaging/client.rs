use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::auth::TokenManager;
use crate::types::Message;

const MESSAGING_API_URL: &str = "https://fcm.googleapis.com";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: &'a Message,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    name: String,
}

/// Client for the push messaging `messages:send` endpoint.
#[non_exhaustive]
pub struct MessagingClient {
    token_manager: Arc<TokenManager>,
    client: Client,
    project_id: String,
    base_url: String,
}

impl MessagingClient {
    #[must_use]
    pub fn new(token_manager: Arc<TokenManager>, project_id: String) -> Self {
        Self {
            token_manager,
            client: Client::new(),
            project_id,
            base_url: MESSAGING_API_URL.to_string(),
        }
    }

    /// Set a custom API base URL (for testing with mock servers)
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn endpoint(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).context("invalid messaging base url")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("messaging base url cannot be a base"))?
            .pop_if_empty()
            .extend(["v1", "projects", &self.project_id, "messages:send"]);
        Ok(url)
    }

    /// Hands one message to the delivery service and returns the message name
    /// it was accepted under.
    pub async fn send(&self, message: &Message) -> Result<String> {
        let token = self.token_manager.get_token().await.context("auth failed")?;

        let response = self
            .client
            .post(self.endpoint()?)
            .bearer_auth(token)
            .json(&SendRequest { message })
            .send()
            .await
            .context("messaging request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Failed to send message: {} - {}",
                status,
                body
            ));
        }

        let accepted: SendResponse = response
            .json()
            .await
            .context("failed to parse send response")?;

        debug!(name = %accepted.name, "message accepted");
        Ok(accepted.name)
    }
}
