use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// A cached token is treated as stale this long before Google says it expires.
const EXPIRY_MARGIN: Duration = Duration::from_secs(600);
const RETRY_DELAY: Duration = Duration::from_secs(30);
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Deserialize, Debug)]
struct GrantResponse {
    access_token: String,
    expires_in: u64,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Error body of the token endpoint, e.g. `{"error":"invalid_grant",...}`.
#[derive(Deserialize, Debug)]
struct GrantError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl std::fmt::Display for GrantError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error_description {
            Some(description) => write!(f, "{} ({})", self.error, description),
            None => f.write_str(&self.error),
        }
    }
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn new(value: String, lifetime: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + lifetime,
        }
    }

    fn is_fresh(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN < self.expires_at
    }

    fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

/// How long the background task sleeps before renewing a token that has
/// `remaining` lifetime left.
fn refresh_delay(remaining: Duration) -> Duration {
    remaining
        .saturating_sub(EXPIRY_MARGIN)
        .max(MIN_REFRESH_INTERVAL)
}

/// Google OAuth2 access tokens minted from a long-lived refresh token.
///
/// Tokens are cached until they come within [`EXPIRY_MARGIN`] of expiry;
/// concurrent callers that find the cache stale share a single grant request.
#[non_exhaustive]
pub struct TokenManager {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: RwLock<String>,
    cached: RwLock<Option<AccessToken>>,
    grant_lock: Mutex<()>,
}

impl TokenManager {
    #[must_use]
    pub fn new(client_id: String, client_secret: String, refresh_token: String) -> Self {
        Self {
            client: Client::new(),
            token_url: TOKEN_URL.to_string(),
            client_id,
            client_secret,
            refresh_token: RwLock::new(refresh_token),
            cached: RwLock::new(None),
            grant_lock: Mutex::new(()),
        }
    }

    /// Point the manager at a different token endpoint (for testing with mock servers)
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Returns a bearer token, running the refresh grant when the cached one
    /// is missing or about to expire.
    pub async fn get_token(&self) -> Result<String> {
        if let Some(token) = self.fresh_token().await {
            return Ok(token);
        }

        let _guard = self.grant_lock.lock().await;

        if let Some(token) = self.fresh_token().await {
            return Ok(token);
        }

        Ok(self.grant().await?.value)
    }

    /// Renews the token ahead of expiry so request paths rarely wait on
    /// the grant.
    pub fn start_background_loop(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("starting access token refresh task");

            loop {
                let renewed = {
                    let _guard = self.grant_lock.lock().await;
                    self.grant().await
                };

                let delay = match renewed {
                    Ok(token) => {
                        let delay = refresh_delay(token.remaining());
                        info!(next_refresh_secs = delay.as_secs(), "access token refreshed");
                        delay
                    }
                    Err(e) => {
                        error!("failed to refresh access token: {:#}. retrying in {:?}", e, RETRY_DELAY);
                        RETRY_DELAY
                    }
                };

                tokio::time::sleep(delay).await;
            }
        })
    }

    async fn fresh_token(&self) -> Option<String> {
        self.cached
            .read()
            .await
            .as_ref()
            .filter(|token| token.is_fresh())
            .map(|token| token.value.clone())
    }

    /// Callers hold `grant_lock`.
    async fn grant(&self) -> Result<AccessToken> {
        let refresh_token = self.refresh_token.read().await.clone();

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .context("token endpoint unreachable")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<GrantError>(&body) {
                Ok(grant_error) => anyhow::anyhow!("token refresh rejected ({}): {}", status, grant_error),
                Err(_) => anyhow::anyhow!("token refresh rejected ({}): {}", status, body),
            });
        }

        let grant = response
            .json::<GrantResponse>()
            .await
            .context("failed to parse token response")?;

        // Google normally keeps the refresh token; if it hands out a new one,
        // later grants must use it.
        if let Some(issued) = grant.refresh_token.filter(|rt| *rt != refresh_token) {
            warn!("token endpoint issued a new refresh token, the configured one is superseded");
            *self.refresh_token.write().await = issued;
        }

        let token = AccessToken::new(grant.access_token, Duration::from_secs(grant.expires_in));
        debug!(expires_in = grant.expires_in, "access token granted");

        *self.cached.write().await = Some(token.clone());
        Ok(token)
    }

    /// Set a token directly, bypassing OAuth refresh. For testing only.
    #[cfg(any(test, feature = "test-support"))]
    pub async fn set_token_for_test(&self, token: String) {
        let mut lock = self.cached.write().await;
        *lock = Some(AccessToken::new(token, Duration::from_secs(3600)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_manager() -> TokenManager {
        TokenManager::new(
            "test_client_id".to_string(),
            "test_secret".to_string(),
            "test_refresh".to_string(),
        )
    }

    #[test]
    fn test_refresh_delay_leaves_margin_before_expiry() {
        assert_eq!(refresh_delay(Duration::from_secs(3599)), Duration::from_secs(2999));
        assert_eq!(refresh_delay(Duration::from_secs(600)), MIN_REFRESH_INTERVAL);
        assert_eq!(refresh_delay(Duration::ZERO), MIN_REFRESH_INTERVAL);
    }

    #[test]
    fn test_token_inside_margin_is_stale() {
        assert!(AccessToken::new("a".to_string(), Duration::from_secs(3599)).is_fresh());
        assert!(!AccessToken::new("b".to_string(), Duration::from_secs(300)).is_fresh());
        assert!(!AccessToken::new("c".to_string(), Duration::ZERO).is_fresh());
    }

    #[test]
    fn test_grant_error_reads_like_google() {
        let err: GrantError = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#,
        )
        .unwrap();
        assert_eq!(err.to_string(), "invalid_grant (Token has been expired or revoked.)");

        let err: GrantError = serde_json::from_str(r#"{"error":"invalid_client"}"#).unwrap();
        assert_eq!(err.to_string(), "invalid_client");
    }

    #[tokio::test]
    async fn test_cached_token_skips_the_grant() {
        // an unreachable endpoint proves no request is made
        let manager = make_manager().with_token_url("http://127.0.0.1:1/token");
        manager.set_token_for_test("ya29.cached".to_string()).await;

        assert_eq!(manager.get_token().await.unwrap(), "ya29.cached");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let manager = make_manager().with_token_url("http://127.0.0.1:1/token");

        let err = manager.get_token().await.unwrap_err();
        assert!(err.to_string().contains("token endpoint unreachable"));
    }
}
