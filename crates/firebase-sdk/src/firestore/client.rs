use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use super::types::Document;
use crate::auth::TokenManager;

const FIRESTORE_API_URL: &str = "https://firestore.googleapis.com";
const DEFAULT_DATABASE: &str = "(default)";

/// Read-only client for single documents of the document store.
#[non_exhaustive]
pub struct FirestoreClient {
    token_manager: Arc<TokenManager>,
    client: Client,
    project_id: String,
    base_url: String,
}

impl FirestoreClient {
    #[must_use]
    pub fn new(token_manager: Arc<TokenManager>, project_id: String) -> Self {
        Self {
            token_manager,
            client: Client::new(),
            project_id,
            base_url: FIRESTORE_API_URL.to_string(),
        }
    }

    /// Set a custom API base URL (for testing with mock servers)
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn document_url(&self, collection: &str, id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).context("invalid document store base url")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("document store base url cannot be a base"))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                &self.project_id,
                "databases",
                DEFAULT_DATABASE,
                "documents",
                collection,
                id,
            ]);
        Ok(url)
    }

    /// Fetches `collection/id`. A document that does not exist is `Ok(None)`.
    pub async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let token = self.token_manager.get_token().await.context("auth failed")?;
        let url = self.document_url(collection, id)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .context("document request failed")?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(collection, id, "document not found");
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Failed to read {}/{}: {} - {}",
                collection,
                id,
                status,
                body
            ));
        }

        let document = response
            .json::<Document>()
            .await
            .context("failed to parse document")?;

        Ok(Some(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client() -> FirestoreClient {
        let tm = Arc::new(TokenManager::new(
            "id".to_string(),
            "secret".to_string(),
            "refresh".to_string(),
        ));
        FirestoreClient::new(tm, "society-app".to_string())
    }

    #[test]
    fn test_document_url() {
        let url = make_client().document_url("users", "u1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://firestore.googleapis.com/v1/projects/society-app/databases/(default)/documents/users/u1"
        );
    }

    #[test]
    fn test_document_url_escapes_id() {
        let url = make_client().document_url("users", "a/b c").unwrap();
        assert!(url.as_str().ends_with("/documents/users/a%2Fb%20c"));
    }
}
