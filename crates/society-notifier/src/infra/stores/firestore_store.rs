use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use firebase_sdk::{FirestoreClient, TokenManager};

use crate::domain::{
    models::{Collection, FromRecord, UserProfile},
    store::ProfileStore,
};
use crate::infra::Config;

/// Reads resident profiles from the `users` collection.
#[non_exhaustive]
pub struct FirestoreProfileStore {
    client: FirestoreClient,
}

impl FirestoreProfileStore {
    pub fn new(config: &Config, token_manager: Arc<TokenManager>) -> anyhow::Result<Self> {
        let project_id = config.require("SOCIETY_PROJECT_ID")?.to_string();

        let mut client = FirestoreClient::new(token_manager, project_id);
        if let Some(url) = config.optional("SOCIETY_FIRESTORE_URL") {
            client = client.with_url(url);
        }

        Ok(Self { client })
    }
}

#[async_trait]
impl ProfileStore for FirestoreProfileStore {
    async fn profile(&self, user_id: &str) -> anyhow::Result<Option<UserProfile>> {
        let Some(doc) = self
            .client
            .get_document(Collection::Users.as_str(), user_id)
            .await?
        else {
            return Ok(None);
        };

        let profile = UserProfile::from_record(&doc.into_json())
            .with_context(|| format!("decoding profile {user_id}"))?;

        Ok(Some(profile))
    }
}
