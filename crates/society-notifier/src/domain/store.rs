use async_trait::async_trait;

use crate::domain::models::UserProfile;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// `Ok(None)` when no profile exists for `user_id`.
    async fn profile(&self, user_id: &str) -> anyhow::Result<Option<UserProfile>>;
}
