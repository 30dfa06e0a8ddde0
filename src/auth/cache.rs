use std::future::Future;

use tokio::sync::RwLock;

use super::{AccessToken, AuthError};

/// Caches one access token and refreshes it when it nears expiry.
///
/// Concurrent callers that find the token stale serialize on the write lock,
/// so only the first of them hits the token endpoint.
#[derive(Default)]
pub(crate) struct TokenCache {
    slot: RwLock<Option<AccessToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<String, AuthError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AccessToken, AuthError>>,
    {
        if let Some(token) = self.slot.read().await.as_ref().filter(|t| !t.needs_refresh()) {
            return Ok(token.token.clone());
        }

        let mut slot = self.slot.write().await;
        if let Some(token) = slot.as_ref().filter(|t| !t.needs_refresh()) {
            return Ok(token.token.clone());
        }

        let fresh = fetch().await?;
        tracing::debug!(expires_at = ?fresh.expires_at, "Fetched new access token");
        let token = fresh.token.clone();
        *slot = Some(fresh);
        Ok(token)
    }
}
