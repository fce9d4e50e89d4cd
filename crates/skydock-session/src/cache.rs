use crate::history::StoredSession;
use async_trait::async_trait;
use skydock_chat::SessionNotifier;
use skydock_core::{ChatSession, SkydockResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Seam to whatever serves session list and detail views.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Fetches all sessions visible to the current user.
    async fn fetch_sessions(&self) -> SkydockResult<Vec<ChatSession>>;
    /// Fetches one session with its stored messages.
    async fn fetch_session(&self, id: Uuid) -> SkydockResult<Option<StoredSession>>;
}

/// Read-through cache over a [`SessionSource`].
///
/// The backend owns sessions; this holds read-only copies. Invalidation
/// drops cached views so the next read refetches — that is how
/// server-computed title updates become visible after a turn.
pub struct SessionCache {
    source: Arc<dyn SessionSource>,
    list: RwLock<Option<Vec<ChatSession>>>,
    details: RwLock<HashMap<Uuid, StoredSession>>,
}

impl SessionCache {
    /// Creates an empty cache over the given source.
    pub fn new(source: Arc<dyn SessionSource>) -> Self {
        Self {
            source,
            list: RwLock::new(None),
            details: RwLock::new(HashMap::new()),
        }
    }

    /// The session list, fetched on first use.
    pub async fn sessions(&self) -> SkydockResult<Vec<ChatSession>> {
        if let Some(cached) = self.list.read().await.as_ref() {
            return Ok(cached.clone());
        }
        let fetched = self.source.fetch_sessions().await?;
        *self.list.write().await = Some(fetched.clone());
        Ok(fetched)
    }

    /// One session's detail view, fetched on first use.
    pub async fn session(&self, id: Uuid) -> SkydockResult<Option<StoredSession>> {
        if let Some(cached) = self.details.read().await.get(&id) {
            return Ok(Some(cached.clone()));
        }
        let fetched = self.source.fetch_session(id).await?;
        if let Some(detail) = &fetched {
            self.details.write().await.insert(id, detail.clone());
        }
        Ok(fetched)
    }

    /// Drops the cached list and the cached detail for one session.
    pub async fn invalidate(&self, id: Uuid) {
        *self.list.write().await = None;
        self.details.write().await.remove(&id);
    }

    /// Drops every cached view.
    pub async fn invalidate_all(&self) {
        *self.list.write().await = None;
        self.details.write().await.clear();
    }
}

#[async_trait]
impl SessionNotifier for SessionCache {
    async fn turn_completed(&self, session_id: Uuid) {
        tracing::debug!(session_id = %session_id, "invalidating session views after turn");
        self.invalidate(session_id).await;
    }
}
