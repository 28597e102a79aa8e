//! Process-wide in-memory session store.

use super::{SessionData, SessionId, SessionStore};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
struct Entry {
    data: SessionData,
    expires_at: DateTime<Utc>,
}

/// Concurrency-safe in-memory [`SessionStore`].
///
/// Entries expire `ttl` after their last save; every save resets the clock,
/// which gives the sliding lifetime. Expired entries are dropped lazily on
/// the next access.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<RwLock<HashMap<SessionId, Entry>>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.read().values().filter(|e| e.expires_at > now).count()
    }

    /// Whether the store holds no live sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<SessionId, Entry>> {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<SessionId, Entry>> {
        self.entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: SessionId) -> Result<Option<SessionData>> {
        let mut entries = self.write();
        match entries.get(&id) {
            Some(entry) if entry.expires_at > Utc::now() => Ok(Some(entry.data.clone())),
            Some(_) => {
                entries.remove(&id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn save(&self, id: SessionId, data: SessionData, ttl: Duration) -> Result<()> {
        let mut entries = self.write();
        // Saves are the natural point to shed expired neighbors.
        let now = Utc::now();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            id,
            Entry {
                data,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn destroy(&self, id: SessionId) -> Result<()> {
        self.write().remove(&id);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_returns_saved_data() {
        let store = MemorySessionStore::new();
        let id = SessionId::new();
        let mut data = SessionData::default();
        data.user_id = Some(3);

        store.save(id, data.clone(), Duration::hours(24)).await.unwrap();

        assert_eq!(store.load(id).await.unwrap(), Some(data));
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent() {
        let store = MemorySessionStore::new();
        let id = SessionId::new();

        store
            .save(id, SessionData::default(), Duration::seconds(-1))
            .await
            .unwrap();

        assert_eq!(store.load(id).await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn save_slides_expiration() {
        let store = MemorySessionStore::new();
        let id = SessionId::new();

        store
            .save(id, SessionData::default(), Duration::seconds(-1))
            .await
            .unwrap();
        store
            .save(id, SessionData::default(), Duration::hours(24))
            .await
            .unwrap();

        assert!(store.load(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn destroy_removes_entry() {
        let store = MemorySessionStore::new();
        let id = SessionId::new();

        store
            .save(id, SessionData::default(), Duration::hours(24))
            .await
            .unwrap();
        store.destroy(id).await.unwrap();

        assert_eq!(store.load(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_visitor() {
        let store = MemorySessionStore::new();
        let (a, b) = (SessionId::new(), SessionId::new());
        let mut data = SessionData::default();
        data.flash = Some("for a only".to_string());

        store.save(a, data, Duration::hours(24)).await.unwrap();
        store
            .save(b, SessionData::default(), Duration::hours(24))
            .await
            .unwrap();

        assert_eq!(store.load(b).await.unwrap().unwrap().flash, None);
    }
}
