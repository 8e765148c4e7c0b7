//! In-memory reference adapter for the index backend.

use crate::domain::{AssetRow, HistoryRow, UserRow};
use crate::ports::{IndexError, IndexStore, UpsertOutcome};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;

#[derive(Default)]
struct Inner {
    assets: BTreeMap<String, AssetRow>,
    users: BTreeMap<String, UserRow>,
    history: Vec<HistoryRow>,
}

/// BTreeMap-backed [`IndexStore`], the reference implementation used in
/// tests and single-process deployments.
#[derive(Default)]
pub struct MemoryIndexStore {
    inner: Mutex<Inner>,
}

impl MemoryIndexStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total history rows across all entities.
    pub fn history_len(&self) -> usize {
        self.inner.lock().history.len()
    }
}

#[async_trait]
impl IndexStore for MemoryIndexStore {
    async fn upsert_asset(&self, row: AssetRow) -> Result<UpsertOutcome<AssetRow>, IndexError> {
        let mut inner = self.inner.lock();
        match inner.assets.get(&row.id) {
            Some(stored) if stored.sequence >= row.sequence => Ok(UpsertOutcome::Stale {
                stored_sequence: stored.sequence,
            }),
            _ => {
                let replaced = inner.assets.insert(row.id.clone(), row);
                Ok(UpsertOutcome::Applied { replaced })
            }
        }
    }

    async fn upsert_user(&self, row: UserRow) -> Result<UpsertOutcome<UserRow>, IndexError> {
        let mut inner = self.inner.lock();
        match inner.users.get(&row.id) {
            Some(stored) if stored.sequence >= row.sequence => Ok(UpsertOutcome::Stale {
                stored_sequence: stored.sequence,
            }),
            _ => {
                let replaced = inner.users.insert(row.id.clone(), row);
                Ok(UpsertOutcome::Applied { replaced })
            }
        }
    }

    async fn delete_asset(&self, id: &str) -> Result<(), IndexError> {
        self.inner.lock().assets.remove(id);
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<(), IndexError> {
        self.inner.lock().users.remove(id);
        Ok(())
    }

    async fn append_history(&self, row: HistoryRow) -> Result<(), IndexError> {
        let mut inner = self.inner.lock();
        // A replayed delivery appends nothing.
        let seen = inner
            .history
            .iter()
            .any(|h| h.ordinal == row.ordinal && h.entity_id == row.entity_id);
        if !seen {
            inner.history.push(row);
        }
        Ok(())
    }

    async fn asset(&self, id: &str) -> Result<Option<AssetRow>, IndexError> {
        Ok(self.inner.lock().assets.get(id).cloned())
    }

    async fn assets(&self) -> Result<Vec<AssetRow>, IndexError> {
        Ok(self.inner.lock().assets.values().cloned().collect())
    }

    async fn user(&self, id: &str) -> Result<Option<UserRow>, IndexError> {
        Ok(self.inner.lock().users.get(id).cloned())
    }

    async fn users(&self) -> Result<Vec<UserRow>, IndexError> {
        Ok(self.inner.lock().users.values().cloned().collect())
    }

    async fn history_for(&self, entity_id: &str) -> Result<Vec<HistoryRow>, IndexError> {
        Ok(self
            .inner
            .lock()
            .history
            .iter()
            .filter(|h| h.entity_id == entity_id)
            .cloned()
            .collect())
    }
}
