//! Outbound port to the index backend.
//!
//! The projector talks to whatever holds the replica (the in-memory
//! reference adapter, or a real database) through this trait alone.

use crate::domain::{AssetRow, HistoryRow, UserRow};
use async_trait::async_trait;
use thiserror::Error;

/// The index backend was unreachable or refused the write. The offending
/// delivery is not acknowledged and will be retried.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IndexError {
    #[error("index backend unavailable: {0}")]
    Unavailable(String),
    #[error("index backend rejected the write: {0}")]
    Rejected(String),
}

/// Result of a sequence-guarded upsert.
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome<R> {
    /// The row was written; `replaced` is the previous row, if any.
    Applied { replaced: Option<R> },
    /// The stored row's sequence was equal or newer; nothing changed.
    Stale { stored_sequence: u64 },
}

impl<R> UpsertOutcome<R> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Replica storage for the read-optimized copy of the ledger.
///
/// Upserts apply only when the incoming sequence is strictly greater than
/// the stored one; deletes are unconditional (tombstones carry no
/// sequence). History appends deduplicate on `(ordinal, entity_id)` so a
/// replayed delivery leaves the trail unchanged.
#[async_trait]
pub trait IndexStore: Send + Sync {
    async fn upsert_asset(&self, row: AssetRow) -> Result<UpsertOutcome<AssetRow>, IndexError>;
    async fn upsert_user(&self, row: UserRow) -> Result<UpsertOutcome<UserRow>, IndexError>;

    async fn delete_asset(&self, id: &str) -> Result<(), IndexError>;
    async fn delete_user(&self, id: &str) -> Result<(), IndexError>;

    async fn append_history(&self, row: HistoryRow) -> Result<(), IndexError>;

    // Downstream read surface.
    async fn asset(&self, id: &str) -> Result<Option<AssetRow>, IndexError>;
    async fn assets(&self) -> Result<Vec<AssetRow>, IndexError>;
    async fn user(&self, id: &str) -> Result<Option<UserRow>, IndexError>;
    async fn users(&self) -> Result<Vec<UserRow>, IndexError>;
    /// Audit trail for one entity, in delivery order.
    async fn history_for(&self, entity_id: &str) -> Result<Vec<HistoryRow>, IndexError>;
}
