//! # StateStore Port
//!
//! Abstract interface over the authoritative transactional key-value store.
//! Registries and the coordinator commit only through [`StateStore`]; any
//! engine with atomic per-call commits can back it.
//!
//! Production deployments adapt their transactional KV/document engine;
//! [`MemoryStateStore`] below is the reference and test adapter.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by the storage backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateStoreError {
    /// A conditional `Insert` found the key already present.
    #[error("key already exists: {key}")]
    KeyExists { key: String },

    /// Backend failure (I/O, connectivity, corruption).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// One operation inside an atomic commit.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    /// Unconditional write.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Create-if-absent; fails the whole commit if the key exists.
    Insert { key: Vec<u8>, value: Vec<u8> },
    /// Remove a key (no-op if absent).
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self::Put { key: key.into(), value: value.into() }
    }

    pub fn insert(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self::Insert { key: key.into(), value: value.into() }
    }

    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        Self::Delete { key: key.into() }
    }
}

/// One revision in a key's version log. `value: None` marks a tombstone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    /// Commit ordinal within the store, increasing per atomic commit.
    pub commit: u64,
    pub value: Option<Vec<u8>>,
}

/// Transactional key-value service with atomic per-call commits.
pub trait StateStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateStoreError>;

    /// Ordered scan of `[start, end)`. An empty `end` means unbounded.
    fn range_scan(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StateStoreError>;

    /// Per-key version log, oldest first.
    fn history_of(&self, key: &[u8]) -> Result<Vec<VersionEntry>, StateStoreError>;

    /// Apply a batch atomically: either every operation commits or none do.
    fn atomic_commit(&mut self, ops: Vec<BatchOperation>) -> Result<(), StateStoreError>;
}

/// Shared handle to a store: registry operations take the write lock for
/// their whole call, giving single-call all-or-nothing semantics in-process.
pub type SharedStore<S> = Arc<RwLock<S>>;

/// Wrap a store in the shared handle used by the registries.
pub fn shared_store<S: StateStore>(store: S) -> SharedStore<S> {
    Arc::new(RwLock::new(store))
}

/// In-memory [`StateStore`] keeping a per-key version log.
///
/// The reference adapter for tests and single-node runs. `Insert`
/// preconditions are validated before anything is applied, so a failed
/// commit leaves no trace.
#[derive(Default)]
pub struct MemoryStateStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    history: HashMap<Vec<u8>, Vec<VersionEntry>>,
    commits: u64,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys (not counting tombstoned history).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn range_scan(&self, start: &[u8], end: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StateStoreError> {
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end.to_vec())
        };
        let results = self
            .data
            .range((Bound::Included(start.to_vec()), upper))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(results)
    }

    fn history_of(&self, key: &[u8]) -> Result<Vec<VersionEntry>, StateStoreError> {
        Ok(self.history.get(key).cloned().unwrap_or_default())
    }

    fn atomic_commit(&mut self, ops: Vec<BatchOperation>) -> Result<(), StateStoreError> {
        // Validate every Insert before touching state. Keys staged for
        // insertion earlier in the same batch count as present.
        let mut staged: HashSet<&[u8]> = HashSet::new();
        for op in &ops {
            if let BatchOperation::Insert { key, .. } = op {
                if self.data.contains_key(key) || staged.contains(key.as_slice()) {
                    return Err(StateStoreError::KeyExists {
                        key: String::from_utf8_lossy(key).into_owned(),
                    });
                }
                staged.insert(key);
            }
        }

        self.commits += 1;
        let commit = self.commits;
        let count = ops.len();
        for op in ops {
            match op {
                BatchOperation::Put { key, value } | BatchOperation::Insert { key, value } => {
                    self.history
                        .entry(key.clone())
                        .or_default()
                        .push(VersionEntry { commit, value: Some(value.clone()) });
                    self.data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    self.history
                        .entry(key.clone())
                        .or_default()
                        .push(VersionEntry { commit, value: None });
                    self.data.remove(&key);
                }
            }
        }
        debug!(commit, ops = count, "Atomic commit applied");
        Ok(())
    }
}
