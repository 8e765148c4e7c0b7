//! # Shared Types
//!
//! Domain entities and shared ports for the Asset-Chain ledger.
//!
//! This is the single source of truth for type definitions used across
//! subsystems: the `Asset`/`User`/`PendingTransfer` entities, the
//! [`LedgerError`] taxonomy, the [`StateStore`] port over the authoritative
//! transactional store, the [`CallerContext`] identity seam, and the
//! [`TimeSource`] clock seam.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod caller;
pub mod codec;
pub mod entities;
pub mod errors;
pub mod keys;
pub mod storage;
pub mod time;

pub use caller::{Caller, CallerContext};
pub use entities::{
    Approval, ApprovalRole, Asset, AssetStatus, PendingTransfer, Timestamp, TransferStatus, User,
    UserRole, EVERYONE, TRANSFER_TTL_SECS,
};
pub use errors::{EntityKind, LedgerError};
pub use storage::{
    shared_store, BatchOperation, MemoryStateStore, SharedStore, StateStore, StateStoreError,
    VersionEntry,
};
pub use time::{ManualClock, SystemTimeSource, TimeSource};
