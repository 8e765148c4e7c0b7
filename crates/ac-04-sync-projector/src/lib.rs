//! # ac-04-sync-projector
//!
//! Sync Projector subsystem for Asset-Chain.
//!
//! ## Role in System
//!
//! - Consumes the notification feed and converges a read-optimized index
//!   replica: asset and user rows plus an append-only history trail.
//! - Tolerates the transport: at-least-once delivery, reordering across
//!   reconnects, and gaps after subscriber lag. Snapshot upserts are
//!   sequence-guarded, history appends deduplicate on the delivery
//!   ordinal, and tombstones apply unconditionally.
//! - An unreachable index backend stalls the one delivery (with retries)
//!   instead of skipping it; everything else is skip-and-continue.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod runner;
pub mod service;

pub use adapters::MemoryIndexStore;
pub use domain::{ActionType, AssetRow, HistoryRow, UserRow};
pub use ports::{IndexError, IndexStore, UpsertOutcome};
pub use runner::ProjectorRunner;
pub use service::Projector;
