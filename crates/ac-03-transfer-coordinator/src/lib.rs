//! # ac-03-transfer-coordinator
//!
//! Transfer Coordinator subsystem for Asset-Chain.
//!
//! ## Role in System
//!
//! - Two-signature ownership transfers: the owner's `initiate` carries the
//!   first signature, the recipient's `approve` the second.
//! - A 24h approval window; elapsed transfers are marked Expired lazily on
//!   the next approval attempt.
//! - Execution re-reads the asset and reassigns ownership in the same
//!   commit that removes the live record; terminal records (Rejected,
//!   Expired, Invalid) stay behind for inspection.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod repository;
pub mod service;

pub use repository::TransferRepository;
pub use service::TransferCoordinator;
