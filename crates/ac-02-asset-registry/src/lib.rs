//! # ac-02-asset-registry
//!
//! Asset Registry subsystem for Asset-Chain.
//!
//! ## Role in System
//!
//! - Asset lifecycle: issuance, descriptive updates, deletion, admin
//!   lock/unlock, and the legacy single-signature transfer.
//! - Marketplace: listing, delisting, and atomic credit-settled purchase.
//! - Viewer grants controlling off-ledger metadata visibility.
//! - Every committed mutation bumps the asset's sequence and emits exactly
//!   one notification on the shared bus; a purchase emits three under one
//!   transaction id.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod repository;
pub mod service;

pub use repository::AssetRepository;
pub use service::{AssetRegistry, DEFAULT_CURRENCY};
