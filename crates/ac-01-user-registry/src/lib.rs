//! # ac-01-user-registry
//!
//! User Registry subsystem for Asset-Chain.
//!
//! ## Role in System
//!
//! - Lifecycle of network participants: registration, profile self-service,
//!   admin status changes, credit minting.
//! - Users are created once and never deleted; only profile, status, and
//!   balance mutate, each mutation bumping the per-user sequence.
//! - Every successful mutation emits one notification on the shared bus.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod repository;
pub mod service;

pub use repository::UserRepository;
pub use service::UserRegistry;
