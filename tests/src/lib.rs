//! # Asset-Chain Test Suite
//!
//! Unified test crate for flows that span subsystem boundaries:
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs        # Full lifecycles across registries and coordinator
//!     ├── atomicity.rs    # Commit failure injection: all-or-nothing checks
//!     └── convergence.rs  # Projector consuming the live bus feed
//! ```
//!
//! Per-subsystem behavior is covered by each crate's own `#[cfg(test)]`
//! modules; everything here exercises at least two subsystems through the
//! shared store and bus.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ac-tests
//! cargo test -p ac-tests integration::flows::
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;

use std::sync::Once;

static INIT: Once = Once::new();

/// Install the tracing subscriber once for the whole test binary.
/// `RUST_LOG` controls verbosity as usual.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}
