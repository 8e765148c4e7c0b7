//! # Error Taxonomy
//!
//! Every registry/coordinator operation returns a [`LedgerError`]. Errors are
//! synchronous and never retried inside the core; the projector has its own
//! error split (non-fatal skip vs. fatal-for-the-item) in `ac-04`.

use crate::storage::StateStoreError;
use std::fmt;
use thiserror::Error;

/// Which entity family an id refers to, for error context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Asset,
    User,
    Transfer,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset => write!(f, "asset"),
            Self::User => write!(f, "user"),
            Self::Transfer => write!(f, "pending transfer"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    #[error("the {kind} {id} does not exist")]
    NotFound { kind: EntityKind, id: String },

    #[error("the {kind} {id} already exists")]
    AlreadyExists { kind: EntityKind, id: String },

    #[error("not authorized: {detail}")]
    NotAuthorized { detail: String },

    #[error("invalid state: {detail}")]
    InvalidState { detail: String },

    #[error("transfer request for asset {asset_id} has expired")]
    Expired { asset_id: String },

    #[error("transfer invalidated: {detail}")]
    Invalidated { detail: String },

    #[error("validation failed: {detail}")]
    Validation { detail: String },

    #[error("store error: {0}")]
    Store(#[from] StateStoreError),

    #[error("codec error: {0}")]
    Codec(String),
}

impl LedgerError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }

    pub fn already_exists(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::AlreadyExists { kind, id: id.into() }
    }

    pub fn not_authorized(detail: impl Into<String>) -> Self {
        Self::NotAuthorized { detail: detail.into() }
    }

    pub fn invalid_state(detail: impl Into<String>) -> Self {
        Self::InvalidState { detail: detail.into() }
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation { detail: detail.into() }
    }

    pub fn invalidated(detail: impl Into<String>) -> Self {
        Self::Invalidated { detail: detail.into() }
    }
}
