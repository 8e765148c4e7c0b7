//! # Caller Context
//!
//! Supplies the verified principal and role claim for each invocation.
//!
//! Elevated operations check the role claim instead of comparing the
//! principal against a deployment-specific reserved string, so identity
//! naming conventions never leak into authorization decisions.

use crate::entities::UserRole;

/// Per-invocation identity, resolved by the hosting layer.
pub trait CallerContext: Send + Sync {
    /// Verified principal string of the caller.
    fn principal(&self) -> &str;

    /// Role claim attached to the caller's credential.
    fn role(&self) -> UserRole;

    fn is_admin(&self) -> bool {
        self.role() == UserRole::Admin
    }
}

/// Plain caller value, the common adapter for tests and embedders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    principal: String,
    role: UserRole,
}

impl Caller {
    pub fn new(principal: impl Into<String>, role: UserRole) -> Self {
        Self { principal: principal.into(), role }
    }

    pub fn user(principal: impl Into<String>) -> Self {
        Self::new(principal, UserRole::User)
    }

    pub fn admin(principal: impl Into<String>) -> Self {
        Self::new(principal, UserRole::Admin)
    }

    pub fn auditor(principal: impl Into<String>) -> Self {
        Self::new(principal, UserRole::Auditor)
    }
}

impl CallerContext for Caller {
    fn principal(&self) -> &str {
        &self.principal
    }

    fn role(&self) -> UserRole {
        self.role
    }
}
