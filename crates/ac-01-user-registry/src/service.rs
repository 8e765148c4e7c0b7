//! # User Registry Service
//!
//! User lifecycle against the authoritative store: registration, profile
//! self-service, admin status changes, and credit minting. Every operation
//! runs as one atomic commit and emits one notification on success.

use crate::repository::UserRepository;
use shared_bus::{ChangeNotification, EventPublisher, LedgerEvent};
use shared_types::caller::CallerContext;
use shared_types::entities::{User, UserRole};
use shared_types::errors::{EntityKind, LedgerError};
use shared_types::storage::{SharedStore, StateStore, StateStoreError};
use shared_types::time::TimeSource;
use std::sync::Arc;
use tracing::info;

pub struct UserRegistry<S: StateStore, T: TimeSource> {
    store: SharedStore<S>,
    bus: Arc<dyn EventPublisher>,
    clock: T,
}

impl<S: StateStore, T: TimeSource> UserRegistry<S, T> {
    pub fn new(store: SharedStore<S>, bus: Arc<dyn EventPublisher>, clock: T) -> Self {
        Self { store, bus, clock }
    }

    /// Register a new user: Active, zero balance, sequence 1.
    ///
    /// Fails `AlreadyExists` on a duplicate id; the conditional insert makes
    /// the check race-free even against concurrent creators.
    pub async fn create(
        &self,
        id: &str,
        full_name: &str,
        role: UserRole,
    ) -> Result<User, LedgerError> {
        let user = User::new(id, full_name, role, self.clock.now());
        {
            let mut store = self.store.write();
            store
                .atomic_commit(vec![UserRepository::insert_op(&user)?])
                .map_err(|e| match e {
                    StateStoreError::KeyExists { .. } => {
                        LedgerError::already_exists(EntityKind::User, id)
                    }
                    other => other.into(),
                })?;
        }

        info!(user = id, ?role, "User created");
        self.bus
            .publish(ChangeNotification::new(LedgerEvent::UserCreated(user.clone())))
            .await;
        Ok(user)
    }

    /// Read a user by id.
    pub fn read(&self, id: &str) -> Result<User, LedgerError> {
        UserRepository::load(&*self.store.read(), id)
    }

    /// All registered users, in key order.
    pub fn users(&self) -> Result<Vec<User>, LedgerError> {
        UserRepository::all(&*self.store.read())
    }

    /// Update one's own profile. Empty fields are left as-is.
    pub async fn update_profile(
        &self,
        ctx: &dyn CallerContext,
        id: &str,
        new_full_name: &str,
    ) -> Result<User, LedgerError> {
        let user = {
            let mut store = self.store.write();
            let mut user = UserRepository::load(&*store, id)?;

            // Self-service only.
            if user.id != ctx.principal() {
                return Err(LedgerError::not_authorized(format!(
                    "you can only update your own profile. User: {}, Signer: {}",
                    user.id,
                    ctx.principal()
                )));
            }

            if !new_full_name.is_empty() {
                user.full_name = new_full_name.to_string();
            }
            user.touch(self.clock.now());
            store.atomic_commit(vec![UserRepository::put_op(&user)?])?;
            user
        };

        self.bus
            .publish(ChangeNotification::new(LedgerEvent::UserUpdated(user.clone())))
            .await;
        Ok(user)
    }

    /// Set a user's status (e.g. "Locked" or "Active"). Admin role only;
    /// the value itself is free-form and deliberately not validated.
    pub async fn set_status(
        &self,
        ctx: &dyn CallerContext,
        target_id: &str,
        new_status: &str,
    ) -> Result<User, LedgerError> {
        if !ctx.is_admin() {
            return Err(LedgerError::not_authorized(format!(
                "only admin can set user status. Signer: {}",
                ctx.principal()
            )));
        }

        let user = {
            let mut store = self.store.write();
            let mut user = UserRepository::load(&*store, target_id)?;
            user.status = new_status.to_string();
            user.touch(self.clock.now());
            store.atomic_commit(vec![UserRepository::put_op(&user)?])?;
            user
        };

        info!(user = target_id, status = new_status, "User status updated");
        self.bus
            .publish(ChangeNotification::new(LedgerEvent::UserStatusUpdated(user.clone())))
            .await;
        Ok(user)
    }

    /// Mint credits onto a user's balance. Admin role only.
    pub async fn mint_credits(
        &self,
        ctx: &dyn CallerContext,
        user_id: &str,
        amount: u64,
    ) -> Result<User, LedgerError> {
        if !ctx.is_admin() {
            return Err(LedgerError::not_authorized(format!(
                "only admin can mint credits. Signer: {}",
                ctx.principal()
            )));
        }
        if amount == 0 {
            return Err(LedgerError::validation("amount must be positive"));
        }

        let user = {
            let mut store = self.store.write();
            let mut user = UserRepository::load(&*store, user_id)?;
            user.balance = user
                .balance
                .checked_add(amount)
                .ok_or_else(|| LedgerError::validation("balance overflow"))?;
            user.touch(self.clock.now());
            store.atomic_commit(vec![UserRepository::put_op(&user)?])?;
            user
        };

        info!(user = user_id, amount, balance = user.balance, "Credits minted");
        self.bus
            .publish(ChangeNotification::new(LedgerEvent::CreditsMinted(user.clone())))
            .await;
        Ok(user)
    }
}
