//! Store access for user records.
//!
//! One repository per entity type keeps registries decoupled from the
//! storage technology: everything goes through the [`StateStore`] port and
//! the shared JSON codec.

use shared_types::codec;
use shared_types::entities::User;
use shared_types::errors::{EntityKind, LedgerError};
use shared_types::keys;
use shared_types::storage::{BatchOperation, StateStore};

pub struct UserRepository;

impl UserRepository {
    /// Load a user, failing NotFound when absent.
    pub fn load<S: StateStore>(store: &S, id: &str) -> Result<User, LedgerError> {
        Self::try_load(store, id)?.ok_or_else(|| LedgerError::not_found(EntityKind::User, id))
    }

    /// Load a user if present.
    pub fn try_load<S: StateStore>(store: &S, id: &str) -> Result<Option<User>, LedgerError> {
        match store.get(&keys::user_key(id))? {
            Some(bytes) => Ok(Some(codec::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn exists<S: StateStore>(store: &S, id: &str) -> Result<bool, LedgerError> {
        Ok(store.get(&keys::user_key(id))?.is_some())
    }

    /// Unconditional write operation for a commit batch.
    pub fn put_op(user: &User) -> Result<BatchOperation, LedgerError> {
        Ok(BatchOperation::put(keys::user_key(&user.id), codec::to_bytes(user)?))
    }

    /// Create-if-absent operation; the commit fails if the id is taken.
    pub fn insert_op(user: &User) -> Result<BatchOperation, LedgerError> {
        Ok(BatchOperation::insert(keys::user_key(&user.id), codec::to_bytes(user)?))
    }

    /// All users, in key order.
    pub fn all<S: StateStore>(store: &S) -> Result<Vec<User>, LedgerError> {
        let (start, end) = keys::prefix_range(keys::USER_PREFIX);
        store
            .range_scan(&start, &end)?
            .into_iter()
            .map(|(_, bytes)| codec::from_bytes(&bytes))
            .collect()
    }
}
