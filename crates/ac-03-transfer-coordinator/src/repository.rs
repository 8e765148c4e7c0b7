//! Store access for pending transfer records, keyed by asset id.

use shared_types::codec;
use shared_types::entities::PendingTransfer;
use shared_types::errors::{EntityKind, LedgerError};
use shared_types::keys;
use shared_types::storage::{BatchOperation, StateStore};

pub struct TransferRepository;

impl TransferRepository {
    /// Load the transfer record for an asset, failing NotFound when absent.
    pub fn load<S: StateStore>(store: &S, asset_id: &str) -> Result<PendingTransfer, LedgerError> {
        Self::try_load(store, asset_id)?
            .ok_or_else(|| LedgerError::not_found(EntityKind::Transfer, asset_id))
    }

    /// Load the transfer record if present.
    pub fn try_load<S: StateStore>(
        store: &S,
        asset_id: &str,
    ) -> Result<Option<PendingTransfer>, LedgerError> {
        match store.get(&keys::pending_transfer_key(asset_id))? {
            Some(bytes) => Ok(Some(codec::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Unconditional write operation for a commit batch.
    pub fn put_op(transfer: &PendingTransfer) -> Result<BatchOperation, LedgerError> {
        Ok(BatchOperation::put(
            keys::pending_transfer_key(&transfer.asset_id),
            codec::to_bytes(transfer)?,
        ))
    }

    /// Create-if-absent operation; the commit fails if a record exists.
    pub fn insert_op(transfer: &PendingTransfer) -> Result<BatchOperation, LedgerError> {
        Ok(BatchOperation::insert(
            keys::pending_transfer_key(&transfer.asset_id),
            codec::to_bytes(transfer)?,
        ))
    }

    /// Operation removing the record for an asset.
    pub fn delete_op(asset_id: &str) -> BatchOperation {
        BatchOperation::delete(keys::pending_transfer_key(asset_id))
    }

    /// All transfer records, in key order, regardless of status.
    pub fn all<S: StateStore>(store: &S) -> Result<Vec<PendingTransfer>, LedgerError> {
        let (start, end) = keys::prefix_range(keys::PENDING_TRANSFER_PREFIX);
        store
            .range_scan(&start, &end)?
            .into_iter()
            .map(|(_, bytes)| codec::from_bytes(&bytes))
            .collect()
    }
}
