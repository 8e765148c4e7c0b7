//! Store access for asset records.

use shared_types::codec;
use shared_types::entities::Asset;
use shared_types::errors::{EntityKind, LedgerError};
use shared_types::keys;
use shared_types::storage::{BatchOperation, StateStore};

pub struct AssetRepository;

impl AssetRepository {
    /// Load an asset, failing NotFound when absent.
    pub fn load<S: StateStore>(store: &S, id: &str) -> Result<Asset, LedgerError> {
        Self::try_load(store, id)?.ok_or_else(|| LedgerError::not_found(EntityKind::Asset, id))
    }

    /// Load an asset if present.
    pub fn try_load<S: StateStore>(store: &S, id: &str) -> Result<Option<Asset>, LedgerError> {
        match store.get(&keys::asset_key(id))? {
            Some(bytes) => Ok(Some(codec::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Unconditional write operation for a commit batch.
    pub fn put_op(asset: &Asset) -> Result<BatchOperation, LedgerError> {
        Ok(BatchOperation::put(keys::asset_key(&asset.id), codec::to_bytes(asset)?))
    }

    /// Create-if-absent operation; the commit fails if the id is taken.
    pub fn insert_op(asset: &Asset) -> Result<BatchOperation, LedgerError> {
        Ok(BatchOperation::insert(keys::asset_key(&asset.id), codec::to_bytes(asset)?))
    }

    /// Tombstone operation removing the record.
    pub fn delete_op(id: &str) -> BatchOperation {
        BatchOperation::delete(keys::asset_key(id))
    }

    /// All assets, in key order.
    pub fn all<S: StateStore>(store: &S) -> Result<Vec<Asset>, LedgerError> {
        let (start, end) = keys::prefix_range(keys::ASSET_PREFIX);
        store
            .range_scan(&start, &end)?
            .into_iter()
            .map(|(_, bytes)| codec::from_bytes(&bytes))
            .collect()
    }
}
