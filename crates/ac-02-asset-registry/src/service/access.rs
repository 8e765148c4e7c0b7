//! Viewer grants on private assets.
//!
//! An asset's `viewers` list names the principals allowed to read its
//! metadata off-ledger. The sentinel [`EVERYONE`] opens the asset up
//! entirely. Grants that change nothing commit nothing and stay silent on
//! the bus.

use super::AssetRegistry;
use crate::repository::AssetRepository;
use shared_bus::{ChangeNotification, LedgerEvent};
use shared_types::caller::CallerContext;
use shared_types::entities::{Asset, EVERYONE};
use shared_types::errors::LedgerError;
use shared_types::storage::StateStore;
use shared_types::time::TimeSource;
use tracing::{debug, info};

impl<S: StateStore, T: TimeSource> AssetRegistry<S, T> {
    /// Grant `viewer` read access to the asset. Owner only.
    ///
    /// Granting to a principal that already holds access is a no-op: the
    /// asset is returned unchanged, nothing is committed, and no
    /// notification is emitted.
    pub async fn grant_access(
        &self,
        ctx: &dyn CallerContext,
        id: &str,
        viewer: &str,
    ) -> Result<Asset, LedgerError> {
        if viewer.is_empty() {
            return Err(LedgerError::validation("viewer id must not be empty"));
        }

        let asset = {
            let mut store = self.store.write();
            let mut asset = AssetRepository::load(&*store, id)?;
            self.require_owner(&asset, ctx, "grant access to")?;

            if asset.has_viewer(viewer) {
                debug!(asset = id, viewer, "Access already granted, nothing to do");
                return Ok(asset);
            }

            asset.viewers.push(viewer.to_string());
            asset.touch(ctx.principal(), self.clock.now());
            store.atomic_commit(vec![AssetRepository::put_op(&asset)?])?;
            asset
        };

        info!(asset = id, viewer, "Access granted");
        self.bus
            .publish(ChangeNotification::new(LedgerEvent::AccessGranted(asset.clone())))
            .await;
        Ok(asset)
    }

    /// Revoke `viewer`'s read access. Owner only.
    ///
    /// Revoking a principal that holds no grant is a silent no-op, matching
    /// [`grant_access`](Self::grant_access). Revoking [`EVERYONE`] removes
    /// only the sentinel entry; individual grants survive.
    pub async fn revoke_access(
        &self,
        ctx: &dyn CallerContext,
        id: &str,
        viewer: &str,
    ) -> Result<Asset, LedgerError> {
        let asset = {
            let mut store = self.store.write();
            let mut asset = AssetRepository::load(&*store, id)?;
            self.require_owner(&asset, ctx, "revoke access to")?;

            let before = asset.viewers.len();
            asset.viewers.retain(|v| v != viewer);
            if asset.viewers.len() == before {
                debug!(asset = id, viewer, "No matching grant, nothing to do");
                return Ok(asset);
            }

            asset.touch(ctx.principal(), self.clock.now());
            store.atomic_commit(vec![AssetRepository::put_op(&asset)?])?;
            asset
        };

        if viewer == EVERYONE {
            info!(asset = id, "Public access revoked");
        } else {
            info!(asset = id, viewer, "Access revoked");
        }
        self.bus
            .publish(ChangeNotification::new(LedgerEvent::AccessRevoked(asset.clone())))
            .await;
        Ok(asset)
    }
}
