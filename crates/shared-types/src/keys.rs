//! Key namespaces in the authoritative store.
//!
//! Every entity family lives under its own prefix so registries can
//! range-scan their namespace without cross-talk.

pub const ASSET_PREFIX: &str = "asset/";
pub const USER_PREFIX: &str = "user/";
pub const PENDING_TRANSFER_PREFIX: &str = "transfer/pending/";

pub fn asset_key(id: &str) -> Vec<u8> {
    format!("{ASSET_PREFIX}{id}").into_bytes()
}

pub fn user_key(id: &str) -> Vec<u8> {
    format!("{USER_PREFIX}{id}").into_bytes()
}

pub fn pending_transfer_key(asset_id: &str) -> Vec<u8> {
    format!("{PENDING_TRANSFER_PREFIX}{asset_id}").into_bytes()
}

/// `[start, end)` bounds covering every key under `prefix`.
pub fn prefix_range(prefix: &str) -> (Vec<u8>, Vec<u8>) {
    let start = prefix.as_bytes().to_vec();
    let mut end = start.clone();
    end.push(0xff);
    (start, end)
}
