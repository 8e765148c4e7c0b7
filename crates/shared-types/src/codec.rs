//! JSON codec for documents in the authoritative store.

use crate::errors::LedgerError;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, LedgerError> {
    serde_json::to_vec(value).map_err(|e| LedgerError::Codec(e.to_string()))
}

pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LedgerError> {
    serde_json::from_slice(bytes).map_err(|e| LedgerError::Codec(e.to_string()))
}
