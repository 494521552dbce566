//! `localStorage`-backed implementations of the core storage traits.

use gainz_core::{ConsentRecord, ConsentStorage, KeyVault};
use serde::Serialize;
use wasm_bindgen::JsValue;

use crate::dom;
use crate::paths::{KEYS_ENDPOINT, api_path};
use crate::transport::{TransportError, dispatch};

pub const CONSENT_STORAGE_KEY: &str = "tg_consent";
/// Written by the key manager when an encrypted key is present on the device.
pub const API_KEY_FLAG_KEY: &str = "tg_has_api_key";

#[derive(Debug, thiserror::Error)]
pub enum WebStorageError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<JsValue> for WebStorageError {
    fn from(value: JsValue) -> Self {
        Self::Storage(dom::js_error_message(&value))
    }
}

/// Parse a stored consent record. A corrupt record reads as absent, so the
/// user is asked again rather than being treated as consenting.
#[must_use]
pub fn decode_consent(raw: Option<&str>) -> Option<ConsentRecord> {
    let raw = raw?;
    match serde_json::from_str(raw) {
        Ok(record) => Some(record),
        Err(err) => {
            log::warn!("discarding unreadable consent record: {err}");
            None
        }
    }
}

pub struct WebConsentStorage;

impl ConsentStorage for WebConsentStorage {
    type Error = WebStorageError;

    fn load_consent(&self) -> Result<Option<ConsentRecord>, Self::Error> {
        let raw = dom::local_storage()?.get_item(CONSENT_STORAGE_KEY)?;
        Ok(decode_consent(raw.as_deref()))
    }

    fn save_consent(&self, record: &ConsentRecord) -> Result<(), Self::Error> {
        let json = serde_json::to_string(record)?;
        dom::local_storage()?.set_item(CONSENT_STORAGE_KEY, &json)?;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoteKey<'a> {
    api_key: &'a str,
}

/// Reports local key presence and manages the off-device copy over HTTP.
#[derive(Debug, Clone)]
pub struct WebKeyVault {
    endpoint: String,
}

impl Default for WebKeyVault {
    fn default() -> Self {
        Self {
            endpoint: api_path(KEYS_ENDPOINT),
        }
    }
}

impl KeyVault for WebKeyVault {
    type Error = TransportError;

    fn has_local_key(&self) -> bool {
        dom::local_storage()
            .ok()
            .and_then(|storage| storage.get_item(API_KEY_FLAG_KEY).ok().flatten())
            .is_some_and(|flag| flag == "1")
    }

    fn store_remote(&self, api_key: &str) -> Result<(), Self::Error> {
        let body = serde_json::to_string(&RemoteKey { api_key })
            .map_err(|err| TransportError::Request(err.to_string()))?;
        dispatch("PUT", &self.endpoint, Some(&body))
    }

    fn delete_remote(&self) -> Result<(), Self::Error> {
        dispatch("DELETE", &self.endpoint, None)
    }
}
