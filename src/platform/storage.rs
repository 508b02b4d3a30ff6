//! LocalStorage-backed JSON records
//!
//! Off the browser there is no storage: loads find nothing and saves are
//! dropped.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Read and decode the record stored under `key`
#[cfg(target_arch = "wasm32")]
pub fn load_json<T: DeserializeOwned>(key: &str) -> Option<T> {
    let storage = web_sys::window()?.local_storage().ok()??;
    let json = storage.get_item(key).ok()??;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring unreadable {key}: {e}");
            None
        }
    }
}

/// Encode and store `value` under `key`; returns whether it was written
#[cfg(target_arch = "wasm32")]
pub fn save_json<T: Serialize>(key: &str, value: &T) -> bool {
    let storage = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten();

    let (Some(storage), Ok(json)) = (storage, serde_json::to_string(value)) else {
        return false;
    };
    storage.set_item(key, &json).is_ok()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_json<T: DeserializeOwned>(_key: &str) -> Option<T> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_json<T: Serialize>(_key: &str, _value: &T) -> bool {
    false
}
