//! Browser Local Storage
//!
//! `window.localStorage` behind [`StorageArea`], plus conversion of the window
//! `storage` event into a [`StorageChange`].

use wasm_bindgen::{JsCast, JsValue};

use super::{StorageArea, StorageChange, StoreError};

#[derive(Clone)]
pub struct BrowserStorage {
    storage: web_sys::Storage,
}

impl BrowserStorage {
    /// `window.localStorage`. Fails in private modes or sandboxed frames that deny it.
    pub fn local() -> Result<Self, StoreError> {
        let window = web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StoreError::Unavailable(js_message(&e)))?
            .ok_or_else(|| StoreError::Unavailable("localStorage is disabled".to_string()))?;
        Ok(Self { storage })
    }

    /// Convert a `storage` event, ignoring events that belong to another storage
    /// area (e.g. `sessionStorage`).
    pub fn change_from_event(&self, event: &web_sys::StorageEvent) -> Option<StorageChange> {
        let area = event.storage_area()?;
        if !js_sys::Object::is(area.as_ref(), self.storage.as_ref()) {
            return None;
        }
        Some(StorageChange {
            key: event.key(),
            new_value: event.new_value(),
        })
    }
}

impl StorageArea for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, String> {
        self.storage.get_item(key).map_err(|e| js_message(&e))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), String> {
        self.storage.set_item(key, value).map_err(|e| js_message(&e))
    }

    fn remove_item(&self, key: &str) -> Result<(), String> {
        self.storage.remove_item(key).map_err(|e| js_message(&e))
    }
}

/// Best-effort text for a thrown JS value (`QuotaExceededError: ...`).
fn js_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.to_string());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
