//! Storage Area Trait
//!
//! The seam between [`PersistedState`](super::PersistedState) and wherever
//! strings actually live. Errors are plain messages; the store attaches the key
//! and the operation.

/// Synchronous string key/value storage, shaped like the Web Storage API.
pub trait StorageArea {
    fn get_item(&self, key: &str) -> Result<Option<String>, String>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), String>;

    fn remove_item(&self, key: &str) -> Result<(), String>;
}

impl<S: StorageArea + ?Sized> StorageArea for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, String> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), String> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), String> {
        (**self).remove_item(key)
    }
}

/// A write observed in another context sharing the same storage area.
///
/// `key == None` means the whole area was cleared; `new_value == None` means
/// the key was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    pub key: Option<String>,
    pub new_value: Option<String>,
}

impl StorageChange {
    pub fn written(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            new_value: Some(value.into()),
        }
    }

    pub fn removed(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            new_value: None,
        }
    }

    pub fn cleared() -> Self {
        Self {
            key: None,
            new_value: None,
        }
    }
}
