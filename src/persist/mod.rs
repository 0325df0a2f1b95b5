//! Persisted State
//!
//! A value bound to one storage key. Memory is the authority: storage writes are
//! best effort, and every failure goes to the configured error handler instead
//! of back to the caller.

mod browser;
mod memory;
mod options;
mod storage;


pub use browser::BrowserStorage;
pub use memory::MemoryStorage;
pub use options::StoreOptions;
pub use storage::{StorageArea, StorageChange};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("storage is not available: {0}")]
    Unavailable(String),
    #[error("failed to read `{key}`: {message}")]
    Read { key: String, message: String },
    #[error("failed to write `{key}`: {message}")]
    Write { key: String, message: String },
    #[error("failed to remove `{key}`: {message}")]
    Remove { key: String, message: String },
    #[error("failed to encode value for `{key}`: {message}")]
    Encode { key: String, message: String },
    #[error("failed to decode value for `{key}`: {message}")]
    Decode { key: String, message: String },
}

pub struct PersistedState<T, S> {
    key: String,
    default: T,
    value: T,
    storage: S,
    options: StoreOptions<T>,
}

impl<T: Clone, S: StorageArea> PersistedState<T, S> {
    /// Read `key` from `storage`, falling back to `default` when the entry is
    /// missing, empty, unreadable or undecodable.
    pub fn load(key: impl Into<String>, default: T, storage: S, options: StoreOptions<T>) -> Self {
        let key = key.into();
        let value = match storage.get_item(&key) {
            Ok(Some(raw)) if !raw.is_empty() => match (options.deserialize)(&raw) {
                Ok(value) => value,
                Err(message) => {
                    (options.on_error)(&StoreError::Decode {
                        key: key.clone(),
                        message,
                    });
                    default.clone()
                }
            },
            Ok(_) => default.clone(),
            Err(message) => {
                (options.on_error)(&StoreError::Read {
                    key: key.clone(),
                    message,
                });
                default.clone()
            }
        };
        Self {
            key,
            default,
            value,
            storage,
            options,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        self.persist();
    }

    /// Replace the value with `f(current)`.
    pub fn update(&mut self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.value);
        self.set(next);
    }

    /// Mutate the value in place, then persist it.
    pub fn modify<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.value);
        self.persist();
        result
    }

    /// Drop the storage entry and go back to the default.
    pub fn remove(&mut self) {
        if let Err(message) = self.storage.remove_item(&self.key) {
            self.report(StoreError::Remove {
                key: self.key.clone(),
                message,
            });
        }
        self.value = self.default.clone();
    }

    /// Adopt a change made by another context. Returns true if the value was replaced.
    pub fn apply_change(&mut self, change: &StorageChange) -> bool {
        match change.key.as_deref() {
            // The whole area was cleared
            None => {
                log::info!("[STORE] storage cleared elsewhere, resetting `{}`", self.key);
                self.value = self.default.clone();
                true
            }
            Some(key) if key != self.key => false,
            Some(_) => match change.new_value.as_deref() {
                None => {
                    log::info!("[STORE] `{}` removed elsewhere, resetting", self.key);
                    self.value = self.default.clone();
                    true
                }
                Some(raw) => match (self.options.deserialize)(raw) {
                    Ok(value) => {
                        log::info!("[STORE] adopted external write to `{}`", self.key);
                        self.value = value;
                        true
                    }
                    Err(message) => {
                        self.report(StoreError::Decode {
                            key: self.key.clone(),
                            message,
                        });
                        false
                    }
                },
            },
        }
    }

    fn persist(&self) {
        let raw = match (self.options.serialize)(&self.value) {
            Ok(raw) => raw,
            Err(message) => {
                self.report(StoreError::Encode {
                    key: self.key.clone(),
                    message,
                });
                return;
            }
        };
        if let Err(message) = self.storage.set_item(&self.key, &raw) {
            self.report(StoreError::Write {
                key: self.key.clone(),
                message,
            });
        }
    }

    fn report(&self, error: StoreError) {
        (self.options.on_error)(&error);
    }
}
