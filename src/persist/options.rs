use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::StoreError;

pub type Serializer<T> = Rc<dyn Fn(&T) -> Result<String, String>>;
pub type Deserializer<T> = Rc<dyn Fn(&str) -> Result<T, String>>;
pub type ErrorHandler = Rc<dyn Fn(&StoreError)>;

/// Codec and error reporting for a [`PersistedState`](super::PersistedState).
///
/// `StoreOptions::default()` encodes with `serde_json` and logs errors at
/// `error` level. Replace any part with the `with_*` builders.
pub struct StoreOptions<T> {
    pub serialize: Serializer<T>,
    pub deserialize: Deserializer<T>,
    pub on_error: ErrorHandler,
}

impl<T> Clone for StoreOptions<T> {
    fn clone(&self) -> Self {
        Self {
            serialize: Rc::clone(&self.serialize),
            deserialize: Rc::clone(&self.deserialize),
            on_error: Rc::clone(&self.on_error),
        }
    }
}

impl<T: Serialize + DeserializeOwned + 'static> Default for StoreOptions<T> {
    fn default() -> Self {
        Self {
            serialize: Rc::new(|value: &T| serde_json::to_string(value).map_err(|e| e.to_string())),
            deserialize: Rc::new(|raw: &str| serde_json::from_str(raw).map_err(|e| e.to_string())),
            on_error: Rc::new(log_error),
        }
    }
}

impl<T> StoreOptions<T> {
    pub fn with_serializer(mut self, f: impl Fn(&T) -> Result<String, String> + 'static) -> Self {
        self.serialize = Rc::new(f);
        self
    }

    pub fn with_deserializer(mut self, f: impl Fn(&str) -> Result<T, String> + 'static) -> Self {
        self.deserialize = Rc::new(f);
        self
    }

    pub fn with_error_handler(mut self, f: impl Fn(&StoreError) + 'static) -> Self {
        self.on_error = Rc::new(f);
        self
    }
}

fn log_error(error: &StoreError) {
    log::error!("[STORE] {}", error);
}
