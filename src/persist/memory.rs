//! In-Memory Storage
//!
//! Behaves like one browser storage area shared by several tabs: each handle is
//! a context, and a write in one context queues a [`StorageChange`] for every
//! other context (never for the writer).

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use super::{StorageArea, StorageChange};

#[derive(Default)]
struct Area {
    items: BTreeMap<String, String>,
    /// Pending changes per context, indexed by context id
    inboxes: Vec<VecDeque<StorageChange>>,
    /// Total bytes of keys and values allowed, like a browser quota
    quota: Option<usize>,
}

impl Area {
    fn used_bytes(&self) -> usize {
        self.items.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn broadcast(&mut self, from: usize, change: StorageChange) {
        for (context, inbox) in self.inboxes.iter_mut().enumerate() {
            if context != from {
                inbox.push_back(change.clone());
            }
        }
    }
}

pub struct MemoryStorage {
    area: Rc<RefCell<Area>>,
    context: usize,
}

impl MemoryStorage {
    /// A fresh, empty area with a single context.
    pub fn new() -> Self {
        let area = Area {
            inboxes: vec![VecDeque::new()],
            ..Default::default()
        };
        Self {
            area: Rc::new(RefCell::new(area)),
            context: 0,
        }
    }

    /// Like [`new`](Self::new), but writes fail once the area would exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        let storage = Self::new();
        storage.area.borrow_mut().quota = Some(bytes);
        storage
    }

    /// Another context (tab) on the same area.
    pub fn open_context(&self) -> Self {
        let mut area = self.area.borrow_mut();
        area.inboxes.push(VecDeque::new());
        Self {
            area: Rc::clone(&self.area),
            context: area.inboxes.len() - 1,
        }
    }

    /// Changes made by other contexts since the last call, oldest first.
    pub fn take_changes(&self) -> Vec<StorageChange> {
        self.area.borrow_mut().inboxes[self.context].drain(..).collect()
    }

    pub fn clear(&self) {
        let mut area = self.area.borrow_mut();
        if area.items.is_empty() {
            return;
        }
        area.items.clear();
        area.broadcast(self.context, StorageChange::cleared());
    }

    pub fn len(&self) -> usize {
        self.area.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageArea for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.area.borrow().items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), String> {
        let mut area = self.area.borrow_mut();
        if area.items.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        if let Some(quota) = area.quota {
            let current = area.items.get(key).map_or(0, |v| key.len() + v.len());
            let needed = area.used_bytes() - current + key.len() + value.len();
            if needed > quota {
                return Err(format!("quota of {} bytes exceeded ({} needed)", quota, needed));
            }
        }
        area.items.insert(key.to_string(), value.to_string());
        area.broadcast(self.context, StorageChange::written(key, value));
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), String> {
        let mut area = self.area.borrow_mut();
        if area.items.remove(key).is_some() {
            area.broadcast(self.context, StorageChange::removed(key));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_notify_other_contexts_only() {
        let a = MemoryStorage::new();
        let b = a.open_context();
        let c = a.open_context();

        a.set_item("k", "1").unwrap();

        assert!(a.take_changes().is_empty());
        assert_eq!(b.take_changes(), vec![StorageChange::written("k", "1")]);
        assert_eq!(c.take_changes(), vec![StorageChange::written("k", "1")]);
        assert_eq!(b.get_item("k").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_unchanged_value_does_not_notify() {
        let a = MemoryStorage::new();
        let b = a.open_context();
        a.set_item("k", "1").unwrap();
        b.take_changes();

        a.set_item("k", "1").unwrap();
        assert!(b.take_changes().is_empty());
    }

    #[test]
    fn test_remove_and_clear_notify() {
        let a = MemoryStorage::new();
        let b = a.open_context();
        a.set_item("k", "1").unwrap();
        a.remove_item("k").unwrap();
        a.remove_item("missing").unwrap();
        a.set_item("j", "2").unwrap();
        a.clear();

        assert_eq!(
            b.take_changes(),
            vec![
                StorageChange::written("k", "1"),
                StorageChange::removed("k"),
                StorageChange::written("j", "2"),
                StorageChange::cleared(),
            ]
        );
        assert!(b.is_empty());
    }

    #[test]
    fn test_quota() {
        let storage = MemoryStorage::with_quota(10);
        storage.set_item("key", "1234567").unwrap();
        assert!(storage.set_item("key", "12345678").is_err());
        // Replacing a value only counts the difference
        storage.set_item("key", "7654321").unwrap();
        assert_eq!(storage.get_item("key").unwrap().as_deref(), Some("7654321"));
    }
}
