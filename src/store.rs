//! Persisted Reactive Store
//!
//! Leptos face of [`PersistedState`]: a `reactive_stores::Store` mirrors the
//! persisted value for fine-grained reactivity, and a window `storage` listener
//! keeps it in step with other tabs.

use leptos::prelude::*;
use reactive_stores::Store;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use crate::models::BudgetState;
use crate::persist::{
    BrowserStorage, MemoryStorage, PersistedState, StorageArea, StorageChange, StoreOptions,
};

/// Storage key of the budget record
pub const BUDGET_KEY: &str = "sankeyData";

type BoxedState<T> = PersistedState<T, Box<dyn StorageArea>>;

/// Handle to a persisted value. Every write goes through the persisted state
/// first, then the reactive mirror is replaced.
pub struct PersistedStore<T: Send + Sync + 'static> {
    value: Store<T>,
    state: StoredValue<BoxedState<T>, LocalStorage>,
}

impl<T: Send + Sync + 'static> Clone for PersistedStore<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Send + Sync + 'static> Copy for PersistedStore<T> {}

impl<T> PersistedStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn new(state: BoxedState<T>) -> Self {
        Self {
            value: Store::new(state.get().clone()),
            state: StoredValue::new_local(state),
        }
    }

    /// Reactive view of the value, with field accessors
    pub fn store(&self) -> Store<T> {
        self.value
    }

    /// Mutate the latest value in place and persist it.
    pub fn modify<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let (result, next) = self.state.try_update_value(|state| {
            let result = state.modify(f);
            (result, state.get().clone())
        })?;
        self.value.set(next);
        Some(result)
    }

    /// Drop the stored record and return to the default value.
    pub fn remove(&self) {
        let next = self.state.try_update_value(|state| {
            state.remove();
            state.get().clone()
        });
        if let Some(next) = next {
            self.value.set(next);
        }
    }

    fn apply_change(&self, change: &StorageChange) {
        let next = self
            .state
            .try_update_value(|state| state.apply_change(change).then(|| state.get().clone()))
            .flatten();
        if let Some(next) = next {
            self.value.set(next);
        }
    }
}

/// Load `key` from `window.localStorage` (memory only if the browser refuses)
/// and follow writes made to it by other tabs.
pub fn use_persisted_state<T>(key: &str, default: T, options: StoreOptions<T>) -> PersistedStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    let (storage, browser) = open_storage();
    let store = PersistedStore::new(PersistedState::load(key, default, storage, options));
    if let Some(browser) = browser {
        bind_storage_listener(store, browser);
    }
    store
}

fn open_storage() -> (Box<dyn StorageArea>, Option<BrowserStorage>) {
    match BrowserStorage::local() {
        Ok(storage) => (Box::new(storage.clone()), Some(storage)),
        Err(e) => {
            log::warn!("[STORE] {}; keeping state in memory only", e);
            (Box::new(MemoryStorage::new()), None)
        }
    }
}

/// Browsers fire `storage` only in the other tabs, never in the writer.
fn bind_storage_listener<T>(store: PersistedStore<T>, browser: BrowserStorage)
where
    T: Clone + Send + Sync + 'static,
{
    let on_storage = Closure::<dyn FnMut(web_sys::StorageEvent)>::new(move |ev: web_sys::StorageEvent| {
        if let Some(change) = browser.change_from_event(&ev) {
            store.apply_change(&change);
        }
    });

    if let Some(win) = web_sys::window() {
        let _ = win.add_event_listener_with_callback("storage", on_storage.as_ref().unchecked_ref());
    }
    on_storage.forget();
}

// ========================
// Budget Store
// ========================

pub type BudgetStore = PersistedStore<BudgetState>;

/// JSON codec that also accepts records written before items had ids.
pub fn budget_options() -> StoreOptions<BudgetState> {
    StoreOptions::default().with_deserializer(|raw| {
        let mut state: BudgetState = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        if state.repair_ids().map_err(|e| e.to_string())? {
            log::info!("[STORE] assigned ids to {} bill items", state.bill_items.len());
        }
        Ok(state)
    })
}

pub fn use_budget_store() -> BudgetStore {
    use_persisted_state(BUDGET_KEY, BudgetState::default(), budget_options())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::models::{BillItem, ItemId};
    use crate::persist::StoreError;

    fn round_trip(state: &BudgetState) -> BudgetState {
        let options = budget_options();
        let raw = (options.serialize)(state).unwrap();
        (options.deserialize)(&raw).unwrap()
    }

    #[test]
    fn test_budget_round_trip() {
        let states = [
            BudgetState::default(),
            BudgetState::new(0.0),
            BudgetState {
                savings: 1234.5678,
                bill_items: vec![
                    BillItem::new(ItemId(1), "Rent \"flat\" 🏠", 1500.0),
                    BillItem::new(ItemId(2), "line\nbreak\ttab \\ slash", 0.1 + 0.2),
                    BillItem::new(ItemId(5), "", -42.0),
                    BillItem::new(ItemId(9), "tiny", 1e-300),
                    BillItem::new(ItemId(10), "huge", 1e300),
                ],
                next_item_id: 11,
            },
        ];
        for state in &states {
            assert_eq!(&round_trip(state), state);
        }
    }

    #[test]
    fn test_legacy_record_loads_with_ids() {
        let storage = MemoryStorage::new();
        storage
            .set_item(BUDGET_KEY, r#"{"savings":1000,"billItems":[{"name":"Phone Bill","amount":100}]}"#)
            .unwrap();

        let state = PersistedState::load(BUDGET_KEY, BudgetState::default(), storage, budget_options());
        assert_eq!(state.get().savings, 1000.0);
        assert_eq!(state.get().bill_items[0].id, ItemId(1));
        assert_eq!(state.get().next_item_id, 2);
    }

    #[test]
    fn test_savings_sync_between_tabs() {
        let tab_a = MemoryStorage::new();
        let tab_b = tab_a.open_context();
        let mut a = PersistedState::load(BUDGET_KEY, BudgetState::default(), tab_a, budget_options());
        let mut b = PersistedState::load(BUDGET_KEY, BudgetState::default(), tab_b, budget_options());

        a.modify(|state| state.set_savings("500"));

        for change in b.storage().take_changes() {
            b.apply_change(&change);
        }
        assert_eq!(b.get().savings, 500.0);
        assert_eq!(b.get().bill_items, BudgetState::default().bill_items);
        assert!(a.storage().take_changes().is_empty());
    }

    #[test]
    fn test_id_overflow_falls_back_to_default() {
        let storage = MemoryStorage::new();
        storage
            .set_item(
                BUDGET_KEY,
                r#"{"savings":0,"billItems":[{"id":18446744073709551615,"name":"a","amount":1}]}"#,
            )
            .unwrap();
        let errors = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&errors);
        let options = budget_options().with_error_handler(move |e| sink.borrow_mut().push(e.clone()));

        let state = PersistedState::load(BUDGET_KEY, BudgetState::default(), storage, options);

        assert_eq!(state.get(), &BudgetState::default());
        let errors = errors.borrow();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], StoreError::Decode { key, .. } if key == BUDGET_KEY));
    }

    #[test]
    fn test_reactive_store_tracks_persisted_state() {
        let owner = Owner::new();
        owner.with(|| {
            let area = MemoryStorage::new();
            let tab: Box<dyn StorageArea> = Box::new(area.open_context());
            let store = PersistedStore::new(PersistedState::load(
                BUDGET_KEY,
                BudgetState::default(),
                tab,
                budget_options(),
            ));
            assert_eq!(store.store().get_untracked(), BudgetState::default());

            // Local edit reaches both the reactive store and storage
            let id = store.modify(|state| {
                state.set_savings("250");
                state.add_item()
            });
            assert!(matches!(id, Some(Some(_))));
            assert_eq!(store.store().get_untracked().savings, 250.0);
            assert_eq!(store.store().get_untracked().bill_items.len(), 3);
            let raw = area.get_item(BUDGET_KEY).unwrap().unwrap();
            let saved: BudgetState = serde_json::from_str(&raw).unwrap();
            assert_eq!(saved.savings, 250.0);

            // Write from another tab
            let mut other = BudgetState::new(75.0);
            other.add_item().unwrap();
            let raw = serde_json::to_string(&other).unwrap();
            store.apply_change(&StorageChange::written(BUDGET_KEY, raw));
            assert_eq!(store.store().get_untracked(), other);

            // Unrelated keys leave the store alone
            store.apply_change(&StorageChange::written("theme", "dark"));
            assert_eq!(store.store().get_untracked(), other);

            store.remove();
            assert_eq!(store.store().get_untracked(), BudgetState::default());
            assert_eq!(area.get_item(BUDGET_KEY).unwrap(), None);
        });
    }
}
