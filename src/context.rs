//! Budget Context
//!
//! Shared state provided via Leptos Context API. All form handlers mutate the
//! budget through here so every change is persisted.

use leptos::prelude::*;

use crate::budget::{derive_view, BillField, BudgetView};
use crate::models::{BudgetState, ItemId};
use crate::store::BudgetStore;

/// App-wide budget handle provided via context
#[derive(Clone, Copy)]
pub struct BudgetContext {
    /// Persisted budget record
    pub store: BudgetStore,
    /// Required income and flow graph, recomputed when the budget changes
    pub view: Memo<BudgetView>,
}

impl BudgetContext {
    pub fn new(store: BudgetStore) -> Self {
        let view = Memo::new(move |_| store.store().with(derive_view));
        Self { store, view }
    }

    pub fn add_item(&self) {
        match self.store.modify(BudgetState::add_item).flatten() {
            Some(id) => log::debug!("[BUDGET] added item {}", id),
            None => log::warn!("[BUDGET] no item ids left, not adding"),
        }
    }

    pub fn update_item(&self, id: ItemId, field: BillField) {
        let found = self.store.modify(|state| state.update_item(id, field));
        if found == Some(false) {
            log::warn!("[BUDGET] update for unknown item {}", id);
        }
    }

    pub fn delete_item(&self, id: ItemId) {
        if self.store.modify(|state| state.delete_item(id)) == Some(true) {
            log::debug!("[BUDGET] deleted item {}", id);
        }
    }

    pub fn set_savings(&self, raw: &str) {
        self.store.modify(|state| state.set_savings(raw));
    }

    /// Forget the stored budget and start over from the default.
    pub fn reset(&self) {
        log::info!("[BUDGET] reset to default");
        self.store.remove();
    }
}

/// Get the budget context provided by `App`
pub fn use_budget() -> BudgetContext {
    expect_context::<BudgetContext>()
}
