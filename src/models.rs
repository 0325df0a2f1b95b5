//! Budget Models
//!
//! Data structures persisted in browser storage.

use std::collections::HashSet;

use reactive_stores::Store;
use serde::{Deserialize, Serialize};

/// Every id up to `u64::MAX` is taken, so no fresh one can be handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("bill item ids exhausted")]
pub struct IdsExhausted;

/// Stable identifier of a bill item, assigned once at creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One named bill amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItem {
    /// Missing in records written before items had ids; see [`BudgetState::repair_ids`]
    #[serde(default)]
    pub id: ItemId,
    pub name: String,
    pub amount: f64,
}

impl BillItem {
    pub fn new(id: ItemId, name: impl Into<String>, amount: f64) -> Self {
        Self {
            id,
            name: name.into(),
            amount,
        }
    }
}

/// Persisted budget record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Store)]
#[serde(rename_all = "camelCase")]
pub struct BudgetState {
    pub savings: f64,
    pub bill_items: Vec<BillItem>,
    /// Next id handed out by `add_item`; never decreases
    #[serde(default)]
    pub next_item_id: u64,
}

impl Default for BudgetState {
    fn default() -> Self {
        Self {
            savings: 1000.0,
            bill_items: vec![
                BillItem::new(ItemId(1), "Phone Bill", 100.0),
                BillItem::new(ItemId(2), "", 0.0),
            ],
            next_item_id: 3,
        }
    }
}

impl BudgetState {
    pub fn new(savings: f64) -> Self {
        Self {
            savings,
            bill_items: Vec::new(),
            next_item_id: 1,
        }
    }

    /// Give every item without an id (0) or with a duplicate id a fresh one, and
    /// move `next_item_id` past every id in use. Returns true if anything changed.
    pub fn repair_ids(&mut self) -> Result<bool, IdsExhausted> {
        let mut changed = false;
        let max_id = self.bill_items.iter().map(|i| i.id.0).max().unwrap_or(0);
        if self.next_item_id <= max_id {
            self.next_item_id = max_id.checked_add(1).ok_or(IdsExhausted)?;
            changed = true;
        }
        if self.next_item_id == 0 {
            self.next_item_id = 1;
            changed = true;
        }

        let mut seen = HashSet::new();
        for item in &mut self.bill_items {
            if item.id.0 == 0 || !seen.insert(item.id) {
                item.id = ItemId(self.next_item_id);
                self.next_item_id = self.next_item_id.checked_add(1).ok_or(IdsExhausted)?;
                seen.insert(item.id);
                changed = true;
            }
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = BudgetState::default();
        assert_eq!(state.savings, 1000.0);
        assert_eq!(state.bill_items.len(), 2);
        assert_eq!(state.bill_items[0].name, "Phone Bill");
        assert_eq!(state.bill_items[1].name, "");
        assert_eq!(state.bill_items[1].amount, 0.0);
    }

    #[test]
    fn test_json_shape() {
        let state = BudgetState {
            savings: 1000.0,
            bill_items: vec![BillItem::new(ItemId(4), "Phone Bill", 100.0)],
            next_item_id: 5,
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "savings": 1000.0,
                "billItems": [{"id": 4, "name": "Phone Bill", "amount": 100.0}],
                "nextItemId": 5
            })
        );
    }

    #[test]
    fn test_legacy_record_gets_ids() {
        let raw = r#"{"savings":1000,"billItems":[{"name":"Phone Bill","amount":100},{"name":"","amount":0}]}"#;
        let mut state: BudgetState = serde_json::from_str(raw).unwrap();
        assert_eq!(state.repair_ids(), Ok(true));

        assert_eq!(state.bill_items[0].id, ItemId(1));
        assert_eq!(state.bill_items[1].id, ItemId(2));
        assert_eq!(state.next_item_id, 3);
    }

    #[test]
    fn test_duplicate_ids_are_reassigned() {
        let mut state = BudgetState {
            savings: 0.0,
            bill_items: vec![
                BillItem::new(ItemId(7), "a", 1.0),
                BillItem::new(ItemId(7), "b", 2.0),
            ],
            next_item_id: 2,
        };
        assert_eq!(state.repair_ids(), Ok(true));
        assert_eq!(state.bill_items[0].id, ItemId(7));
        assert_eq!(state.bill_items[1].id, ItemId(8));
        assert_eq!(state.next_item_id, 9);
    }

    #[test]
    fn test_valid_ids_are_left_alone() {
        let mut state = BudgetState::default();
        assert_eq!(state.repair_ids(), Ok(false));
        assert_eq!(state, BudgetState::default());
    }

    #[test]
    fn test_largest_id_cannot_be_followed() {
        let mut state = BudgetState {
            savings: 0.0,
            bill_items: vec![BillItem::new(ItemId(u64::MAX), "a", 1.0)],
            next_item_id: 1,
        };
        assert_eq!(state.repair_ids(), Err(IdsExhausted));
    }

    #[test]
    fn test_duplicate_at_id_limit_is_rejected() {
        let mut state = BudgetState {
            savings: 0.0,
            bill_items: vec![
                BillItem::new(ItemId(u64::MAX - 1), "a", 1.0),
                BillItem::new(ItemId(u64::MAX - 1), "b", 2.0),
            ],
            next_item_id: 1,
        };
        // u64::MAX is handed out, nothing is left for next_item_id
        assert_eq!(state.repair_ids(), Err(IdsExhausted));
    }
}
