//! Budget Model
//!
//! Required income and the flow graph derived from a [`BudgetState`], plus the
//! mutations the form applies to it.

use flow_layout::{LinkSpec, NodeSpec, SankeyGraph};

use crate::models::{BillItem, BudgetState, ItemId};
use crate::numeric::{coerce_lenient, coerce_strict};

pub const INCOME_NODE: usize = 0;
pub const BILLS_NODE: usize = 1;
pub const SAVINGS_NODE: usize = 2;
/// Index of the first bill item node; item `i` is node `FIRST_ITEM_NODE + i`.
pub const FIRST_ITEM_NODE: usize = 3;

pub const UNNAMED_LABEL: &str = "Unnamed";

/// Everything the chart needs, recomputed from scratch on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetView {
    pub required_income: f64,
    pub graph: SankeyGraph,
}

/// One editable field of a bill item, carrying the raw form text.
#[derive(Debug, Clone, PartialEq)]
pub enum BillField {
    Name(String),
    Amount(String),
}

pub fn derive_view(state: &BudgetState) -> BudgetView {
    BudgetView {
        required_income: state.required_income(),
        graph: flow_graph(state),
    }
}

/// `[Income, Bills, Savings, ...items]` with Income→Bills, Income→Savings and
/// Bills→item links. Always `3 + N` nodes and `2 + N` links.
pub fn flow_graph(state: &BudgetState) -> SankeyGraph {
    let mut nodes = Vec::with_capacity(FIRST_ITEM_NODE + state.bill_items.len());
    nodes.push(NodeSpec::new("Income"));
    nodes.push(NodeSpec::new("Bills"));
    nodes.push(NodeSpec::new("Savings"));
    nodes.extend(state.bill_items.iter().map(|item| NodeSpec::new(display_name(item))));

    let mut links = Vec::with_capacity(2 + state.bill_items.len());
    links.push(LinkSpec::new(INCOME_NODE, BILLS_NODE, state.bills_total()));
    links.push(LinkSpec::new(INCOME_NODE, SAVINGS_NODE, state.savings));
    links.extend(
        state
            .bill_items
            .iter()
            .enumerate()
            .map(|(i, item)| LinkSpec::new(BILLS_NODE, FIRST_ITEM_NODE + i, item.amount)),
    );

    SankeyGraph { nodes, links }
}

fn display_name(item: &BillItem) -> &str {
    if item.name.is_empty() {
        UNNAMED_LABEL
    } else {
        &item.name
    }
}

impl BudgetState {
    /// Sum of bill amounts, left to right from 0.
    pub fn bills_total(&self) -> f64 {
        self.bill_items.iter().fold(0.0, |acc, item| acc + item.amount)
    }

    pub fn required_income(&self) -> f64 {
        self.savings + self.bills_total()
    }

    pub fn item_id_at(&self, index: usize) -> Option<ItemId> {
        self.bill_items.get(index).map(|item| item.id)
    }

    pub fn item(&self, id: ItemId) -> Option<&BillItem> {
        self.bill_items.iter().find(|item| item.id == id)
    }

    /// Append an empty item and return its id, or `None` once ids run out.
    pub fn add_item(&mut self) -> Option<ItemId> {
        let id = ItemId(self.next_item_id.max(1));
        self.next_item_id = id.0.checked_add(1)?;
        self.bill_items.push(BillItem::new(id, "", 0.0));
        Some(id)
    }

    /// Returns false if no item has this id.
    pub fn update_item(&mut self, id: ItemId, field: BillField) -> bool {
        let Some(item) = self.bill_items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        match field {
            BillField::Name(name) => item.name = name,
            BillField::Amount(raw) => item.amount = coerce_lenient(&raw),
        }
        true
    }

    /// Returns false if no item has this id.
    pub fn delete_item(&mut self, id: ItemId) -> bool {
        let before = self.bill_items.len();
        self.bill_items.retain(|item| item.id != id);
        self.bill_items.len() != before
    }

    pub fn set_savings(&mut self, raw: &str) {
        self.savings = coerce_strict(raw);
    }
}
