//! Bill Items Component
//!
//! Editable list of bills. Rows are keyed by item id so edits from another tab
//! update a row in place.

use leptos::prelude::*;

use crate::budget::BillField;
use crate::context::use_budget;
use crate::models::{BudgetStateStoreFields, ItemId};
use crate::numeric::input_display;

#[component]
pub fn BillItems() -> impl IntoView {
    let ctx = use_budget();
    let items = ctx.store.store().bill_items();

    view! {
        <div class="bill-items">
            <h3>"Bill Items"</h3>
            <For
                each=move || items.get()
                key=|item| item.id
                children=move |item| view! { <BillItemRow id=item.id /> }
            />
            <button class="add-btn" on:click=move |_| ctx.add_item()>
                "Add Bill Item"
            </button>
        </div>
    }
}

/// One bill: name, amount and a delete button
#[component]
fn BillItemRow(id: ItemId) -> impl IntoView {
    let ctx = use_budget();
    let name = Memo::new(move |_| {
        ctx.store.store().with(|state| state.item(id).map(|item| item.name.clone()).unwrap_or_default())
    });
    // Amount is memoized as a number so typing "1." does not rewrite the field
    let amount = Memo::new(move |_| {
        ctx.store.store().with(|state| state.item(id).map_or(0.0, |item| item.amount))
    });

    view! {
        <div class="bill-item">
            <input
                type="text"
                class="bill-name"
                placeholder="Bill name"
                prop:value=move || name.get()
                on:input=move |ev| ctx.update_item(id, BillField::Name(event_target_value(&ev)))
            />
            <input
                type="number"
                class="bill-amount"
                placeholder="0"
                prop:value=move || input_display(amount.get())
                on:input=move |ev| ctx.update_item(id, BillField::Amount(event_target_value(&ev)))
            />
            <button
                class="delete-btn"
                title="Delete bill"
                on:click=move |_| ctx.delete_item(id)
            >
                "🗑"
            </button>
        </div>
    }
}
