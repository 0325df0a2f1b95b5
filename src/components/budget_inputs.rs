//! Budget Inputs Component
//!
//! Required income (read-only) and the savings field.

use leptos::prelude::*;

use crate::context::use_budget;
use crate::models::BudgetStateStoreFields;
use crate::numeric::input_display;

#[component]
pub fn BudgetInputs() -> impl IntoView {
    let ctx = use_budget();
    let income = Memo::new(move |_| ctx.view.with(|view| view.required_income));
    let savings = Memo::new(move |_| ctx.store.store().savings().get());

    view! {
        <div class="budget-inputs">
            <label class="field">
                <span class="field-label">"Required Income"</span>
                <input
                    type="number"
                    readonly
                    prop:value=move || input_display(income.get())
                />
            </label>
            <label class="field">
                <span class="field-label">"Savings"</span>
                <input
                    type="number"
                    placeholder="0"
                    prop:value=move || input_display(savings.get())
                    on:input=move |ev| ctx.set_savings(&event_target_value(&ev))
                />
            </label>
        </div>
    }
}
