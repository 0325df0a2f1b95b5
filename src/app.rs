//! Budget Flow App
//!
//! Form on the left, Sankey diagram on the right.

use leptos::prelude::*;

use crate::components::{BillItems, BudgetInputs, FlowChart, LogPanel};
use crate::context::BudgetContext;
use crate::store::use_budget_store;

#[component]
pub fn App() -> impl IntoView {
    let ctx = BudgetContext::new(use_budget_store());
    provide_context(ctx);

    view! {
        <div class="app-layout">
            <h1>"Cash Flow Sankey Diagram"</h1>
            <div class="app-body">
                <div class="form-column">
                    <BudgetInputs />
                    <BillItems />
                    <button class="reset-btn" on:click=move |_| ctx.reset()>
                        "Reset"
                    </button>
                    <LogPanel />
                </div>
                <div class="chart-column">
                    <FlowChart />
                </div>
            </div>
        </div>
    }
}
