//! UI Components
//!
//! Leptos components for the budget form and the flow chart.

mod budget_inputs;
mod bill_items;
mod flow_chart;
mod log_panel;

pub use budget_inputs::BudgetInputs;
pub use bill_items::BillItems;
pub use flow_chart::FlowChart;
pub use log_panel::LogPanel;
