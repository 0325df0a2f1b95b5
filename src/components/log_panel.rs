//! Log Panel Component
//!
//! Collapsible view of the most recent log lines kept by the rolling logger.

use leptos::prelude::*;

#[component]
pub fn LogPanel() -> impl IntoView {
    let (open, set_open) = signal(false);
    let (lines, set_lines) = signal(Vec::<String>::new());

    let refresh = move || set_lines.set(rolling_logger::recent_lines());
    let toggle = move |_| {
        if !open.get_untracked() {
            refresh();
        }
        set_open.update(|o| *o = !*o);
    };

    view! {
        <div class="log-panel">
            <button class="log-toggle" on:click=toggle>
                {move || if open.get() { "Hide log" } else { "Show log" }}
            </button>
            <Show when=move || open.get()>
                <button class="log-refresh" on:click=move |_| refresh()>"Refresh"</button>
                <pre class="log-lines">
                    {move || lines.get().join("\n")}
                </pre>
            </Show>
        </div>
    }
}
