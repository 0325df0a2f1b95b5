//! Flow Chart Component
//!
//! SVG Sankey diagram of where the income goes. The canvas is as wide as its
//! container and is re-measured after the window stops resizing.

use gloo_timers::callback::Timeout;
use leptos::html;
use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use crate::chart::{build_scene, ChartConfig};
use crate::context::use_budget;

const RESIZE_DEBOUNCE_MS: u32 = 150;

#[component]
pub fn FlowChart() -> impl IntoView {
    let ctx = use_budget();
    let config = ChartConfig::default();
    let container: NodeRef<html::Div> = NodeRef::new();
    let (width, set_width) = signal(0.0_f64);

    // Measure once mounted
    Effect::new(move |_| {
        if let Some(el) = container.get() {
            set_width.set(el.get_bounding_client_rect().width());
        }
    });

    let pending = StoredValue::new_local(None::<Timeout>);
    let on_resize = Closure::<dyn FnMut()>::new(move || {
        let timeout = Timeout::new(RESIZE_DEBOUNCE_MS, move || {
            if let Some(el) = container.get_untracked() {
                let measured = el.get_bounding_client_rect().width();
                log::debug!("[CHART] canvas width {}", measured);
                set_width.try_set(measured);
            }
        });
        // Replacing the slot drops, and so cancels, the previous timeout
        pending.try_update_value(|slot| *slot = Some(timeout));
    });
    if let Some(win) = web_sys::window() {
        let _ = win.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
    }
    on_resize.forget();

    let scene = Memo::new(move |_| {
        let width = width.get();
        ctx.view.with(|view| build_scene(&config, width, &view.graph))
    });

    view! {
        <div class="flow-chart" node_ref=container>
            <svg
                width=move || scene.with(|s| s.width.to_string())
                height=config.height.to_string()
            >
                <g
                    fill="none"
                    stroke=config.link_color
                    stroke-opacity=config.link_opacity.to_string()
                >
                    {move || scene.with(|s| {
                        s.links
                            .iter()
                            .map(|link| view! {
                                <path d=link.d.clone() stroke-width=link.stroke_width.to_string() />
                            })
                            .collect_view()
                    })}
                </g>
                <g fill-opacity=config.node_opacity.to_string()>
                    {move || scene.with(|s| {
                        s.rects
                            .iter()
                            .map(|rect| view! {
                                <rect
                                    x=rect.x.to_string()
                                    y=rect.y.to_string()
                                    width=rect.width.to_string()
                                    height=rect.height.to_string()
                                    fill=rect.fill
                                />
                            })
                            .collect_view()
                    })}
                </g>
                <g font-family="sans-serif" font-size="12">
                    {move || scene.with(|s| {
                        s.labels
                            .iter()
                            .map(|label| view! {
                                <text
                                    x=label.x.to_string()
                                    y=label.y.to_string()
                                    dy="0.35em"
                                    text-anchor=label.anchor.as_str()
                                >
                                    {label.text.clone()}
                                </text>
                            })
                            .collect_view()
                    })}
                </g>
            </svg>
        </div>
    }
}
