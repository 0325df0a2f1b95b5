//! Budget Flow Frontend Entry Point

mod models;
mod numeric;
mod budget;
mod persist;
mod store;
mod context;
mod chart;
mod components;
mod app;

use app::App;
use leptos::prelude::*;
use log::LevelFilter;

fn main() {
    console_error_panic_hook::set_once();

    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = rolling_logger::init(level, rolling_logger::DEFAULT_CAPACITY) {
        web_sys::console::warn_1(&format!("[APP] logger already set: {}", e).into());
    }
    log::info!("[APP] starting");

    mount_to_body(App);
}
