mod app;
mod colors;
mod config;
mod controller;
mod format;
mod leaflet;
mod logging;
mod marker_cache;
mod notifications;
mod polling;
mod renderer;
mod surface;
#[cfg(test)]
mod testing;
mod transport;
mod view_model;

use leptos::mount::mount_to;
use leptos::prelude::*;
use std::any::Any;
use std::cell::RefCell;
use wasm_bindgen::JsCast;

use crate::app::App;
use crate::config::ClientConfig;

thread_local! {
    static APP_MOUNT_HANDLE: RefCell<Option<Box<dyn Any>>> = RefCell::new(None);
}

fn main() {
    console_error_panic_hook::set_once();
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    let mount_target = document
        .get_element_by_id("app")
        .and_then(|node| node.dyn_into::<web_sys::HtmlElement>().ok())
        .or_else(|| document.body());
    let Some(target) = mount_target else {
        return;
    };

    let (config, config_errors) = ClientConfig::from_element(&target);
    logging::init(config.log_level);
    for err in &config_errors {
        tracing::warn!("{err}");
    }
    tracing::debug!(?config, "client configured");

    APP_MOUNT_HANDLE.with(move |slot| {
        // Drop a previous mount so its session stops polling before the new one starts.
        let _old = slot.borrow_mut().take();
        let handle = mount_to(target, move || view! { <App config=config /> });
        *slot.borrow_mut() = Some(Box::new(handle));
    });
}
