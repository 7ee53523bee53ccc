use std::cell::RefCell;

use log::{info, Level};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

mod config;
mod dom;
mod env;
mod site;
mod nav {
    pub mod drawer;
    pub mod header;
    pub mod mega_menu;
    pub mod mega_menu_dom;
    pub mod mega_tabs;
}
mod components {
    pub mod carousel;
    pub mod cta_bar;
    pub mod hero_video;
    pub mod whatsapp_float;
}
mod lead {
    pub mod modal;
    pub mod phone_input;
    pub mod submission;
    pub mod thank_you;
}

use site::Site;

thread_local! {
    // Bindings own their listeners; the page keeps them until navigation.
    static SITE: RefCell<Site> = RefCell::new(Site::new());
}

fn boot() {
    let Some(document) = dom::document() else {
        return;
    };
    SITE.with(|site| site.borrow_mut().initialize(&document));
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    let level = if cfg!(debug_assertions) { Level::Debug } else { Level::Info };
    console_log::init_with_level(level).expect("error initializing log");

    info!("Starting site behaviors");
    let Some(document) = dom::document() else {
        return;
    };
    if document.ready_state() == "loading" {
        let on_ready = Closure::once_into_js(boot);
        let _ = document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref());
    } else {
        boot();
    }
}
