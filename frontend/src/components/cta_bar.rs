//! Bottom call-to-action bar shown on phones once the visitor scrolls down.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event};

use crate::config::{self, CONTACT_PATH, CTA_BAR_THRESHOLD, WHATSAPP_CTA_TEXT};
use crate::dom::{self, Listeners};
use crate::env::Environment;

#[derive(Debug, Default)]
pub struct CtaBar {
    visible: bool,
}

impl CtaBar {
    /// Returns the new visibility when it changes.
    pub fn update(&mut self, scroll_y: f64, mobile: bool) -> Option<bool> {
        let visible = mobile && scroll_y >= CTA_BAR_THRESHOLD;
        if visible == self.visible {
            return None;
        }
        self.visible = visible;
        Some(visible)
    }
}

pub fn needs_whatsapp_href(href: Option<&str>) -> bool {
    match href {
        None => true,
        Some(href) => href.trim().is_empty() || href.trim() == "#",
    }
}

fn refresh(bar: &Element, state: &RefCell<CtaBar>) {
    let scroll_y = web_sys::window()
        .and_then(|w| w.scroll_y().ok())
        .unwrap_or(0.0);
    let mobile = Environment::current().is_mobile();
    if let Ok(mut state) = state.try_borrow_mut() {
        if let Some(visible) = state.update(scroll_y, mobile) {
            dom::set_class(bar, "is-visible", visible);
        }
    }
}

pub struct CtaBarBinding {
    _frame: Rc<Closure<dyn FnMut()>>,
    _listeners: Listeners,
}

pub fn attach(document: &Document) -> Option<CtaBarBinding> {
    let window = web_sys::window()?;
    let Some(bar) = document.get_element_by_id("mobcta-bar") else {
        debug!("cta bar: no #mobcta-bar, skipping");
        return None;
    };
    let quote = dom::query_in(&bar, "[data-mobcta-quote]")?;

    if let Some(whatsapp) = dom::query_in(&bar, ".mobcta-btn-primary") {
        if needs_whatsapp_href(whatsapp.get_attribute("href").as_deref()) {
            let href = config::whatsapp_link(&config::whatsapp_number(), WHATSAPP_CTA_TEXT);
            dom::set_attr(&whatsapp, "href", &href);
        }
    }

    let state = Rc::new(RefCell::new(CtaBar::default()));
    let frame_pending = Rc::new(Cell::new(false));
    let frame = {
        let bar = bar.clone();
        let state = state.clone();
        let frame_pending = frame_pending.clone();
        Rc::new(Closure::wrap(Box::new(move || {
            frame_pending.set(false);
            refresh(&bar, &state);
        }) as Box<dyn FnMut()>))
    };

    refresh(&bar, &state);

    let mut listeners = Listeners::new();
    {
        let window_clone = window.clone();
        let frame = frame.clone();
        listeners.on_passive(&window, "scroll", move |_| {
            if frame_pending.get() {
                return;
            }
            frame_pending.set(true);
            let callback: &Closure<dyn FnMut()> = &frame;
            if let Err(e) =
                window_clone.request_animation_frame(callback.as_ref().unchecked_ref())
            {
                warn!("cta bar: requestAnimationFrame failed: {:?}", e);
                frame_pending.set(false);
            }
        });
    }
    {
        let bar = bar.clone();
        listeners.on_passive(&window, "resize", move |_| refresh(&bar, &state));
    }
    {
        let window = window.clone();
        listeners.on(&quote, "click", move |e: Event| {
            e.prevent_default();
            let _ = window.location().set_href(CONTACT_PATH);
        });
    }

    Some(CtaBarBinding {
        _frame: frame,
        _listeners: listeners,
    })
}
