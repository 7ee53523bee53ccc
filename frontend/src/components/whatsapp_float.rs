use js_sys::{Array, Function, Object, Reflect};
use log::debug;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Document;
use yew::prelude::*;

use crate::config;
use crate::dom;

/// Widgets older page templates shipped before this one existed.
const LEGACY_SELECTORS: &[&str] = &[
    ".wa-fab",
    ".wa-float",
    "#wa-float",
    "#wa-float-old",
    ".fw-wa-float",
    "a[href*=\"wa.me\"][class*=\"wa-\"]",
    "[aria-label*=\"WhatsApp\"][class*=\"float\"], [aria-label*=\"whatsapp\"][class*=\"float\"]",
];

const WHATSAPP_PATH: &str = "M19.11 17.35c-.27-.14-1.6-.79-1.84-.88-.25-.09-.43-.14-.61.14-.18.27-.7.88-.86 1.06-.16.18-.32.2-.59.07-.27-.14-1.14-.42-2.18-1.33-.81-.72-1.36-1.6-1.52-1.87-.16-.27-.02-.41.12-.55.12-.12.27-.32.41-.48.14-.16.18-.27.27-.45.09-.18.05-.34-.02-.48-.07-.14-.61-1.47-.84-2.01-.22-.53-.44-.46-.61-.47h-.52c-.18 0-.48.07-.73.34-.25.27-.95.93-.95 2.27s.97 2.64 1.11 2.82c.14.18 1.91 2.92 4.63 4.09.65.28 1.16.45 1.55.58.65.21 1.24.18 1.71.11.52-.08 1.6-.65 1.82-1.28.23-.63.23-1.17.16-1.28-.07-.11-.25-.18-.52-.32zM16.02 3.2c-7.06 0-12.8 5.74-12.8 12.8 0 2.25.59 4.45 1.72 6.39L3 29l6.79-1.78c1.88 1.03 4.01 1.57 6.23 1.57h.01c7.06 0 12.8-5.74 12.8-12.8S23.08 3.2 16.02 3.2zm0 23.3h-.01c-1.98 0-3.92-.53-5.61-1.52l-.4-.23-4.03 1.06 1.08-3.93-.26-.41c-1.08-1.73-1.66-3.73-1.66-5.78 0-6.05 4.92-10.98 10.98-10.98 2.93 0 5.69 1.14 7.76 3.21 2.07 2.07 3.22 4.83 3.22 7.77 0 6.05-4.92 10.98-10.98 10.98z";

pub const CLICK_EVENT: &str = "whatsapp_click";
pub const PLACEMENT: &str = "floating";

/// Pushes the click to whichever analytics globals the page defines.
fn track_click() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let page = window.location().pathname().unwrap_or_default();

    let params = Object::new();
    let _ = Reflect::set(&params, &"placement".into(), &PLACEMENT.into());
    let _ = Reflect::set(&params, &"page".into(), &JsValue::from_str(&page));

    if let Some(gtag) = Reflect::get(&window, &"gtag".into())
        .ok()
        .and_then(|g| g.dyn_into::<Function>().ok())
    {
        let _ = gtag.call3(&JsValue::NULL, &"event".into(), &CLICK_EVENT.into(), &params);
    }

    if let Some(data_layer) = Reflect::get(&window, &"dataLayer".into())
        .ok()
        .and_then(|d| d.dyn_into::<Array>().ok())
    {
        let entry = Object::assign(&Object::new(), &params);
        let _ = Reflect::set(&entry, &"event".into(), &CLICK_EVENT.into());
        data_layer.push(&entry);
    }
}

fn remove_legacy_widgets(document: &Document) {
    let mut removed = 0;
    for selector in LEGACY_SELECTORS {
        for element in dom::query_all(document, selector) {
            element.remove();
            removed += 1;
        }
    }
    let window = web_sys::window();
    for anchor in dom::query_all(document, "a[href*=\"wa.me\"], a[href*=\"whatsapp\"]") {
        let fixed = window
            .as_ref()
            .and_then(|w| w.get_computed_style(&anchor).ok().flatten())
            .and_then(|style| style.get_property_value("position").ok())
            .map(|position| position == "fixed")
            .unwrap_or(false);
        if fixed {
            anchor.remove();
            removed += 1;
        }
    }
    if removed > 0 {
        debug!("whatsapp float: removed {} legacy widgets", removed);
    }
}

#[derive(Properties, PartialEq)]
pub struct WhatsAppFloatProps {
    pub href: AttrValue,
}

#[function_component(WhatsAppFloat)]
pub fn whatsapp_float(props: &WhatsAppFloatProps) -> Html {
    let onclick = Callback::from(|_: MouseEvent| track_click());

    html! {
        <div class="wa-float" id="wa-float" aria-label="WhatsApp contact">
            <a class="wa-float__btn" href={props.href.clone()} target="_blank" rel="noopener noreferrer"
                aria-label="Chat on WhatsApp" onclick={onclick.clone()}>
                <span class="wa-float__icon" aria-hidden="true">
                    <svg viewBox="0 0 32 32" width="28" height="28" fill="currentColor" aria-hidden="true">
                        <path d={WHATSAPP_PATH}></path>
                    </svg>
                </span>
            </a>
            <div class="wa-float__panel" role="dialog" aria-label="Chat with an Engineer">
                <div class="wa-float__title">{"Chat with an Engineer"}</div>
                <div class="wa-float__sub">{"Reply in minutes"}</div>
                <div class="wa-float__meta"><span class="wa-dot"></span>{" via WhatsApp • Online"}</div>
                <a class="wa-float__cta" href={props.href.clone()} target="_blank" rel="noopener noreferrer"
                    onclick={onclick}>
                    {"Open WhatsApp"}
                </a>
            </div>
        </div>
    }
}

/// Replaces any legacy WhatsApp button with the floating widget.
pub fn mount(document: &Document) {
    remove_legacy_widgets(document);
    let Some(body) = document.body() else {
        return;
    };
    let Ok(host) = document.create_element("div") else {
        return;
    };
    host.set_class_name("wa-float-host");
    if body.append_child(&host).is_err() {
        return;
    }
    let href = config::whatsapp_link(&config::whatsapp_number(), &config::whatsapp_float_text());
    let props = WhatsAppFloatProps { href: href.into() };
    yew::Renderer::<WhatsAppFloat>::with_root_and_props(host, props).render();
}
