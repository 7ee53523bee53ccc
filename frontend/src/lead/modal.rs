//! Lead-capture modal, its form submission and the WhatsApp hand-off.

use std::rc::Rc;

use gloo_net::http::Request;
use gloo_timers::callback::Timeout;
use js_sys::Reflect;
use log::{debug, info, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlFormElement, HtmlInputElement, RequestMode,
};

use crate::config::{self, PHONE_WIDGET_INIT_DELAY_MS};
use crate::dom::{self, Listeners};
use crate::lead::phone_input::PhoneInput;
use crate::lead::submission::Lead;
use crate::lead::thank_you;

/// The site ships two modal markups: the older `.form-modal` toggled by a
/// class, and `.modal` toggled through `aria-hidden`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalKind {
    Legacy,
    Aria,
}

impl ModalKind {
    pub fn detect(is_form_modal: bool, is_modal: bool) -> Option<Self> {
        if is_form_modal {
            Some(ModalKind::Legacy)
        } else if is_modal {
            Some(ModalKind::Aria)
        } else {
            None
        }
    }
}

pub struct LeadModal {
    element: Element,
    kind: Option<ModalKind>,
    body: Option<HtmlElement>,
}

impl LeadModal {
    fn find(document: &Document) -> Option<Self> {
        let element = dom::query(document, ".form-modal")
            .or_else(|| document.get_element_by_id("leadModal"))?;
        let kind = ModalKind::detect(
            dom::has_class(&element, "form-modal"),
            dom::has_class(&element, "modal"),
        );
        Some(Self {
            element,
            kind,
            body: document.body(),
        })
    }

    fn set_visible(&self, visible: bool) {
        match self.kind {
            Some(ModalKind::Legacy) => dom::set_class(&self.element, "active", visible),
            Some(ModalKind::Aria) => {
                dom::set_attr(&self.element, "aria-hidden", if visible { "false" } else { "true" })
            }
            None => {}
        }
        if let Some(body) = &self.body {
            dom::set_class(body, "modal-lock", visible);
            let _ = body.style().set_property("overflow", if visible { "hidden" } else { "" });
        }
    }

    pub fn show(&self) {
        self.set_visible(true);
    }

    pub fn hide(&self) {
        self.set_visible(false);
    }
}

fn field(form: &HtmlFormElement, name: &str) -> String {
    form.query_selector(&format!("[name=\"{}\"]", name))
        .ok()
        .flatten()
        .and_then(|el| Reflect::get(&el, &JsValue::from_str("value")).ok())
        .and_then(|value| value.as_string())
        .unwrap_or_default()
}

fn read_lead(form: &HtmlFormElement, phone: Option<&PhoneInput>) -> Lead {
    Lead {
        name: field(form, "name"),
        company: field(form, "company"),
        email: field(form, "email"),
        phone: phone.map(PhoneInput::number).unwrap_or_else(|| field(form, "phone")),
        material: field(form, "material"),
        capacity: field(form, "capacity"),
        message: field(form, "message"),
    }
}

fn post_lead(lead: &Lead) {
    let request = match Request::post(&config::lead_webhook_url())
        .mode(RequestMode::NoCors)
        .json(&lead.payload())
    {
        Ok(request) => request,
        Err(e) => {
            warn!("lead: failed to encode payload: {}", e);
            return;
        }
    };
    spawn_local(async move {
        if let Err(e) = request.send().await {
            warn!("lead: webhook post failed: {}", e);
        }
    });
}

fn submit(form: &HtmlFormElement, phone: Option<&PhoneInput>, modal: Option<&LeadModal>) {
    let lead = read_lead(form, phone);
    let link = config::whatsapp_link(&config::whatsapp_number(), &lead.whatsapp_text());
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.open_with_url_and_target(&link, "_blank") {
            warn!("lead: could not open WhatsApp: {:?}", e);
        }
    }
    post_lead(&lead);
    info!("lead submitted from {}", form.id());

    form.reset();
    if let Some(modal) = modal {
        modal.hide();
    }
    let element: &Element = form;
    thank_you::redirect(Some(element));
}

/// Pages without any lead markup get no binding at all.
fn has_lead_markup(modal: bool, form: bool, thank_you: bool) -> bool {
    modal || form || thank_you
}

pub struct LeadBinding {
    _listeners: Listeners,
}

pub fn attach(document: &Document) -> Option<LeadBinding> {
    let modal = LeadModal::find(document).map(Rc::new);
    let phone = document
        .get_element_by_id("phone")
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        .map(|input| Rc::new(PhoneInput::new(input)));
    let form = document
        .get_element_by_id("contactFormElement")
        .and_then(|el| el.dyn_into::<HtmlFormElement>().ok());

    let thank_you = document.get_element_by_id("thankYouModal");
    if !has_lead_markup(modal.is_some(), form.is_some(), thank_you.is_some()) {
        debug!("lead: no modal, form or thank-you dialog, skipping");
        return None;
    }

    let mut listeners = Listeners::new();

    if let Some(thank_you) = thank_you {
        dom::set_class(&thank_you, "active", false);
        if let Some(close) = document.get_element_by_id("thankYouClose") {
            listeners.on(&close, "click", move |_| dom::set_class(&thank_you, "active", false));
        }
    }

    if let Some(modal) = &modal {
        {
            let modal = modal.clone();
            let phone = phone.clone();
            listeners.on(document, "click", move |e: Event| {
                if dom::closest(e.target(), "[data-open-form]").is_none() {
                    return;
                }
                e.prevent_default();
                e.stop_propagation();
                modal.show();
                if let Some(phone) = phone.clone() {
                    Timeout::new(PHONE_WIDGET_INIT_DELAY_MS, move || phone.init()).forget();
                }
            });
        }
        if modal.kind == Some(ModalKind::Legacy) {
            let closer = dom::query(document, ".form-close")
                .or_else(|| dom::query(document, ".modal__close"));
            if let Some(closer) = closer {
                let modal = modal.clone();
                listeners.on(&closer, "click", move |_| modal.hide());
            }
            let overlay_modal = modal.clone();
            listeners.on(&modal.element, "click", move |e: Event| {
                let on_overlay = dom::target_element(e.target())
                    .map(|t| dom::has_class(&t, "form-modal-overlay"))
                    .unwrap_or(false);
                if on_overlay {
                    overlay_modal.hide();
                }
            });
        }
    }

    if let Some(form) = form {
        let target = form.clone();
        listeners.on(&target, "submit", move |e: Event| {
            e.prevent_default();
            submit(&form, phone.as_deref(), modal.as_deref());
        });
    }

    Some(LeadBinding {
        _listeners: listeners,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_markup_wins() {
        assert_eq!(ModalKind::detect(true, true), Some(ModalKind::Legacy));
        assert_eq!(ModalKind::detect(false, true), Some(ModalKind::Aria));
        assert_eq!(ModalKind::detect(false, false), None);
    }

    #[test]
    fn binds_only_with_lead_markup() {
        assert!(!has_lead_markup(false, false, false));
        assert!(has_lead_markup(true, false, false));
        assert!(has_lead_markup(false, true, false));
        assert!(has_lead_markup(false, false, true));
    }
}
