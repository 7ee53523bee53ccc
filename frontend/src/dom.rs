use log::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlElement, Node};

pub fn document() -> Option<Document> {
    web_sys::window()?.document()
}

pub fn query(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

pub fn query_in(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

pub fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    match document.query_selector_all(selector) {
        Ok(list) => elements_of(&list),
        Err(e) => {
            warn!("invalid selector {}: {:?}", selector, e);
            Vec::new()
        }
    }
}

pub fn query_all_in(root: &Element, selector: &str) -> Vec<Element> {
    match root.query_selector_all(selector) {
        Ok(list) => elements_of(&list),
        Err(e) => {
            warn!("invalid selector {}: {:?}", selector, e);
            Vec::new()
        }
    }
}

fn elements_of(list: &web_sys::NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn set_class(element: &Element, class: &str, on: bool) {
    let _ = element.class_list().toggle_with_force(class, on);
}

pub fn has_class(element: &Element, class: &str) -> bool {
    element.class_list().contains(class)
}

pub fn set_attr(element: &Element, name: &str, value: &str) {
    let _ = element.set_attribute(name, value);
}

pub fn set_style(element: &Element, property: &str, value: &str) {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        let _ = html.style().set_property(property, value);
    }
}

/// Nearest element for an event target, climbing out of text nodes.
pub fn target_element(target: Option<EventTarget>) -> Option<Element> {
    let node = target?.dyn_into::<Node>().ok()?;
    match node.dyn_into::<Element>() {
        Ok(element) => Some(element),
        Err(node) => node.parent_element(),
    }
}

pub fn closest(target: Option<EventTarget>, selector: &str) -> Option<Element> {
    target_element(target)?.closest(selector).ok().flatten()
}

pub fn contains(ancestor: &Element, target: Option<EventTarget>) -> bool {
    target
        .and_then(|t| t.dyn_into::<Node>().ok())
        .map(|node| ancestor.contains(Some(&node)))
        .unwrap_or(false)
}

type Handler = Closure<dyn FnMut(Event)>;

/// Owns registered event handlers and unregisters them on drop.
#[derive(Default)]
pub struct Listeners {
    registered: Vec<(EventTarget, &'static str, Handler)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, target: &EventTarget, event: &'static str, handler: F)
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        if let Err(e) =
            target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
        {
            warn!("failed to listen for {}: {:?}", event, e);
            return;
        }
        self.registered.push((target.clone(), event, callback));
    }

    /// Same as `on`, registered as a passive listener (scroll, resize).
    pub fn on_passive<F>(&mut self, target: &EventTarget, event: &'static str, handler: F)
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        if let Err(e) = target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            callback.as_ref().unchecked_ref(),
            &options,
        ) {
            warn!("failed to listen for {}: {:?}", event, e);
            return;
        }
        self.registered.push((target.clone(), event, callback));
    }
}

impl Drop for Listeners {
    fn drop(&mut self) {
        for (target, event, callback) in self.registered.drain(..) {
            let _ = target
                .remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
        }
    }
}
