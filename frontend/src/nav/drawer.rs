//! Mobile drawer navigation with a stack of named sub-views.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, KeyboardEvent};

use crate::config::DRAWER_RESIZE_DEBOUNCE_MS;
use crate::dom::{self, Listeners};
use crate::env::Environment;

pub const ROOT_VIEW: &str = "root";

#[derive(Debug)]
pub struct Drawer {
    open: bool,
    view: String,
    views: Vec<String>,
}

impl Drawer {
    pub fn new(views: Vec<String>) -> Self {
        Self {
            open: false,
            view: ROOT_VIEW.to_string(),
            views,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn open(&mut self) {
        self.open = true;
        self.view = ROOT_VIEW.to_string();
    }

    pub fn close(&mut self) {
        self.open = false;
        self.view = ROOT_VIEW.to_string();
    }

    /// Returns whether the drawer is open afterwards.
    pub fn toggle(&mut self) -> bool {
        if self.open {
            self.close();
        } else {
            self.open();
        }
        self.open
    }

    /// Shows `name` if such a view exists.
    pub fn go(&mut self, name: &str) -> bool {
        if !self.views.iter().any(|v| v == name) {
            return false;
        }
        self.view = name.to_string();
        true
    }

    pub fn back(&mut self) {
        self.view = ROOT_VIEW.to_string();
    }
}

struct DrawerElements {
    toggle: Element,
    drawer: Element,
    backdrop: Element,
    views: Vec<Element>,
    html: Option<Element>,
    body: Option<HtmlElement>,
}

impl DrawerElements {
    fn render(&self, state: &Drawer) {
        let open = state.is_open();
        let hidden = if open { "false" } else { "true" };
        dom::set_attr(&self.drawer, "aria-hidden", hidden);
        dom::set_attr(&self.backdrop, "aria-hidden", hidden);
        dom::set_attr(&self.toggle, "aria-expanded", if open { "true" } else { "false" });
        dom::set_class(&self.drawer, "is-open", open);
        dom::set_class(&self.backdrop, "is-open", open);
        if let Some(html) = &self.html {
            dom::set_class(html, "mnav-open", open);
            dom::set_class(html, "is-locked", open);
        }
        if let Some(body) = &self.body {
            dom::set_class(body, "is-locked", open);
        }
        self.render_view(state);
    }

    fn render_view(&self, state: &Drawer) {
        for view in &self.views {
            let active = view.get_attribute("data-view").as_deref() == Some(state.view());
            dom::set_class(view, "is-active", active);
            dom::set_attr(view, "aria-hidden", if active { "false" } else { "true" });
        }
    }
}

struct DrawerController {
    state: Drawer,
    elements: DrawerElements,
    resize_timer: Option<Timeout>,
}

impl DrawerController {
    fn close(&mut self) {
        self.state.close();
        self.elements.render(&self.state);
        self.focus_toggle();
    }

    fn toggle(&mut self) {
        let open = self.state.toggle();
        self.elements.render(&self.state);
        if !open {
            self.focus_toggle();
        }
    }

    fn focus_toggle(&self) {
        if let Some(toggle) = self.elements.toggle.dyn_ref::<HtmlElement>() {
            let _ = toggle.focus();
        }
    }
}

fn with_drawer(controller: &Rc<RefCell<DrawerController>>, f: impl FnOnce(&mut DrawerController)) {
    if let Ok(mut controller) = controller.try_borrow_mut() {
        f(&mut controller);
    }
}

pub struct DrawerBinding {
    _controller: Rc<RefCell<DrawerController>>,
    _listeners: Listeners,
}

pub fn attach(document: &Document) -> Option<DrawerBinding> {
    let window = web_sys::window()?;
    let (Some(toggle), Some(drawer), Some(backdrop)) = (
        dom::query(document, ".mnav-toggle"),
        dom::query(document, "#mnav"),
        dom::query(document, ".mnav-backdrop"),
    ) else {
        debug!("drawer: markup missing, skipping");
        return None;
    };
    let close_button = dom::query_in(&drawer, ".mnav-close");
    let views = dom::query_all_in(&drawer, ".mnav-view");
    let state = Drawer::new(views.iter().filter_map(|v| v.get_attribute("data-view")).collect());

    let elements = DrawerElements {
        toggle: toggle.clone(),
        drawer: drawer.clone(),
        backdrop: backdrop.clone(),
        views,
        html: document.document_element(),
        body: document.body(),
    };
    // Stale state can survive a reload through bfcache.
    elements.render(&state);

    let controller = Rc::new(RefCell::new(DrawerController {
        state,
        elements,
        resize_timer: None,
    }));

    let mut listeners = Listeners::new();
    {
        let controller = controller.clone();
        listeners.on(&toggle, "click", move |e: Event| {
            e.stop_propagation();
            with_drawer(&controller, DrawerController::toggle);
        });
    }
    if let Some(close_button) = close_button {
        let controller = controller.clone();
        listeners.on(&close_button, "click", move |_| {
            with_drawer(&controller, DrawerController::close);
        });
    }
    {
        let controller = controller.clone();
        listeners.on(&backdrop, "click", move |_| {
            with_drawer(&controller, DrawerController::close);
        });
    }
    {
        let controller = controller.clone();
        listeners.on(document, "keydown", move |e: Event| {
            let escape = e.dyn_ref::<KeyboardEvent>().map(|k| k.key() == "Escape").unwrap_or(false);
            if escape {
                with_drawer(&controller, |c| {
                    if c.state.is_open() {
                        c.close();
                    }
                });
            }
        });
    }
    {
        let controller = controller.clone();
        listeners.on(&drawer, "click", move |e: Event| {
            if let Some(go) = dom::closest(e.target(), "[data-mnav-go]") {
                let target = go.get_attribute("data-mnav-go").unwrap_or_default();
                with_drawer(&controller, |c| {
                    if c.state.go(&target) {
                        c.elements.render_view(&c.state);
                    }
                });
            } else if dom::closest(e.target(), "[data-mnav-back]").is_some() {
                with_drawer(&controller, |c| {
                    c.state.back();
                    c.elements.render_view(&c.state);
                });
            }
        });
    }
    {
        let weak = Rc::downgrade(&controller);
        listeners.on(&window, "resize", move |_| {
            let Some(controller) = weak.upgrade() else {
                return;
            };
            let fire = Rc::downgrade(&controller);
            let timer = Timeout::new(DRAWER_RESIZE_DEBOUNCE_MS, move || {
                if let Some(controller) = fire.upgrade() {
                    with_drawer(&controller, |c| {
                        c.resize_timer = None;
                        if Environment::current().is_desktop() && c.state.is_open() {
                            c.close();
                        }
                    });
                }
            });
            with_drawer(&controller, |c| c.resize_timer = Some(timer));
        });
    }

    Some(DrawerBinding {
        _controller: controller,
        _listeners: listeners,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawer() -> Drawer {
        Drawer::new(vec!["root".into(), "products".into(), "solutions".into()])
    }

    #[test]
    fn opens_on_root_view() {
        let mut d = drawer();
        d.open();
        d.go("products");
        d.close();
        assert!(!d.is_open());
        assert!(d.toggle());
        assert_eq!(d.view(), ROOT_VIEW);
    }

    #[test]
    fn go_requires_known_view() {
        let mut d = drawer();
        d.open();
        assert!(!d.go("missing"));
        assert_eq!(d.view(), ROOT_VIEW);
        assert!(d.go("solutions"));
        assert_eq!(d.view(), "solutions");
        d.back();
        assert_eq!(d.view(), ROOT_VIEW);
    }

    #[test]
    fn toggle_alternates() {
        let mut d = drawer();
        assert!(d.toggle());
        assert!(!d.toggle());
    }
}
