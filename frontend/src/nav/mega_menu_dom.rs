//! Binds [`MegaMenu`] to the header markup.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, KeyboardEvent, MouseEvent};

use crate::config::MEGA_CLOSE_DELAY_MS;
use crate::dom::{self, Listeners};
use crate::env::Environment;
use crate::nav::mega_menu::{CloseTimer, Intent, MegaMenu, MenuView, PressTarget, Response, Ticket};

const CHEVRON_SVG: &str = r#"<svg viewBox="0 0 12 12" focusable="false" aria-hidden="true"><path d="M2.2 4.5 L6 8.1 L9.8 4.5"></path></svg>"#;

pub type DomMegaMenu = MegaMenu<DomMenuView, GlooCloseTimer>;

pub struct DomMenuView {
    header: Element,
    body: Option<HtmlElement>,
    items: Vec<Element>,
    links: Vec<Option<Element>>,
}

impl MenuView for DomMenuView {
    fn show_item(&mut self, item: usize, open: bool) {
        if let Some(element) = self.items.get(item) {
            dom::set_class(element, "is-open", open);
        }
        if let Some(Some(link)) = self.links.get(item) {
            dom::set_attr(link, "aria-expanded", if open { "true" } else { "false" });
            dom::set_class(link, "is-mega-open", open);
            dom::set_class(link, "is-active", open);
        }
    }

    fn set_menu_active(&mut self, active: bool) {
        dom::set_class(&self.header, "mega-open", active);
        if let Some(body) = &self.body {
            dom::set_class(body, "mega-active", active);
        }
    }
}

pub struct GlooCloseTimer {
    menu: Weak<RefCell<DomMegaMenu>>,
}

impl CloseTimer for GlooCloseTimer {
    type Handle = Timeout;

    fn arm(&mut self, delay_ms: u32, ticket: Ticket) -> Timeout {
        let menu = self.menu.clone();
        Timeout::new(delay_ms, move || {
            let Some(menu) = menu.upgrade() else {
                return;
            };
            match menu.try_borrow_mut() {
                Ok(mut menu) => menu.expire(ticket),
                Err(_) => warn!("mega menu busy when close timer {} fired", ticket),
            };
        })
    }
}

/// Keeps the controller and its listeners alive for the page lifetime.
pub struct MegaMenuBinding {
    _menu: Rc<RefCell<DomMegaMenu>>,
    _listeners: Listeners,
}

fn dispatch(menu: &Rc<RefCell<DomMegaMenu>>, intent: Intent) -> Response {
    match menu.try_borrow_mut() {
        Ok(mut menu) => menu.handle(intent, &Environment::current()),
        Err(_) => {
            warn!("mega menu re-entered while handling {:?}", intent);
            Response::Default
        }
    }
}

fn decorate_trigger(document: &Document, link: &Element) {
    dom::set_attr(link, "aria-haspopup", "true");
    dom::set_attr(link, "aria-expanded", "false");
    if dom::query_in(link, ".nav-chev").is_some() {
        return;
    }
    if let Ok(wrap) = document.create_element("span") {
        wrap.set_class_name("nav-chev");
        dom::set_attr(&wrap, "aria-hidden", "true");
        wrap.set_inner_html(CHEVRON_SVG);
        let _ = link.append_child(&wrap);
    }
}

fn press_target(header: &Element, links: &[Option<Element>], event: &Event) -> PressTarget {
    for (index, link) in links.iter().enumerate() {
        if let Some(link) = link {
            if dom::contains(link, event.target()) {
                return PressTarget::Trigger(index);
            }
        }
    }
    if dom::contains(header, event.target())
        || dom::closest(event.target(), ".mega-menu").is_some()
    {
        PressTarget::Inside
    } else {
        PressTarget::Outside
    }
}

/// Wires the mega menu to `#site-header`. Returns `None`, attaching nothing,
/// when the header or its dropdown items are missing.
pub fn attach(document: &Document) -> Option<MegaMenuBinding> {
    let Some(header) = document.get_element_by_id("site-header") else {
        debug!("mega menu: no #site-header, skipping");
        return None;
    };
    let items = dom::query_all_in(&header, ".nav-item.has-mega");
    if items.is_empty() {
        debug!("mega menu: no dropdown items, skipping");
        return None;
    }

    let links: Vec<Option<Element>> = items
        .iter()
        .map(|item| dom::query_in(item, "a.nav-link"))
        .collect();
    for link in links.iter().flatten() {
        decorate_trigger(document, link);
    }

    let view = DomMenuView {
        header: header.clone(),
        body: document.body(),
        items: items.clone(),
        links: links.clone(),
    };
    let item_count = items.len();
    let menu = Rc::new_cyclic(|weak| {
        RefCell::new(MegaMenu::new(
            view,
            GlooCloseTimer { menu: weak.clone() },
            item_count,
            MEGA_CLOSE_DELAY_MS,
        ))
    });

    let mut listeners = Listeners::new();

    for (index, item) in items.iter().enumerate() {
        {
            let menu = menu.clone();
            listeners.on(item, "pointerover", move |_| {
                dispatch(&menu, Intent::PointerEnterTrigger(index));
            });
        }
        {
            let menu = menu.clone();
            listeners.on(item, "focusin", move |_| {
                dispatch(&menu, Intent::FocusTrigger(index));
            });
        }
        if let Some(link) = &links[index] {
            let menu = menu.clone();
            listeners.on(link, "click", move |e: Event| {
                // Keyboard and assistive activation report no click count.
                let from_pointer = e
                    .dyn_ref::<MouseEvent>()
                    .map(|m| m.detail() > 0)
                    .unwrap_or(true);
                if !from_pointer {
                    dispatch(&menu, Intent::PointerCancel);
                }
                if dispatch(&menu, Intent::ClickTrigger(index)) == Response::PreventDefault {
                    e.prevent_default();
                }
            });
        }
        if let Some(panel) = dom::query_in(item, ".mega-menu") {
            {
                let menu = menu.clone();
                listeners.on(&panel, "pointerenter", move |_| {
                    dispatch(&menu, Intent::PointerEnterPanel);
                });
            }
            let menu = menu.clone();
            listeners.on(&panel, "pointerleave", move |_| {
                dispatch(&menu, Intent::PointerLeavePanel);
            });
        }
    }

    let plain_links = dom::query_all_in(&header, ".nav-links > a.nav-link:not(.nav-cta)")
        .into_iter()
        .filter(|a| a.closest(".nav-item.has-mega").ok().flatten().is_none())
        .chain(dom::query_in(&header, ".nav-cta"));
    for link in plain_links {
        let menu = menu.clone();
        listeners.on(&link, "pointerover", move |_| {
            dispatch(&menu, Intent::PointerEnterPlainLink);
        });
    }

    {
        let menu = menu.clone();
        listeners.on(&header, "pointerover", move |_| {
            dispatch(&menu, Intent::PointerEnterHeader);
        });
    }
    {
        let menu = menu.clone();
        let bounds = header.clone();
        listeners.on(&header, "pointerout", move |e: Event| {
            let related = e.dyn_ref::<MouseEvent>().and_then(|m| m.related_target());
            if !dom::contains(&bounds, related) {
                dispatch(&menu, Intent::PointerLeaveHeader);
            }
        });
    }
    {
        let menu = menu.clone();
        listeners.on(document, "keydown", move |e: Event| {
            if let Some(key) = e.dyn_ref::<KeyboardEvent>() {
                if key.key() == "Escape" {
                    dispatch(&menu, Intent::Escape);
                }
            }
        });
    }
    {
        let menu = menu.clone();
        let header = header.clone();
        listeners.on(document, "pointerdown", move |e: Event| {
            let target = press_target(&header, &links, &e);
            dispatch(&menu, Intent::PointerDown(target));
        });
    }

    {
        let menu = menu.clone();
        listeners.on(document, "pointercancel", move |_| {
            dispatch(&menu, Intent::PointerCancel);
        });
    }

    info!("mega menu attached to {} items", item_count);
    Some(MegaMenuBinding {
        _menu: menu,
        _listeners: listeners,
    })
}
