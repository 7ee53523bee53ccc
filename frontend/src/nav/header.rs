//! Header height sync and scroll-dependent styling.

use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::config::{HEADER_GLASS_AT, HEADER_SCROLLED_AT};
use crate::dom::{self, Listeners};

/// Classes the header carries for a given scroll offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderClasses {
    pub scrolled: bool,
    pub is_scrolled: bool,
}

/// Without a hero video behind it the header always uses its solid look.
pub fn header_classes(has_hero_video: bool, scroll_y: f64) -> HeaderClasses {
    if !has_hero_video {
        return HeaderClasses {
            scrolled: true,
            is_scrolled: true,
        };
    }
    HeaderClasses {
        scrolled: scroll_y > HEADER_SCROLLED_AT,
        is_scrolled: scroll_y > HEADER_GLASS_AT,
    }
}

fn has_hero_video(document: &Document) -> bool {
    dom::query(document, "#hero, .hero")
        .and_then(|hero| dom::query_in(&hero, "video, .hero-bg-video"))
        .is_some()
}

fn sync_height(document: &Document, header: &Element) {
    let Some(html) = document.document_element() else {
        return;
    };
    let height = header
        .dyn_ref::<HtmlElement>()
        .map(|h| h.offset_height())
        .unwrap_or(0);
    dom::set_style(&html, "--header-h", &format!("{}px", height));
}

fn apply_scroll(header: &Element, has_hero_video: bool) {
    let scroll_y = web_sys::window()
        .and_then(|w| w.scroll_y().ok())
        .unwrap_or(0.0);
    let classes = header_classes(has_hero_video, scroll_y);
    dom::set_class(header, "scrolled", classes.scrolled);
    dom::set_class(header, "is-scrolled", classes.is_scrolled);
}

pub struct HeaderBinding {
    _listeners: Listeners,
}

pub fn attach(document: &Document) -> Option<HeaderBinding> {
    let window = web_sys::window()?;
    let Some(header) = dom::query(document, ".header") else {
        debug!("header: no .header, skipping");
        return None;
    };
    let hero_video = has_hero_video(document);

    sync_height(document, &header);
    apply_scroll(&header, hero_video);

    let mut listeners = Listeners::new();
    {
        let document = document.clone();
        let header = header.clone();
        listeners.on(&window, "resize", move |_| sync_height(&document, &header));
    }
    listeners.on_passive(&window, "scroll", move |_| apply_scroll(&header, hero_video));

    Some(HeaderBinding {
        _listeners: listeners,
    })
}
