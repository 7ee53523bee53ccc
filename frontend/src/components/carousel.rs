//! Single-card product carousel with dot indicators on phones.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Array;
use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, MediaQueryList, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition,
};

use crate::dom::{self, Listeners};

const MOBILE_QUERY: &str = "(max-width: 768px)";
const DEFAULT_GAP: f64 = 16.0;
const THRESHOLDS: [f64; 3] = [0.5, 0.6, 0.7];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardVisibility {
    pub index: usize,
    pub intersecting: bool,
    pub ratio: f64,
}

/// Index of the intersecting card with the highest visible ratio.
pub fn most_visible(cards: &[CardVisibility]) -> Option<usize> {
    let mut best: Option<CardVisibility> = None;
    for card in cards.iter().filter(|c| c.intersecting && c.ratio > 0.0) {
        if best.map_or(true, |b| card.ratio > b.ratio) {
            best = Some(*card);
        }
    }
    best.map(|b| b.index)
}

/// Leading integer of a computed `gap` value; zero or unparsable falls back
/// to the default card gap.
pub fn parse_gap(css: &str) -> f64 {
    let digits: String = css.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    match digits.parse::<u32>() {
        Ok(gap) if gap > 0 => f64::from(gap),
        _ => DEFAULT_GAP,
    }
}

struct Observation {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array)>,
}

struct Carousel {
    track: Element,
    dots: Element,
    mql: MediaQueryList,
    observation: Option<Observation>,
    dot_listeners: Listeners,
    initial_frame: Option<Closure<dyn FnMut()>>,
    initial_scroll_done: bool,
}

fn mark_active_dot(dots: &Element, active: usize) {
    for (index, dot) in dom::query_all_in(dots, ".prod-dot").iter().enumerate() {
        dom::set_class(dot, "is-active", index == active);
    }
}

impl Carousel {
    fn teardown(&mut self) {
        self.dots.set_inner_html("");
        dom::set_style(&self.dots, "display", "none");
        dom::set_attr(&self.dots, "aria-hidden", "true");
        self.dot_listeners = Listeners::new();
        if let Some(observation) = self.observation.take() {
            observation.observer.disconnect();
        }
    }

    fn setup(&mut self, document: &Document) {
        if !self.mql.matches() {
            self.teardown();
            return;
        }
        let children = self.track.children();
        let cards: Vec<Element> = (0..children.length()).filter_map(|i| children.item(i)).collect();
        if cards.is_empty() {
            self.teardown();
            return;
        }
        if let Some(observation) = self.observation.take() {
            observation.observer.disconnect();
        }

        dom::set_style(&self.dots, "display", "flex");
        dom::set_attr(&self.dots, "aria-hidden", "false");
        self.dots.set_inner_html("");
        self.dot_listeners = Listeners::new();
        for (index, card) in cards.iter().enumerate() {
            let Ok(dot) = document.create_element("button") else {
                continue;
            };
            dot.set_class_name("prod-dot");
            dom::set_attr(&dot, "aria-label", &format!("Go to slide {}", index + 1));
            dom::set_attr(&dot, "data-dot-index", &index.to_string());
            let card = card.clone();
            self.dot_listeners.on(&dot, "click", move |_| {
                let options = ScrollIntoViewOptions::new();
                options.set_behavior(ScrollBehavior::Smooth);
                options.set_inline(ScrollLogicalPosition::Start);
                options.set_block(ScrollLogicalPosition::Nearest);
                card.scroll_into_view_with_scroll_into_view_options(&options);
            });
            let _ = self.dots.append_child(&dot);
        }

        self.observation = self.observe(&cards);

        if !self.initial_scroll_done && cards.len() >= 2 {
            self.schedule_initial_scroll(&cards);
        }
    }

    fn observe(&self, cards: &[Element]) -> Option<Observation> {
        let dots = self.dots.clone();
        let observed = cards.to_vec();
        let callback = Closure::wrap(Box::new(move |entries: Array| {
            let visibility: Vec<CardVisibility> = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .filter_map(|entry| {
                    let target = entry.target();
                    observed.iter().position(|card| *card == target).map(|index| CardVisibility {
                        index,
                        intersecting: entry.is_intersecting(),
                        ratio: entry.intersection_ratio(),
                    })
                })
                .collect();
            if let Some(active) = most_visible(&visibility) {
                mark_active_dot(&dots, active);
            }
        }) as Box<dyn FnMut(Array)>);

        let thresholds: Array = THRESHOLDS.iter().map(|t| JsValue::from_f64(*t)).collect();
        let init = IntersectionObserverInit::new();
        init.set_root(Some(&self.track));
        init.set_threshold(&thresholds);
        let observer = match IntersectionObserver::new_with_options(
            callback.as_ref().unchecked_ref(),
            &init,
        ) {
            Ok(observer) => observer,
            Err(e) => {
                warn!("carousel: IntersectionObserver unavailable: {:?}", e);
                return None;
            }
        };
        for card in cards {
            observer.observe(card);
        }
        Some(Observation {
            observer,
            _callback: callback,
        })
    }

    fn schedule_initial_scroll(&mut self, cards: &[Element]) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let track = self.track.clone();
        let dots = self.dots.clone();
        let first = cards[0].clone();
        let frame = Closure::wrap(Box::new(move || {
            let gap = web_sys::window()
                .and_then(|w| w.get_computed_style(&track).ok().flatten())
                .and_then(|style| style.get_property_value("gap").ok())
                .map(|gap| parse_gap(&gap))
                .unwrap_or(DEFAULT_GAP);
            let width = first.dyn_ref::<HtmlElement>().map(|c| c.offset_width()).unwrap_or(0);
            track.set_scroll_left(width + gap as i32);
            mark_active_dot(&dots, 1);
        }) as Box<dyn FnMut()>);
        if window.request_animation_frame(frame.as_ref().unchecked_ref()).is_ok() {
            self.initial_scroll_done = true;
            self.initial_frame = Some(frame);
        }
    }
}

pub struct CarouselBinding {
    _carousel: Rc<RefCell<Carousel>>,
    _listeners: Listeners,
}

pub fn attach(document: &Document) -> Option<CarouselBinding> {
    let window = web_sys::window()?;
    let section = dom::query(document, ".home-products")?;
    let (Some(track), Some(dots)) = (
        dom::query_in(&section, "[data-products-track]"),
        dom::query_in(&section, "[data-products-dots]"),
    ) else {
        debug!("carousel: track or dots missing, skipping");
        return None;
    };
    let mql = window.match_media(MOBILE_QUERY).ok().flatten()?;

    let carousel = Rc::new(RefCell::new(Carousel {
        track,
        dots,
        mql: mql.clone(),
        observation: None,
        dot_listeners: Listeners::new(),
        initial_frame: None,
        initial_scroll_done: false,
    }));
    carousel.borrow_mut().setup(document);

    let mut listeners = Listeners::new();
    {
        let carousel = carousel.clone();
        let document = document.clone();
        listeners.on(&mql, "change", move |_| {
            if let Ok(mut carousel) = carousel.try_borrow_mut() {
                carousel.setup(&document);
            }
        });
    }

    Some(CarouselBinding {
        _carousel: carousel,
        _listeners: listeners,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(index: usize, intersecting: bool, ratio: f64) -> CardVisibility {
        CardVisibility {
            index,
            intersecting,
            ratio,
        }
    }

    #[test]
    fn picks_highest_intersecting_ratio() {
        let cards = [card(0, true, 0.5), card(1, true, 0.7), card(2, false, 0.9)];
        assert_eq!(most_visible(&cards), Some(1));
    }

    #[test]
    fn ties_keep_first() {
        let cards = [card(3, true, 0.6), card(4, true, 0.6)];
        assert_eq!(most_visible(&cards), Some(3));
    }

    #[test]
    fn nothing_visible() {
        assert_eq!(most_visible(&[card(0, false, 0.6), card(1, true, 0.0)]), None);
        assert_eq!(most_visible(&[]), None);
    }

    #[test]
    fn gap_parsing() {
        assert_eq!(parse_gap("24px"), 24.0);
        assert_eq!(parse_gap("12.5px"), 12.0);
        assert_eq!(parse_gap("normal"), DEFAULT_GAP);
        assert_eq!(parse_gap("0px"), DEFAULT_GAP);
    }
}
