use log::{debug, info};
use web_sys::Document;

use crate::components::{carousel, cta_bar, hero_video, whatsapp_float};
use crate::env::Environment;
use crate::lead::modal;
use crate::nav::{drawer, header, mega_menu_dom, mega_tabs};

/// Every behavior attached to the current page. Each slot stays `None` when
/// the page lacks the markup for it.
#[derive(Default)]
pub struct Site {
    initialized: bool,
    header: Option<header::HeaderBinding>,
    drawer: Option<drawer::DrawerBinding>,
    mega_menu: Option<mega_menu_dom::MegaMenuBinding>,
    mega_tabs: Option<mega_tabs::MegaTabsBinding>,
    cta_bar: Option<cta_bar::CtaBarBinding>,
    carousel: Option<carousel::CarouselBinding>,
    lead: Option<modal::LeadBinding>,
}

impl Site {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the site initialized; false if it already was.
    fn begin(&mut self) -> bool {
        if self.initialized {
            debug!("site already initialized");
            return false;
        }
        self.initialized = true;
        true
    }

    /// Attaches all behaviors. Calling it again is a no-op.
    pub fn initialize(&mut self, document: &Document) {
        if !self.begin() {
            return;
        }

        let env = Environment::current();
        self.header = header::attach(document);
        self.drawer = drawer::attach(document);
        self.cta_bar = cta_bar::attach(document);
        self.carousel = carousel::attach(document);
        whatsapp_float::mount(document);
        self.mega_tabs = mega_tabs::attach(document, &env);
        hero_video::start(document);
        self.lead = modal::attach(document);
        self.mega_menu = mega_menu_dom::attach(document);

        info!(
            "site ready (header: {}, drawer: {}, mega menu: {}, tabs: {}, cta bar: {}, carousel: {}, lead form: {})",
            self.header.is_some(),
            self.drawer.is_some(),
            self.mega_menu.is_some(),
            self.mega_tabs.is_some(),
            self.cta_bar.is_some(),
            self.carousel.is_some(),
            self.lead.is_some(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initializes_once() {
        let mut site = Site::new();
        assert!(site.begin());
        assert!(!site.begin());
    }
}
