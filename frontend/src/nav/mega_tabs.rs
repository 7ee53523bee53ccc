//! Content switching between the tabs inside a mega-menu panel.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use web_sys::{Document, Element, Event};

use crate::dom::{self, Listeners};
use crate::env::Environment;

/// Which tab of one `.mega-menu` is active, and the panel it reveals.
#[derive(Debug, Default)]
pub struct TabSet {
    targets: Vec<Option<String>>,
    panels: Vec<Option<String>>,
    active: Option<usize>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct TabSwitch {
    pub tab: usize,
    pub panel: Option<usize>,
}

impl TabSet {
    pub fn new(
        targets: Vec<Option<String>>,
        panels: Vec<Option<String>>,
        active: Option<usize>,
    ) -> Self {
        Self {
            targets,
            panels,
            active,
        }
    }

    #[cfg(test)]
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Activates `tab`. Returns `None` when it is already active or unknown.
    pub fn switch_to(&mut self, tab: usize) -> Option<TabSwitch> {
        if self.active == Some(tab) || tab >= self.targets.len() {
            return None;
        }
        self.active = Some(tab);
        let panel = self.targets[tab]
            .as_deref()
            .and_then(|target| self.panels.iter().position(|p| p.as_deref() == Some(target)));
        Some(TabSwitch { tab, panel })
    }
}

struct TabGroup {
    state: TabSet,
    tabs: Vec<Element>,
    panels: Vec<Element>,
}

impl TabGroup {
    fn from_menu(menu: &Element) -> Self {
        let tabs = dom::query_all_in(menu, ".mega-tab");
        let panels = dom::query_all_in(menu, ".mega-panel");
        let state = TabSet::new(
            tabs.iter().map(|t| t.get_attribute("data-target")).collect(),
            panels.iter().map(|p| p.get_attribute("data-panel")).collect(),
            tabs.iter().position(|t| dom::has_class(t, "active")),
        );
        Self { state, tabs, panels }
    }

    fn switch_to(&mut self, tab: usize) {
        let Some(change) = self.state.switch_to(tab) else {
            return;
        };
        for element in self.tabs.iter().chain(self.panels.iter()) {
            dom::set_class(element, "active", false);
        }
        dom::set_class(&self.tabs[change.tab], "active", true);
        if let Some(panel) = change.panel {
            dom::set_class(&self.panels[panel], "active", true);
        }
    }
}

fn on_switch(group: &Rc<RefCell<TabGroup>>, index: usize) -> impl FnMut(Event) + 'static {
    let group = group.clone();
    move |_| {
        if let Ok(mut group) = group.try_borrow_mut() {
            group.switch_to(index);
        }
    }
}

pub struct MegaTabsBinding {
    _listeners: Listeners,
}

pub fn attach(document: &Document, env: &Environment) -> Option<MegaTabsBinding> {
    let menus = dom::query_all(document, ".mega-menu");
    if menus.is_empty() {
        return None;
    }

    let mut listeners = Listeners::new();
    for menu in menus {
        let hover_switching = env.hover_fine_pointer && menu.id() == "mega-products";
        let group = Rc::new(RefCell::new(TabGroup::from_menu(&menu)));
        let tabs = group.borrow().tabs.clone();

        for (index, tab) in tabs.iter().enumerate() {
            if hover_switching {
                listeners.on(tab, "pointerenter", on_switch(&group, index));
                listeners.on(tab, "focusin", on_switch(&group, index));
            }
            let mut switch = on_switch(&group, index);
            listeners.on(tab, "click", move |e: Event| {
                e.prevent_default();
                e.stop_propagation();
                switch(e);
            });
        }
        debug!("mega tabs: {} tabs in #{}", tabs.len(), menu.id());
    }

    Some(MegaTabsBinding {
        _listeners: listeners,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> TabSet {
        TabSet::new(
            vec![Some("shredders".into()), Some("washing".into()), None],
            vec![Some("washing".into()), Some("shredders".into())],
            Some(0),
        )
    }

    #[test]
    fn switch_reveals_matching_panel() {
        let mut tabs = set();
        assert_eq!(tabs.switch_to(1), Some(TabSwitch { tab: 1, panel: Some(0) }));
        assert_eq!(tabs.active(), Some(1));
    }

    #[test]
    fn switching_to_active_tab_is_noop() {
        let mut tabs = set();
        assert_eq!(tabs.switch_to(0), None);
        assert_eq!(tabs.switch_to(9), None);
    }

    #[test]
    fn tab_without_target_has_no_panel() {
        let mut tabs = set();
        assert_eq!(tabs.switch_to(2), Some(TabSwitch { tab: 2, panel: None }));
    }
}
