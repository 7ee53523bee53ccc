//! Hover-intent state machine for the header's dropdown panels.
//!
//! The controller owns which item is open and the single pending close timer.
//! It never touches the DOM directly: visual and ARIA changes go through a
//! [`MenuView`], and deferred closing goes through a [`CloseTimer`].

use log::debug;

use crate::env::Environment;

/// Identifies an armed close timer. Only the ticket of the currently pending
/// timer is allowed to close the menu.
pub type Ticket = u64;

/// Host timer queue. Dropping the returned handle must cancel the timer.
pub trait CloseTimer {
    type Handle;

    fn arm(&mut self, delay_ms: u32, ticket: Ticket) -> Self::Handle;
}

/// Receives every visible state change of the menu.
pub trait MenuView {
    fn show_item(&mut self, item: usize, open: bool);
    fn set_menu_active(&mut self, active: bool);
}

/// Where a pointer-down landed, relative to the navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PressTarget {
    Outside,
    Trigger(usize),
    Inside,
}

/// Interaction intents the DOM binding translates raw events into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    PointerEnterTrigger(usize),
    FocusTrigger(usize),
    ClickTrigger(usize),
    PointerEnterPanel,
    PointerLeavePanel,
    PointerEnterPlainLink,
    PointerEnterHeader,
    PointerLeaveHeader,
    Escape,
    PointerDown(PressTarget),
    /// The browser took over a pointer gesture (scroll, pinch) before it became a click.
    PointerCancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Response {
    Default,
    PreventDefault,
}

struct PendingClose<H> {
    ticket: Ticket,
    _handle: H,
}

pub struct MegaMenu<V, T: CloseTimer> {
    view: V,
    timer: T,
    item_count: usize,
    open: Option<usize>,
    pending: Option<PendingClose<T::Handle>>,
    next_ticket: Ticket,
    close_delay_ms: u32,
    // Item whose trigger was pressed while closed; the following click opens it.
    pressed_closed: Option<usize>,
}

impl<V: MenuView, T: CloseTimer> MegaMenu<V, T> {
    pub fn new(view: V, timer: T, item_count: usize, close_delay_ms: u32) -> Self {
        Self {
            view,
            timer,
            item_count,
            open: None,
            pending: None,
            next_ticket: 0,
            close_delay_ms,
            pressed_closed: None,
        }
    }

    #[cfg(test)]
    pub fn open_item(&self) -> Option<usize> {
        self.open
    }

    pub fn is_open(&self, item: usize) -> bool {
        self.open == Some(item)
    }

    #[cfg(test)]
    pub fn has_pending_close(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_ticket(&self) -> Option<Ticket> {
        self.pending.as_ref().map(|p| p.ticket)
    }

    #[cfg(test)]
    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn open(&mut self, item: usize) {
        self.cancel_close();
        if item >= self.item_count {
            return;
        }
        for other in (0..self.item_count).filter(|&i| i != item) {
            self.view.show_item(other, false);
        }
        self.view.show_item(item, true);
        self.view.set_menu_active(true);
        if self.open != Some(item) {
            debug!("mega menu: open item {}", item);
        }
        self.open = Some(item);
    }

    pub fn close_all(&mut self) {
        self.cancel_close();
        for item in 0..self.item_count {
            self.view.show_item(item, false);
        }
        self.view.set_menu_active(false);
        if self.open.take().is_some() {
            debug!("mega menu: closed");
        }
    }

    pub fn schedule_close(&mut self, delay_ms: u32) {
        self.cancel_close();
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let handle = self.timer.arm(delay_ms, ticket);
        self.pending = Some(PendingClose {
            ticket,
            _handle: handle,
        });
    }

    pub fn cancel_close(&mut self) {
        // Dropping the handle cancels the host timer.
        self.pending = None;
    }

    /// Called by the host when an armed timer fires.
    pub fn expire(&mut self, ticket: Ticket) {
        if self.pending_ticket() == Some(ticket) {
            self.pending = None;
            self.close_all();
        }
    }

    pub fn handle(&mut self, intent: Intent, env: &Environment) -> Response {
        let hover = env.hover_navigation();
        // Only focus on the pressed trigger may sit between its pointer-down and click.
        let keeps_press = match intent {
            Intent::FocusTrigger(item) => self.pressed_closed == Some(item),
            Intent::ClickTrigger(_) | Intent::PointerDown(_) => true,
            _ => false,
        };
        if !keeps_press {
            self.pressed_closed = None;
        }
        match intent {
            Intent::PointerEnterTrigger(item) if hover => self.open(item),
            Intent::PointerEnterPanel | Intent::PointerEnterHeader if hover => self.cancel_close(),
            Intent::PointerLeavePanel | Intent::PointerLeaveHeader if hover => {
                self.schedule_close(self.close_delay_ms)
            }
            Intent::PointerEnterPlainLink if hover => self.close_all(),
            Intent::FocusTrigger(item) => self.open(item),
            Intent::ClickTrigger(item) => {
                let pressed_closed = self.pressed_closed.take() == Some(item);
                if hover || item >= self.item_count {
                    return Response::Default;
                }
                if pressed_closed || !self.is_open(item) {
                    self.open(item);
                    return Response::PreventDefault;
                }
            }
            Intent::Escape => self.close_all(),
            Intent::PointerDown(target) => {
                self.pressed_closed = match target {
                    PressTarget::Trigger(item) if !self.is_open(item) => Some(item),
                    _ => None,
                };
                if target == PressTarget::Outside {
                    self.close_all();
                }
            }
            _ => {}
        }
        Response::Default
    }
}

#[cfg(test)]
pub mod testing {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::{CloseTimer, MenuView, Ticket};

    /// Records item visibility and flags any moment with two panels visible.
    #[derive(Default)]
    pub struct RecordingView {
        pub shown: Vec<bool>,
        pub menu_active: bool,
        pub overlap_seen: bool,
        pub deactivations: usize,
    }

    impl RecordingView {
        pub fn with_items(count: usize) -> Self {
            Self {
                shown: vec![false; count],
                ..Self::default()
            }
        }
    }

    impl MenuView for RecordingView {
        fn show_item(&mut self, item: usize, open: bool) {
            self.shown[item] = open;
            if self.shown.iter().filter(|s| **s).count() > 1 {
                self.overlap_seen = true;
            }
        }

        fn set_menu_active(&mut self, active: bool) {
            if !active {
                self.deactivations += 1;
            }
            self.menu_active = active;
        }
    }

    struct Armed {
        due: u64,
        ticket: Ticket,
        live: Rc<Cell<bool>>,
    }

    /// Virtual-clock timer queue.
    #[derive(Clone, Default)]
    pub struct ManualTimers {
        now: Rc<Cell<u64>>,
        armed: Rc<RefCell<Vec<Armed>>>,
    }

    pub struct ManualHandle(Rc<Cell<bool>>);

    impl Drop for ManualHandle {
        fn drop(&mut self) {
            self.0.set(false);
        }
    }

    impl ManualTimers {
        /// Moves the clock forward and returns the tickets that fired, in order.
        pub fn advance(&self, ms: u64) -> Vec<Ticket> {
            let now = self.now.get() + ms;
            self.now.set(now);
            let mut armed = self.armed.borrow_mut();
            let mut fired: Vec<(u64, Ticket)> = armed
                .iter()
                .filter(|a| a.live.get() && a.due <= now)
                .map(|a| (a.due, a.ticket))
                .collect();
            armed.retain(|a| a.live.get() && a.due > now);
            fired.sort();
            fired.into_iter().map(|(_, t)| t).collect()
        }

        pub fn live(&self) -> usize {
            self.armed.borrow().iter().filter(|a| a.live.get()).count()
        }
    }

    impl CloseTimer for ManualTimers {
        type Handle = ManualHandle;

        fn arm(&mut self, delay_ms: u32, ticket: Ticket) -> ManualHandle {
            let live = Rc::new(Cell::new(true));
            self.armed.borrow_mut().push(Armed {
                due: self.now.get() + u64::from(delay_ms),
                ticket,
                live: live.clone(),
            });
            ManualHandle(live)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{ManualTimers, RecordingView};
    use super::*;

    const DELAY: u32 = 180;

    fn menu(items: usize) -> (MegaMenu<RecordingView, ManualTimers>, ManualTimers) {
        let timers = ManualTimers::default();
        let menu = MegaMenu::new(RecordingView::with_items(items), timers.clone(), items, DELAY);
        (menu, timers)
    }

    fn tick(menu: &mut MegaMenu<RecordingView, ManualTimers>, timers: &ManualTimers, ms: u64) {
        for ticket in timers.advance(ms) {
            menu.expire(ticket);
        }
    }

    fn open_count(menu: &MegaMenu<RecordingView, ManualTimers>) -> usize {
        menu.view().shown.iter().filter(|s| **s).count()
    }

    #[test]
    fn at_most_one_item_open_across_sequences() {
        let (mut menu, _) = menu(3);
        let steps: [Option<usize>; 8] =
            [Some(0), Some(1), None, Some(2), Some(2), Some(0), None, None];
        for step in steps {
            match step {
                Some(item) => menu.open(item),
                None => menu.close_all(),
            }
            assert!(open_count(&menu) <= 1);
            assert_eq!(menu.open_item(), step);
        }
        assert!(!menu.view().overlap_seen);
    }

    #[test]
    fn open_then_open_leaves_only_second() {
        let (mut menu, timers) = menu(2);
        menu.schedule_close(DELAY);
        menu.open(0);
        menu.open(1);
        assert!(menu.is_open(1));
        assert!(!menu.is_open(0));
        assert!(!menu.has_pending_close());
        assert_eq!(timers.live(), 0);
        assert_eq!(menu.view().shown, vec![false, true]);
    }

    #[test]
    fn cancel_before_expiry_keeps_menu_open() {
        let (mut menu, timers) = menu(2);
        menu.open(0);
        menu.schedule_close(DELAY);
        tick(&mut menu, &timers, 100);
        menu.cancel_close();
        tick(&mut menu, &timers, 500);
        assert!(menu.is_open(0));
        assert!(menu.view().menu_active);
    }

    #[test]
    fn rearm_fires_once_from_second_call() {
        let (mut menu, timers) = menu(2);
        menu.open(1);
        menu.schedule_close(DELAY);
        tick(&mut menu, &timers, 150);
        menu.schedule_close(DELAY);
        assert_eq!(timers.live(), 1);

        // First deadline passes without effect.
        tick(&mut menu, &timers, 100);
        assert!(menu.is_open(1));

        let before = menu.view().deactivations;
        tick(&mut menu, &timers, 80);
        assert_eq!(menu.open_item(), None);
        assert_eq!(menu.view().deactivations, before + 1);

        tick(&mut menu, &timers, 1_000);
        assert_eq!(menu.view().deactivations, before + 1);
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let (mut menu, _) = menu(2);
        menu.open(0);
        menu.schedule_close(DELAY);
        let stale = menu.pending_ticket().unwrap();
        menu.open(1);
        menu.expire(stale);
        assert!(menu.is_open(1));
    }

    #[test]
    fn close_all_is_idempotent() {
        let (mut menu, _) = menu(2);
        menu.open(0);
        menu.close_all();
        let shown = menu.view().shown.clone();
        menu.close_all();
        assert_eq!(menu.view().shown, shown);
        assert_eq!(menu.open_item(), None);
        assert!(!menu.view().menu_active);
        assert!(!menu.has_pending_close());
    }

    #[test]
    fn unknown_item_is_ignored() {
        let (mut menu, _) = menu(2);
        menu.open(0);
        menu.open(7);
        assert!(menu.is_open(0));
        assert_eq!(
            menu.handle(Intent::ClickTrigger(7), &Environment::touch()),
            Response::Default
        );
    }

    #[test]
    fn hover_from_trigger_into_panel_then_away() {
        let env = Environment::desktop();
        let (mut menu, timers) = menu(2);

        menu.handle(Intent::PointerEnterTrigger(0), &env);
        assert!(menu.is_open(0));
        assert_eq!(menu.view().shown, vec![true, false]);

        menu.handle(Intent::PointerEnterPanel, &env);
        tick(&mut menu, &timers, 500);
        assert!(menu.is_open(0));

        menu.handle(Intent::PointerLeavePanel, &env);
        tick(&mut menu, &timers, u64::from(DELAY) - 1);
        assert!(menu.is_open(0));
        tick(&mut menu, &timers, 1);
        assert_eq!(menu.open_item(), None);
        assert_eq!(menu.view().shown, vec![false, false]);
        assert!(!menu.view().menu_active);
    }

    #[test]
    fn reentering_header_during_grace_keeps_menu() {
        let env = Environment::desktop();
        let (mut menu, timers) = menu(2);
        menu.handle(Intent::PointerEnterTrigger(1), &env);
        menu.handle(Intent::PointerLeaveHeader, &env);
        tick(&mut menu, &timers, 90);
        menu.handle(Intent::PointerEnterHeader, &env);
        tick(&mut menu, &timers, 1_000);
        assert!(menu.is_open(1));
    }

    #[test]
    fn switching_triggers_never_shows_two_panels() {
        let env = Environment::desktop();
        let (mut menu, timers) = menu(2);
        menu.handle(Intent::PointerEnterTrigger(0), &env);
        menu.handle(Intent::PointerLeavePanel, &env);
        menu.handle(Intent::PointerEnterTrigger(1), &env);
        assert_eq!(menu.view().shown, vec![false, true]);
        assert!(!menu.view().overlap_seen);
        tick(&mut menu, &timers, 1_000);
        assert!(menu.is_open(1));
    }

    #[test]
    fn plain_link_closes_without_grace() {
        let env = Environment::desktop();
        let (mut menu, _) = menu(2);
        menu.handle(Intent::PointerEnterTrigger(0), &env);
        menu.handle(Intent::PointerEnterPlainLink, &env);
        assert_eq!(menu.open_item(), None);
    }

    #[test]
    fn escape_closes_synchronously() {
        let (mut menu, _) = menu(2);
        menu.open(0);
        menu.handle(Intent::Escape, &Environment::touch());
        assert!(!menu.is_open(0));
        assert!(!menu.is_open(1));
        assert!(!menu.view().menu_active);
    }

    #[test]
    fn pointer_down_outside_closes_inside_does_not() {
        let env = Environment::desktop();
        let (mut menu, _) = menu(2);
        menu.open(1);
        menu.handle(Intent::PointerDown(PressTarget::Inside), &env);
        assert!(menu.is_open(1));
        menu.handle(Intent::PointerDown(PressTarget::Outside), &env);
        assert_eq!(menu.open_item(), None);
    }

    #[test]
    fn hover_intents_ignored_on_touch() {
        let env = Environment::touch();
        let (mut menu, timers) = menu(2);
        menu.handle(Intent::PointerEnterTrigger(0), &env);
        assert_eq!(menu.open_item(), None);
        menu.open(0);
        menu.handle(Intent::PointerLeaveHeader, &env);
        assert_eq!(timers.live(), 0);
    }

    #[test]
    fn focus_opens_trigger() {
        let (mut menu, _) = menu(2);
        menu.handle(Intent::FocusTrigger(1), &Environment::desktop());
        assert!(menu.is_open(1));
    }

    #[test]
    fn tap_on_closed_trigger_opens_and_blocks_navigation() {
        let env = Environment::touch();
        let (mut menu, _) = menu(2);

        // Tap: pointer-down, focus, click.
        menu.handle(Intent::PointerDown(PressTarget::Trigger(0)), &env);
        menu.handle(Intent::FocusTrigger(0), &env);
        let response = menu.handle(Intent::ClickTrigger(0), &env);
        assert_eq!(response, Response::PreventDefault);
        assert!(menu.is_open(0));

        // Second tap on the open trigger follows the link.
        menu.handle(Intent::PointerDown(PressTarget::Trigger(0)), &env);
        let response = menu.handle(Intent::ClickTrigger(0), &env);
        assert_eq!(response, Response::Default);
        assert!(menu.is_open(0));
    }

    #[test]
    fn cancelled_press_does_not_block_later_click() {
        let env = Environment::touch();
        let (mut menu, _) = menu(2);

        // Finger lands on the trigger, then the browser turns it into a scroll.
        menu.handle(Intent::PointerDown(PressTarget::Trigger(0)), &env);
        menu.handle(Intent::PointerCancel, &env);

        // Keyboard activation later: focus opens, Enter clicks the open trigger.
        menu.handle(Intent::FocusTrigger(0), &env);
        assert!(menu.is_open(0));
        assert_eq!(menu.handle(Intent::ClickTrigger(0), &env), Response::Default);
    }

    #[test]
    fn unrelated_intent_clears_pending_press() {
        let env = Environment::touch();
        let (mut menu, _) = menu(2);

        menu.handle(Intent::PointerDown(PressTarget::Trigger(0)), &env);
        menu.handle(Intent::FocusTrigger(1), &env);
        menu.handle(Intent::FocusTrigger(0), &env);
        assert_eq!(menu.handle(Intent::ClickTrigger(0), &env), Response::Default);
    }

    #[test]
    fn click_on_desktop_follows_link() {
        let env = Environment::desktop();
        let (mut menu, _) = menu(2);
        menu.handle(Intent::PointerEnterTrigger(0), &env);
        menu.handle(Intent::PointerDown(PressTarget::Trigger(0)), &env);
        assert_eq!(menu.handle(Intent::ClickTrigger(0), &env), Response::Default);
    }
}
