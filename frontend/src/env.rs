use crate::config::{DESKTOP_MIN_WIDTH, MOBILE_MAX_WIDTH};

/// Snapshot of the pointer capabilities and viewport width at event time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Environment {
    pub hover_fine_pointer: bool,
    pub viewport_width: f64,
}

impl Environment {
    pub fn current() -> Self {
        let window = web_sys::window();
        let hover_fine_pointer = window
            .as_ref()
            .and_then(|w| w.match_media("(hover: hover) and (pointer: fine)").ok().flatten())
            .map(|mql| mql.matches())
            .unwrap_or(false);
        let viewport_width = window
            .as_ref()
            .and_then(|w| w.inner_width().ok())
            .and_then(|w| w.as_f64())
            .unwrap_or(0.0);
        Self {
            hover_fine_pointer,
            viewport_width,
        }
    }

    pub fn is_desktop(&self) -> bool {
        self.viewport_width > DESKTOP_MIN_WIDTH
    }

    pub fn is_mobile(&self) -> bool {
        self.viewport_width <= MOBILE_MAX_WIDTH
    }

    /// Desktop-like environment where hover intent drives the mega menu.
    pub fn hover_navigation(&self) -> bool {
        self.hover_fine_pointer && self.is_desktop()
    }
}

#[cfg(test)]
impl Environment {
    pub fn desktop() -> Self {
        Self {
            hover_fine_pointer: true,
            viewport_width: 1440.0,
        }
    }

    pub fn touch() -> Self {
        Self {
            hover_fine_pointer: false,
            viewport_width: 390.0,
        }
    }
}
