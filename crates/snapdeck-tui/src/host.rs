//! The terminal "document" hosting the deck.
//!
//! The terminal shows one of two pages: the deck itself or the section that
//! follows it. Handing scroll back to the document means switching pages.

use std::collections::HashMap;

use snapdeck_core::{Environment, ScrollExtent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Deck,
    After,
}

#[derive(Debug, Clone)]
pub struct TerminalEnvironment {
    page: Page,
    after_target: String,
    /// Width of the slide area in engine units, unknown until the first draw
    viewport_width: Option<f64>,
    content_widths: HashMap<String, f64>,
}

impl TerminalEnvironment {
    pub fn new(after_target: impl Into<String>) -> Self {
        Self {
            page: Page::Deck,
            after_target: after_target.into(),
            viewport_width: None,
            content_widths: HashMap::new(),
        }
    }

    #[inline]
    pub fn page(&self) -> Page {
        self.page
    }

    pub fn show_deck(&mut self) {
        self.page = Page::Deck;
    }

    pub fn show_after(&mut self) {
        self.page = Page::After;
    }

    pub fn viewport_width(&self) -> Option<f64> {
        self.viewport_width
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = (width > 0.0).then_some(width);
    }

    /// Record the laid-out width of a slide's scrollable strip
    pub fn set_content_width(&mut self, item_id: &str, width: f64) {
        self.content_widths.insert(item_id.to_string(), width);
    }
}

impl Environment for TerminalEnvironment {
    fn is_element_visible(&self, id: &str) -> bool {
        id == self.after_target && self.page == Page::After
    }

    fn scroll_into_view(&mut self, id: &str) {
        if id == self.after_target {
            self.page = Page::After;
        } else {
            tracing::debug!(%id, "scroll target not present in terminal document");
        }
    }

    fn measure_scroll_extent(&self, item_id: &str) -> Option<ScrollExtent> {
        let viewport = self.viewport_width?;
        let content = self.content_widths.get(item_id)?;
        Some(ScrollExtent::new(*content, viewport))
    }

    fn is_container_in_view(&self) -> bool {
        self.page == Page::Deck
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_waits_for_first_draw() {
        let mut env = TerminalEnvironment::new("after-deck");
        env.set_content_width("services", 1200.0);
        assert!(env.measure_scroll_extent("services").is_none());

        env.set_viewport_width(640.0);
        let extent = env.measure_scroll_extent("services").unwrap();
        assert_eq!(extent.effective(), 560.0);
        assert!(env.measure_scroll_extent("intro").is_none());
    }

    #[test]
    fn test_handoff_switches_page() {
        let mut env = TerminalEnvironment::new("after-deck");
        assert!(env.is_container_in_view());
        assert!(!env.is_element_visible("after-deck"));

        env.scroll_into_view("elsewhere");
        assert_eq!(env.page(), Page::Deck);

        env.scroll_into_view("after-deck");
        assert_eq!(env.page(), Page::After);
        assert!(env.is_element_visible("after-deck"));
        assert!(!env.is_container_in_view());
    }
}
