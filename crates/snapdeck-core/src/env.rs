//! Host capabilities the engine queries instead of reaching for ambient page state.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};

/// Raw measurement of a nested horizontal scroller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollExtent {
    pub scroll_width: f64,
    pub client_width: f64,
}

impl ScrollExtent {
    pub fn new(scroll_width: f64, client_width: f64) -> Self {
        Self {
            scroll_width,
            client_width,
        }
    }

    /// Scrollable distance beyond the viewport, floored at zero
    pub fn effective(&self) -> f64 {
        let width = self.scroll_width - self.client_width;
        if width.is_finite() {
            width.max(0.0)
        } else {
            0.0
        }
    }
}

/// Capabilities the embedding page provides to the engine
pub trait Environment {
    /// Whether the element with this identifier exists and is on screen
    fn is_element_visible(&self, id: &str) -> bool;

    /// Smoothly scroll the native document so the element is in view
    fn scroll_into_view(&mut self, id: &str);

    /// Measure the nested scroller of a slide, `None` if not mounted yet
    fn measure_scroll_extent(&self, item_id: &str) -> Option<ScrollExtent>;

    /// Whether the engine's own container is inside the visible region
    fn is_container_in_view(&self) -> bool;
}

/// Deterministic environment for tests and trace replay.
///
/// Extents can be set to appear only after a number of measurement calls,
/// which models content that mounts late.
#[derive(Debug, Clone)]
pub struct ScriptedEnvironment {
    extents: HashMap<String, ScriptedExtent>,
    visible: HashSet<String>,
    container_in_view: bool,
    scroll_requests: Vec<String>,
    measure_calls: Cell<u32>,
}

#[derive(Debug, Clone)]
struct ScriptedExtent {
    extent: ScrollExtent,
    available_after: u32,
    calls: Cell<u32>,
}

impl Default for ScriptedEnvironment {
    fn default() -> Self {
        Self {
            extents: HashMap::new(),
            visible: HashSet::new(),
            container_in_view: true,
            scroll_requests: Vec::new(),
            measure_calls: Cell::new(0),
        }
    }
}

impl ScriptedEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a measurement available immediately
    pub fn with_extent(mut self, item_id: &str, scroll_width: f64, client_width: f64) -> Self {
        self.set_extent(item_id, scroll_width, client_width, 0);
        self
    }

    /// Make a measurement available only after `failed_calls` attempts
    pub fn set_extent(
        &mut self,
        item_id: &str,
        scroll_width: f64,
        client_width: f64,
        failed_calls: u32,
    ) {
        self.extents.insert(
            item_id.to_string(),
            ScriptedExtent {
                extent: ScrollExtent::new(scroll_width, client_width),
                available_after: failed_calls,
                calls: Cell::new(0),
            },
        );
    }

    pub fn remove_extent(&mut self, item_id: &str) {
        self.extents.remove(item_id);
    }

    pub fn set_element_visible(&mut self, id: &str, visible: bool) {
        if visible {
            self.visible.insert(id.to_string());
        } else {
            self.visible.remove(id);
        }
    }

    pub fn set_container_in_view(&mut self, in_view: bool) {
        self.container_in_view = in_view;
    }

    /// Every `scroll_into_view` target requested so far
    pub fn scroll_requests(&self) -> &[String] {
        &self.scroll_requests
    }

    /// Total number of measurement calls made against this environment
    pub fn measure_calls(&self) -> u32 {
        self.measure_calls.get()
    }
}

impl Environment for ScriptedEnvironment {
    fn is_element_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    fn scroll_into_view(&mut self, id: &str) {
        self.scroll_requests.push(id.to_string());
        self.visible.insert(id.to_string());
        self.container_in_view = false;
    }

    fn measure_scroll_extent(&self, item_id: &str) -> Option<ScrollExtent> {
        self.measure_calls.set(self.measure_calls.get() + 1);
        let scripted = self.extents.get(item_id)?;
        let calls = scripted.calls.get();
        scripted.calls.set(calls + 1);
        (calls >= scripted.available_after).then_some(scripted.extent)
    }

    fn is_container_in_view(&self) -> bool {
        self.container_in_view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_extent_floors_at_zero() {
        assert_eq!(ScrollExtent::new(300.0, 800.0).effective(), 0.0);
        assert_eq!(ScrollExtent::new(1300.0, 800.0).effective(), 500.0);
        assert_eq!(ScrollExtent::new(f64::NAN, 800.0).effective(), 0.0);
    }

    #[test]
    fn test_scripted_extent_appears_late() {
        let mut env = ScriptedEnvironment::new();
        env.set_extent("work", 1200.0, 400.0, 2);
        assert!(env.measure_scroll_extent("work").is_none());
        assert!(env.measure_scroll_extent("work").is_none());
        assert_eq!(env.measure_scroll_extent("work").map(|e| e.effective()), Some(800.0));
        assert_eq!(env.measure_calls(), 3);
    }

    #[test]
    fn test_scroll_into_view_moves_document() {
        let mut env = ScriptedEnvironment::new();
        assert!(env.is_container_in_view());
        env.scroll_into_view("after-deck");
        assert!(!env.is_container_in_view());
        assert!(env.is_element_visible("after-deck"));
        assert_eq!(env.scroll_requests(), ["after-deck".to_string()]);
    }
}
