//! Slides managed by the engine and the contract their panels opt into.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Whether a slide carries its own horizontal scroll axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[default]
    Simple,
    HorizontalScroll,
}

/// One slide in the deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapItem {
    pub id: String,
    #[serde(default)]
    pub kind: ItemKind,
    /// Known scroll extent; skips measurement entirely when set
    #[serde(default)]
    pub declared_scroll_width: Option<f64>,
}

impl SnapItem {
    pub fn simple(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ItemKind::Simple,
            declared_scroll_width: None,
        }
    }

    pub fn horizontal(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ItemKind::HorizontalScroll,
            declared_scroll_width: None,
        }
    }

    pub fn with_declared_width(mut self, width: f64) -> Self {
        self.declared_scroll_width = Some(width);
        self
    }

    #[inline]
    pub fn is_horizontal(&self) -> bool {
        self.kind == ItemKind::HorizontalScroll
    }
}

/// Reject decks the engine cannot address unambiguously
pub fn validate_items(items: &[SnapItem]) -> Result<()> {
    let mut seen = HashSet::new();
    for item in items {
        if item.id.trim().is_empty() {
            return Err(Error::InvalidDeck("item id must not be empty".to_string()));
        }
        if !seen.insert(item.id.as_str()) {
            return Err(Error::InvalidDeck(format!("duplicate item id '{}'", item.id)));
        }
    }
    Ok(())
}

/// Values the engine hands to the active panel each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelProps {
    pub horizontal_progress: f64,
    pub is_interaction_active: bool,
}

/// Render-side half of a slide.
///
/// Panels with dynamic content report their true scroll extent through
/// `measure`; the host forwards it to `SnapEngine::push_measurement`, which
/// takes precedence over environment measurement.
pub trait Panel {
    /// Intrinsic scrollable width beyond the viewport, if the panel knows it
    fn measure(&self, _viewport_width: f64) -> Option<f64> {
        None
    }

    /// Receive the engine's current props while this panel is active
    fn apply_props(&mut self, _props: &PanelProps) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_duplicates() {
        let items = vec![SnapItem::simple("a"), SnapItem::horizontal("a")];
        assert!(matches!(validate_items(&items), Err(Error::InvalidDeck(_))));
    }

    #[test]
    fn test_validate_rejects_blank_id() {
        let items = vec![SnapItem::simple("  ")];
        assert!(validate_items(&items).is_err());
    }

    #[test]
    fn test_validate_accepts_empty_deck() {
        assert!(validate_items(&[]).is_ok());
    }

    #[test]
    fn test_item_deserializes_with_defaults() {
        let item: SnapItem = serde_json::from_str(r#"{"id":"hero"}"#).unwrap();
        assert_eq!(item, SnapItem::simple("hero"));

        let item: SnapItem =
            serde_json::from_str(r#"{"id":"work","kind":"horizontal_scroll","declared_scroll_width":640}"#)
                .unwrap();
        assert!(item.is_horizontal());
        assert_eq!(item.declared_scroll_width, Some(640.0));
    }
}
