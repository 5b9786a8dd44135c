//! Deck files and the panels rendered for each slide.

use std::path::Path;

use serde::{Deserialize, Serialize};
use snapdeck_core::item::validate_items;
use snapdeck_core::{Error, Panel, PanelProps, Result, SnapItem};

/// Width of one carousel card in terminal columns
pub const CARD_WIDTH: u16 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckFile {
    #[serde(default = "default_title")]
    pub title: String,
    /// Heading of the page shown after the deck releases control
    #[serde(default = "default_after_title")]
    pub after_title: String,
    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Cards laid out side by side; makes the slide horizontally scrollable
    #[serde(default)]
    pub cards: Vec<Card>,
    /// Known horizontal extent in engine units, skips measurement
    #[serde(default)]
    pub scroll_width: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

fn default_title() -> String {
    "snapdeck".to_string()
}

fn default_after_title() -> String {
    "Thanks for scrolling".to_string()
}

impl Slide {
    pub fn is_horizontal(&self) -> bool {
        !self.cards.is_empty()
    }

    pub fn to_item(&self) -> SnapItem {
        let item = if self.is_horizontal() {
            SnapItem::horizontal(self.id.clone())
        } else {
            SnapItem::simple(self.id.clone())
        };
        match self.scroll_width {
            Some(width) if self.is_horizontal() => item.with_declared_width(width),
            _ => item,
        }
    }
}

impl DeckFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let deck: DeckFile =
            toml::from_str(content).map_err(|e| Error::InvalidDeck(e.to_string()))?;
        validate_items(&deck.items())?;
        Ok(deck)
    }

    pub fn items(&self) -> Vec<SnapItem> {
        self.slides.iter().map(Slide::to_item).collect()
    }

    /// Built-in deck used when no file is given
    pub fn demo() -> Self {
        let card = |title: &str, body: &str| Card {
            title: title.to_string(),
            body: body.to_string(),
        };
        Self {
            title: default_title(),
            after_title: default_after_title(),
            slides: vec![
                Slide {
                    id: "intro".to_string(),
                    title: "Scroll to begin".to_string(),
                    body: "Each wheel gesture, drag or arrow key moves exactly one slide.\n\
                           Quick flicks need less travel than slow drags."
                        .to_string(),
                    cards: Vec::new(),
                    scroll_width: None,
                },
                Slide {
                    id: "services".to_string(),
                    title: "Services".to_string(),
                    body: "This slide scrolls sideways before the deck moves on.".to_string(),
                    cards: vec![
                        card("Design", "Interfaces that read at a glance."),
                        card("Build", "Native code with predictable latency."),
                        card("Operate", "Monitoring and on-call included."),
                        card("Train", "Workshops for in-house teams."),
                        card("Audit", "Performance and accessibility reviews."),
                    ],
                    scroll_width: None,
                },
                Slide {
                    id: "work".to_string(),
                    title: "Selected work".to_string(),
                    body: String::new(),
                    cards: vec![
                        card("Atlas", "Fleet telemetry dashboard."),
                        card("Quill", "Collaborative editor."),
                        card("Harbor", "Container registry mirror."),
                    ],
                    scroll_width: Some(240.0),
                },
                Slide {
                    id: "contact".to_string(),
                    title: "Get in touch".to_string(),
                    body: "Scroll once more to leave the deck.".to_string(),
                    cards: Vec::new(),
                    scroll_width: None,
                },
            ],
        }
    }
}

/// Panel for a slide: tracks the props the engine hands it and knows its
/// own content width when it is a card carousel.
#[derive(Debug, Clone)]
pub struct SlidePanel {
    card_count: usize,
    card_width_units: f64,
    props: Option<PanelProps>,
}

impl SlidePanel {
    pub fn new(slide: &Slide, cell_width_units: f64) -> Self {
        Self {
            card_count: slide.cards.len(),
            card_width_units: CARD_WIDTH as f64 * cell_width_units,
            props: None,
        }
    }

    /// Full width of the card strip in engine units
    pub fn content_width(&self) -> f64 {
        self.card_count as f64 * self.card_width_units
    }

    pub fn props(&self) -> Option<&PanelProps> {
        self.props.as_ref()
    }

    pub fn clear_props(&mut self) {
        self.props = None;
    }
}

impl Panel for SlidePanel {
    fn measure(&self, viewport_width: f64) -> Option<f64> {
        if self.card_count == 0 || viewport_width <= 0.0 {
            return None;
        }
        Some((self.content_width() - viewport_width).max(0.0))
    }

    fn apply_props(&mut self, props: &PanelProps) {
        self.props = Some(*props);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECK: &str = r#"
title = "Portfolio"

[[slides]]
id = "hero"
title = "Hello"
body = "Scroll down"

[[slides]]
id = "projects"
title = "Projects"
scroll_width = 900.0

[[slides.cards]]
title = "One"

[[slides.cards]]
title = "Two"
body = "Second card"
"#;

    #[test]
    fn test_parse_deck_file() {
        let deck = DeckFile::from_toml(DECK).unwrap();
        assert_eq!(deck.title, "Portfolio");
        assert_eq!(deck.slides.len(), 2);
        assert_eq!(deck.slides[1].cards.len(), 2);

        let items = deck.items();
        assert!(!items[0].is_horizontal());
        assert!(items[1].is_horizontal());
        assert_eq!(items[1].declared_scroll_width, Some(900.0));
    }

    #[test]
    fn test_scroll_width_ignored_without_cards() {
        let slide = Slide {
            id: "plain".to_string(),
            title: "Plain".to_string(),
            body: String::new(),
            cards: Vec::new(),
            scroll_width: Some(300.0),
        };
        assert_eq!(slide.to_item(), SnapItem::simple("plain"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let content = r#"
[[slides]]
id = "a"
title = "A"

[[slides]]
id = "a"
title = "B"
"#;
        assert!(matches!(DeckFile::from_toml(content), Err(Error::InvalidDeck(_))));
    }

    #[test]
    fn test_demo_deck_is_valid() {
        let deck = DeckFile::demo();
        assert!(validate_items(&deck.items()).is_ok());
        assert!(deck.items().iter().any(|item| item.is_horizontal()));
    }

    #[test]
    fn test_panel_measures_overflow() {
        let slide = &DeckFile::demo().slides[1];
        let mut panel = SlidePanel::new(slide, 8.0);
        // 5 cards * 30 columns * 8 units
        assert_eq!(panel.content_width(), 1200.0);
        assert_eq!(panel.measure(800.0), Some(400.0));
        assert_eq!(panel.measure(2000.0), Some(0.0));
        assert_eq!(panel.measure(0.0), None);

        panel.apply_props(&PanelProps {
            horizontal_progress: 120.0,
            is_interaction_active: true,
        });
        assert_eq!(panel.props().map(|p| p.horizontal_progress), Some(120.0));
    }
}
