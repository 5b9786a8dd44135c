//! Placement output for render layers.

use std::time::Duration;

use crate::engine::SnapEngine;

/// Where one panel sits relative to the viewport
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub index: usize,
    pub id: String,
    /// Viewport heights away from the active panel; 0 is on screen
    pub slot: isize,
    /// Horizontal scroll offset, non-zero only for the active panel
    pub horizontal_offset: f64,
}

impl Placement {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.slot == 0
    }

    /// Active panel or one of its immediate neighbours
    #[inline]
    pub fn is_adjacent(&self) -> bool {
        self.slot.abs() <= 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeckLayout {
    pub placements: Vec<Placement>,
    pub transition: Duration,
    pub control_released: bool,
}

impl DeckLayout {
    pub fn active(&self) -> Option<&Placement> {
        self.placements.iter().find(|p| p.is_active())
    }

    /// Panels worth rendering: the active one and its neighbours
    pub fn visible(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(|p| p.is_adjacent())
    }
}

/// Compute panel placement for the engine's current position
pub fn layout(engine: &SnapEngine) -> DeckLayout {
    let state = engine.state();
    let current = state.current_index as isize;

    let placements = engine
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let slot = index as isize - current;
            Placement {
                index,
                id: item.id.clone(),
                slot,
                horizontal_offset: if slot == 0 { state.horizontal_progress } else { 0.0 },
            }
        })
        .collect();

    DeckLayout {
        placements,
        transition: Duration::from_millis(state.transition_duration_ms),
        control_released: state.control_released,
    }
}
