//! Companion backdrop driven by the engine's index observer.
//!
//! Zooms the slide frame and shades the background as the deck advances.
//! The observer only writes the latest index into a shared cell; the driver
//! picks it up on the next frame, so nothing flows back into the engine.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use snapdeck_core::EasingType;

use crate::scroll::ValueAnimator;

/// Extra zoom applied at the last slide
const MAX_ZOOM: f64 = 0.15;
const BACKDROP_TRANSITION: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backdrop {
    /// 1.0 at the first slide
    pub zoom: f64,
    /// 0.0 at the first slide, 1.0 at the last
    pub shade: f64,
}

#[derive(Debug)]
pub struct BackdropDriver {
    latest: Rc<Cell<usize>>,
    shown: usize,
    slide_count: usize,
    zoom: ValueAnimator,
    shade: ValueAnimator,
}

impl BackdropDriver {
    pub fn new(slide_count: usize, easing: EasingType) -> Self {
        let mut zoom = ValueAnimator::new(easing);
        zoom.set(1.0);
        Self {
            latest: Rc::new(Cell::new(0)),
            shown: 0,
            slide_count,
            zoom,
            shade: ValueAnimator::new(easing),
        }
    }

    /// Callback to register with `SnapEngine::set_index_observer`
    pub fn observer(&self) -> impl FnMut(usize) + 'static {
        let latest = Rc::clone(&self.latest);
        move |index| latest.set(index)
    }

    pub fn is_animating(&self) -> bool {
        self.zoom.is_animating() || self.shade.is_animating()
    }

    pub fn update(&mut self, now: Duration) -> Backdrop {
        let index = self.latest.get();
        if index != self.shown {
            self.shown = index;
            let t = self.fraction(index);
            self.zoom.animate_to(1.0 + MAX_ZOOM * t, BACKDROP_TRANSITION, now);
            self.shade.animate_to(t, BACKDROP_TRANSITION, now);
        }
        Backdrop {
            zoom: self.zoom.update(now),
            shade: self.shade.update(now),
        }
    }

    fn fraction(&self, index: usize) -> f64 {
        if self.slide_count <= 1 {
            return 0.0;
        }
        (index.min(self.slide_count - 1)) as f64 / (self.slide_count - 1) as f64
    }
}
