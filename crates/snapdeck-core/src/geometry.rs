//! Geometry oracle: scroll extents of horizontal slides.
//!
//! Nested content may mount late or animate its own layout, so a failed
//! measurement is retried on a fixed backoff schedule. Retries are
//! cooperative: `poll` runs whatever attempt is due and either resolves or
//! schedules the next one. After the schedule is exhausted the configured
//! fallback width is cached instead.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

use crate::config::GeometryTuning;
use crate::env::Environment;
use crate::item::SnapItem;

/// How a cached width was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidthSource {
    Declared,
    Measured,
    Reported,
    Fallback,
}

/// A width that just became known
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWidth {
    pub item_id: String,
    pub width: f64,
    pub source: WidthSource,
}

#[derive(Debug, Clone)]
struct MeasureJob {
    item_id: String,
    origin: Duration,
    /// 0 is the attempt at `origin`, k > 0 runs at `origin + schedule[k - 1]`
    attempt: usize,
}

#[derive(Debug, Clone)]
pub struct GeometryOracle {
    tuning: GeometryTuning,
    cache: HashMap<String, f64>,
    job: Option<MeasureJob>,
    /// Width the current item had before a resize, until it is re-measured
    stale: Option<(String, f64)>,
}

impl GeometryOracle {
    pub fn new(tuning: GeometryTuning) -> Self {
        Self {
            tuning,
            cache: HashMap::new(),
            job: None,
            stale: None,
        }
    }

    /// Cached effective width, `None` while unknown
    pub fn max_scroll(&self, item_id: &str) -> Option<f64> {
        self.cache.get(item_id).copied()
    }

    /// Width to use for boundary checks.
    ///
    /// While a resize re-measurement is pending the previous width stays in
    /// effect; otherwise the fallback covers the wait.
    pub fn effective_max(&self, item_id: &str) -> f64 {
        self.max_scroll(item_id)
            .or_else(|| self.stale_width(item_id))
            .unwrap_or(self.tuning.fallback_width)
    }

    pub fn is_pending(&self, item_id: &str) -> bool {
        self.job.as_ref().is_some_and(|job| job.item_id == item_id)
    }

    /// Called when an item becomes current.
    ///
    /// Runs the first measurement attempt immediately and returns the width
    /// if it resolved without waiting.
    pub fn activate(
        &mut self,
        item: &SnapItem,
        now: Duration,
        env: &dyn Environment,
    ) -> Option<ResolvedWidth> {
        if !item.is_horizontal() {
            return None;
        }
        if let Some(width) = item.declared_scroll_width {
            let width = sanitize(width);
            self.cache.insert(item.id.clone(), width);
            return Some(ResolvedWidth {
                item_id: item.id.clone(),
                width,
                source: WidthSource::Declared,
            });
        }
        if self.cache.contains_key(&item.id) || self.is_pending(&item.id) {
            return None;
        }

        self.job = Some(MeasureJob {
            item_id: item.id.clone(),
            origin: now,
            attempt: 0,
        });
        self.poll(now, Some(&item.id), env)
    }

    /// Run a due attempt for the current item.
    ///
    /// A job whose item is no longer current is dropped without measuring.
    pub fn poll(
        &mut self,
        now: Duration,
        current_id: Option<&str>,
        env: &dyn Environment,
    ) -> Option<ResolvedWidth> {
        let tuning = &self.tuning;
        let job = self.job.as_mut()?;

        if current_id != Some(job.item_id.as_str()) {
            tracing::trace!(item = %job.item_id, "dropping measurement for inactive item");
            self.job = None;
            return None;
        }

        if now < due_at(tuning, job) {
            return None;
        }

        let measured = env
            .measure_scroll_extent(&job.item_id)
            .map(|extent| extent.effective());

        match measured {
            Some(width) if width > tuning.noise_floor => {
                let item_id = job.item_id.clone();
                tracing::debug!(item = %item_id, width, attempt = job.attempt, "measured scroll width");
                self.job = None;
                self.cache.insert(item_id.clone(), width);
                Some(ResolvedWidth {
                    item_id,
                    width,
                    source: WidthSource::Measured,
                })
            }
            _ => {
                job.attempt += 1;
                if job.attempt <= tuning.retry_schedule_ms.len() {
                    tracing::trace!(
                        item = %job.item_id,
                        attempt = job.attempt,
                        "measurement not ready, retrying"
                    );
                    return None;
                }

                let item_id = job.item_id.clone();
                let width = tuning.fallback_width;
                tracing::warn!(
                    item = %item_id,
                    attempts = job.attempt,
                    fallback = width,
                    "could not measure scroll width, using fallback"
                );
                self.job = None;
                self.cache.insert(item_id.clone(), width);
                Some(ResolvedWidth {
                    item_id,
                    width,
                    source: WidthSource::Fallback,
                })
            }
        }
    }

    /// Authoritative width pushed by a panel; overrides any measurement
    pub fn push_measurement(&mut self, item_id: &str, width: f64) -> ResolvedWidth {
        let width = sanitize(width);
        if self.is_pending(item_id) {
            self.job = None;
        }
        self.cache.insert(item_id.to_string(), width);
        ResolvedWidth {
            item_id: item_id.to_string(),
            width,
            source: WidthSource::Reported,
        }
    }

    /// Viewport resize: every cached width may be stale.
    ///
    /// The current item is re-measured after the debounce delay; repeated
    /// calls push that delay back.
    pub fn invalidate_all(&mut self, now: Duration, current: Option<&SnapItem>) {
        let previous = current.and_then(|item| {
            self.max_scroll(&item.id)
                .or_else(|| self.stale_width(&item.id))
                .map(|width| (item.id.clone(), width))
        });
        self.cache.clear();
        self.job = None;
        self.stale = None;

        let Some(item) = current.filter(|item| item.is_horizontal()) else {
            return;
        };
        if let Some(width) = item.declared_scroll_width {
            self.cache.insert(item.id.clone(), sanitize(width));
            return;
        }
        self.stale = previous;
        self.job = Some(MeasureJob {
            item_id: item.id.clone(),
            origin: now + Duration::from_millis(self.tuning.resize_debounce_ms),
            attempt: 0,
        });
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.job.as_ref().map(|job| due_at(&self.tuning, job))
    }

    fn stale_width(&self, item_id: &str) -> Option<f64> {
        if !self.is_pending(item_id) {
            return None;
        }
        self.stale
            .as_ref()
            .filter(|(id, _)| id == item_id)
            .map(|(_, width)| *width)
    }
}

fn due_at(tuning: &GeometryTuning, job: &MeasureJob) -> Duration {
    match job.attempt {
        0 => job.origin,
        k => {
            let offset = tuning
                .retry_schedule_ms
                .get(k - 1)
                .copied()
                .unwrap_or_default();
            job.origin + Duration::from_millis(offset)
        }
    }
}

fn sanitize(width: f64) -> f64 {
    if width.is_finite() {
        width.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ScriptedEnvironment;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn oracle() -> GeometryOracle {
        GeometryOracle::new(GeometryTuning::default())
    }

    #[test]
    fn test_declared_width_skips_measurement() {
        let env = ScriptedEnvironment::new();
        let mut oracle = oracle();
        let item = SnapItem::horizontal("work").with_declared_width(640.0);
        let resolved = oracle.activate(&item, ms(0), &env).unwrap();
        assert_eq!(resolved.source, WidthSource::Declared);
        assert_eq!(oracle.max_scroll("work"), Some(640.0));
        assert_eq!(env.measure_calls(), 0);
    }

    #[test]
    fn test_immediate_measurement() {
        let env = ScriptedEnvironment::new().with_extent("work", 1200.0, 400.0);
        let mut oracle = oracle();
        let resolved = oracle.activate(&SnapItem::horizontal("work"), ms(0), &env).unwrap();
        assert_eq!(resolved.width, 800.0);
        assert_eq!(resolved.source, WidthSource::Measured);
        assert!(oracle.next_deadline().is_none());
    }

    #[test]
    fn test_retries_follow_schedule() {
        let mut env = ScriptedEnvironment::new();
        env.set_extent("work", 900.0, 400.0, 3);
        let mut oracle = oracle();
        let item = SnapItem::horizontal("work");

        assert!(oracle.activate(&item, ms(1000), &env).is_none());
        assert_eq!(oracle.next_deadline(), Some(ms(1100)));
        assert!(oracle.poll(ms(1050), Some("work"), &env).is_none());
        assert!(oracle.poll(ms(1100), Some("work"), &env).is_none());
        assert_eq!(oracle.next_deadline(), Some(ms(1300)));
        assert!(oracle.poll(ms(1300), Some("work"), &env).is_none());
        let resolved = oracle.poll(ms(1500), Some("work"), &env).unwrap();
        assert_eq!(resolved.width, 500.0);
        assert_eq!(env.measure_calls(), 4);
    }

    #[test]
    fn test_noise_floor_measurement_keeps_retrying() {
        let env = ScriptedEnvironment::new().with_extent("work", 405.0, 400.0);
        let mut oracle = oracle();
        assert!(oracle.activate(&SnapItem::horizontal("work"), ms(0), &env).is_none());
        assert!(oracle.is_pending("work"));
    }

    #[test]
    fn test_exhaustion_falls_back() {
        let env = ScriptedEnvironment::new();
        let mut oracle = oracle();
        let item = SnapItem::horizontal("work");
        oracle.activate(&item, ms(0), &env);

        let mut resolved = None;
        for t in [100, 300, 500, 800, 1200, 2000] {
            resolved = oracle.poll(ms(t), Some("work"), &env);
        }
        let resolved = resolved.unwrap();
        assert_eq!(resolved.source, WidthSource::Fallback);
        assert_eq!(oracle.max_scroll("work"), Some(500.0));
        assert_eq!(env.measure_calls(), 7);
    }

    #[test]
    fn test_stale_job_is_noop() {
        let env = ScriptedEnvironment::new();
        let mut oracle = oracle();
        oracle.activate(&SnapItem::horizontal("work"), ms(0), &env);
        let calls = env.measure_calls();
        assert!(oracle.poll(ms(100), Some("contact"), &env).is_none());
        assert_eq!(env.measure_calls(), calls);
        assert!(oracle.next_deadline().is_none());
    }

    #[test]
    fn test_reported_width_wins() {
        let env = ScriptedEnvironment::new();
        let mut oracle = oracle();
        oracle.activate(&SnapItem::horizontal("work"), ms(0), &env);
        let resolved = oracle.push_measurement("work", 1500.0);
        assert_eq!(resolved.source, WidthSource::Reported);
        assert!(!oracle.is_pending("work"));
        assert_eq!(oracle.max_scroll("work"), Some(1500.0));

        oracle.push_measurement("work", -20.0);
        assert_eq!(oracle.max_scroll("work"), Some(0.0));
    }

    #[test]
    fn test_resize_invalidates_everything() {
        let env = ScriptedEnvironment::new()
            .with_extent("a", 900.0, 400.0)
            .with_extent("b", 700.0, 400.0);
        let mut oracle = oracle();
        let a = SnapItem::horizontal("a");
        let b = SnapItem::horizontal("b");
        oracle.activate(&a, ms(0), &env);
        oracle.activate(&b, ms(0), &env);
        assert!(oracle.max_scroll("a").is_some());

        oracle.invalidate_all(ms(1000), Some(&b));
        assert!(oracle.max_scroll("a").is_none());
        assert!(oracle.max_scroll("b").is_none());
        assert_eq!(oracle.next_deadline(), Some(ms(1150)));

        // A second resize pushes the debounce back
        oracle.invalidate_all(ms(1100), Some(&b));
        assert!(oracle.poll(ms(1150), Some("b"), &env).is_none());
        let resolved = oracle.poll(ms(1250), Some("b"), &env).unwrap();
        assert_eq!(resolved.width, 300.0);
    }

    #[test]
    fn test_previous_width_holds_until_remeasured() {
        let mut env = ScriptedEnvironment::new().with_extent("b", 1200.0, 400.0);
        let mut oracle = oracle();
        let b = SnapItem::horizontal("b");
        oracle.activate(&b, ms(0), &env);
        assert_eq!(oracle.effective_max("b"), 800.0);

        env.set_extent("b", 700.0, 400.0, 0);
        oracle.invalidate_all(ms(1000), Some(&b));
        oracle.invalidate_all(ms(1050), Some(&b));
        assert_eq!(oracle.max_scroll("b"), None);
        assert_eq!(oracle.effective_max("b"), 800.0);

        oracle.poll(ms(1200), Some("b"), &env).unwrap();
        assert_eq!(oracle.effective_max("b"), 300.0);
    }
}
