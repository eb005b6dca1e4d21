//! One-shot reveal latch.
//!
//! A [`VisibilityTrigger`] watches one region and flips `revealed` to true the
//! first time the region's visible fraction reaches the threshold. After that
//! the observation is released and later samples are ignored; leaving and
//! re-entering the viewport does not fire again.
//!
//! Hosts without an observation primitive (or misconfigured thresholds) fail
//! open: the trigger is revealed as soon as it is created.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use unveil_core::*;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Visible fraction in `[0, 1]` at which the region counts as entered.
    pub threshold: f32,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self { threshold: 0.3 }
    }
}

impl VisibilityConfig {
    pub fn with_threshold(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if (0.0..=1.0).contains(&self.threshold) {
            Ok(())
        } else {
            Err(ConfigError::ThresholdOutOfRange(self.threshold))
        }
    }
}

struct TriggerInner {
    revealed: Signal<bool>,
    subscription: RefCell<Option<Dispose>>,
    on_enter: RefCell<Option<Box<dyn FnOnce()>>>,
    disposed: Cell<bool>,
}

impl TriggerInner {
    fn fire(&self) {
        if self.disposed.get() || self.revealed.get() {
            return;
        }
        self.revealed.set(true);
        let sub = self.subscription.borrow_mut().take();
        if let Some(sub) = sub {
            sub.run();
        }
        let on_enter = self.on_enter.borrow_mut().take();
        if let Some(on_enter) = on_enter {
            on_enter();
        }
    }
}

#[derive(Clone)]
pub struct VisibilityTrigger {
    inner: Rc<TriggerInner>,
}

impl VisibilityTrigger {
    /// Starts observing `region`. `on_enter` runs at most once.
    pub fn observe(
        source: &dyn IntersectionSource,
        region: RegionHandle,
        config: VisibilityConfig,
        on_enter: impl FnOnce() + 'static,
    ) -> Self {
        let trigger = Self {
            inner: Rc::new(TriggerInner {
                revealed: signal(false),
                subscription: RefCell::new(None),
                on_enter: RefCell::new(Some(Box::new(on_enter))),
                disposed: Cell::new(false),
            }),
        };
        trigger.register_with_scope();

        if let Err(e) = config.validate() {
            log::warn!("visibility: {e}; revealing immediately");
            trigger.inner.fire();
            return trigger;
        }

        let threshold = config.threshold;
        let weak = Rc::downgrade(&trigger.inner);
        let on_sample: Rc<dyn Fn(f32)> = Rc::new(move |fraction| {
            if fraction >= threshold
                && let Some(inner) = weak.upgrade()
            {
                log::debug!("visibility: region entered at {fraction:.2}");
                inner.fire();
            }
        });

        match source.observe(region, on_sample) {
            Ok(guard) => {
                // The initial sample may already have fired the latch.
                if trigger.inner.revealed.get() || trigger.inner.disposed.get() {
                    guard.run();
                } else {
                    *trigger.inner.subscription.borrow_mut() = Some(guard);
                }
            }
            Err(e) => {
                log::debug!("visibility: {e}; treating region as visible");
                trigger.inner.fire();
            }
        }
        trigger
    }

    /// Trigger that is revealed from the start, for content outside any
    /// observed region.
    pub fn revealed_now() -> Self {
        Self::observe(
            &NoIntersection,
            RegionHandle::default(),
            VisibilityConfig::default(),
            || {},
        )
    }

    pub fn is_revealed(&self) -> bool {
        self.inner.revealed.get()
    }

    pub fn revealed(&self) -> Signal<bool> {
        self.inner.revealed.clone()
    }

    /// Whether samples are still being received.
    pub fn is_observing(&self) -> bool {
        self.inner.subscription.borrow().is_some()
    }

    /// Releases the observation. Safe to call repeatedly; `revealed` keeps its
    /// value.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        let sub = self.inner.subscription.borrow_mut().take();
        if let Some(sub) = sub {
            sub.run();
        }
        self.inner.on_enter.borrow_mut().take();
    }

    fn register_with_scope(&self) {
        if let Some(scope) = current_scope() {
            let this = self.clone();
            scope.add_disposer(move || this.dispose());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let fired = Rc::new(Cell::new(0));
        let f = fired.clone();
        (fired, move || f.set(f.get() + 1))
    }

    #[test]
    fn fires_once_when_threshold_reached() {
        let vp = Viewport::new(1000.0);
        let about = vp.add_region(1500.0, 1000.0);
        let (fired, on_enter) = counter();
        let t = VisibilityTrigger::observe(&vp, about, VisibilityConfig::default(), on_enter);

        assert!(!t.is_revealed());
        vp.set_scroll(700.0); // 20% visible
        assert!(!t.is_revealed());
        vp.set_scroll(800.0); // 30% visible
        assert!(t.is_revealed());
        assert!(!t.is_observing());

        vp.set_scroll(0.0);
        vp.set_scroll(1500.0);
        assert_eq!(fired.get(), 1);
        assert!(t.is_revealed());
    }

    #[test]
    fn initially_visible_region_fires_during_observe() {
        let vp = Viewport::new(800.0);
        let hero = vp.add_region(0.0, 800.0);
        let (fired, on_enter) = counter();
        let t = VisibilityTrigger::observe(&vp, hero, VisibilityConfig::with_threshold(0.2), on_enter);
        assert!(t.is_revealed());
        assert_eq!(fired.get(), 1);
        assert!(!t.is_observing());
    }

    #[test]
    fn unsupported_host_fails_open() {
        let vp = Viewport::new(800.0);
        let far = vp.add_region(5000.0, 100.0);
        let (fired, on_enter) = counter();
        let t = VisibilityTrigger::observe(&NoIntersection, far, VisibilityConfig::default(), on_enter);
        assert!(t.is_revealed());
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn out_of_range_threshold_fails_open() {
        let vp = Viewport::new(800.0);
        let far = vp.add_region(5000.0, 100.0);
        for threshold in [-0.1, 1.5, f32::NAN] {
            let t = VisibilityTrigger::observe(&vp, far, VisibilityConfig { threshold }, || {});
            assert!(t.is_revealed(), "threshold {threshold}");
        }
    }

    #[test]
    fn dispose_before_entry_stops_observation_and_is_idempotent() {
        let vp = Viewport::new(1000.0);
        let r = vp.add_region(2000.0, 500.0);
        let (fired, on_enter) = counter();
        let t = VisibilityTrigger::observe(&vp, r, VisibilityConfig::default(), on_enter);
        t.dispose();
        t.dispose();
        vp.set_scroll(2000.0);
        assert!(!t.is_revealed());
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn scope_unmount_releases_observation() {
        let vp = Viewport::new(1000.0);
        let r = vp.add_region(2000.0, 500.0);
        let scope = Scope::new();
        let t = scope.run(|| VisibilityTrigger::observe(&vp, r, VisibilityConfig::default(), || {}));
        assert!(t.is_observing());
        scope.dispose();
        assert!(!t.is_observing());
        vp.set_scroll(2000.0);
        assert!(!t.is_revealed());
    }

    #[test]
    fn revealed_signal_notifies_subscribers() {
        let vp = Viewport::new(100.0);
        let r = vp.add_region(200.0, 100.0);
        let t = VisibilityTrigger::observe(&vp, r, VisibilityConfig::with_threshold(1.0), || {});
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        t.revealed().subscribe(move |v| s.borrow_mut().push(*v));
        vp.set_scroll(150.0);
        vp.set_scroll(200.0);
        assert_eq!(*seen.borrow(), vec![true]);
    }
}
