//! Count-up animation for displayed integers.
//!
//! Each animation frame samples `progress = min(elapsed / duration, 1)`, eases
//! it, and shows `floor(eased * target)`. The final frame always shows the
//! target itself.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use unveil_core::*;
use web_time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub target: u64,
    pub duration_ms: f64,
    pub easing: Easing,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            target: 0,
            duration_ms: 2000.0,
            easing: Easing::EaseOutQuart,
        }
    }
}

impl CounterConfig {
    pub fn new(target: u64, duration_ms: f64) -> Self {
        Self {
            target,
            duration_ms,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("duration_ms", self.duration_ms)
    }
}

/// Value shown at `progress` of a run towards `target`.
pub fn sample(target: u64, progress: f64, easing: Easing) -> u64 {
    if progress >= 1.0 || progress.is_nan() {
        return target;
    }
    let eased = easing.interpolate(progress);
    ((eased * target as f64).floor() as u64).min(target)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CounterState {
    pub current: u64,
    pub target: u64,
    pub start_time: Option<Instant>,
    pub elapsed: Duration,
    pub active: bool,
}

impl CounterState {
    pub fn idle() -> Self {
        Self {
            current: 0,
            target: 0,
            start_time: None,
            elapsed: Duration::ZERO,
            active: false,
        }
    }

    pub fn started(target: u64) -> Self {
        Self {
            target,
            active: true,
            ..Self::idle()
        }
    }

    /// Applies one frame observed at `now`. The first frame of a run pins
    /// `start_time`, so it always shows 0.
    pub fn tick(self, now: Instant, duration: Duration, easing: Easing) -> Self {
        if !self.active {
            return self;
        }
        let start = self.start_time.unwrap_or(now);
        let elapsed = now.saturating_duration_since(start);
        let p = progress(elapsed, duration);
        Self {
            current: sample(self.target, p, easing),
            start_time: Some(start),
            elapsed,
            active: p < 1.0,
            ..self
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.active && self.start_time.is_some() && self.current == self.target
    }
}

struct CounterInner {
    state: CounterState,
    config: CounterConfig,
    duration: Duration,
    scheduler: Rc<dyn Scheduler>,
    frame: TimerSlot,
    // Bumped on every start/cancel; frames from older runs are dropped.
    run: u64,
    requested: bool,
    disposed: bool,
}

/// Frame-driven counter. The displayed value is published through
/// [`NumericCounter::value`].
#[derive(Clone)]
pub struct NumericCounter {
    inner: Rc<RefCell<CounterInner>>,
    value: Signal<u64>,
}

impl NumericCounter {
    pub fn new(config: CounterConfig, scheduler: Rc<dyn Scheduler>) -> Self {
        let this = Self {
            inner: Rc::new(RefCell::new(CounterInner {
                state: CounterState::idle(),
                config,
                duration: millis(config.duration_ms),
                scheduler,
                frame: TimerSlot::new(),
                run: 0,
                requested: false,
                disposed: false,
            })),
            value: signal(0),
        };
        if let Some(scope) = current_scope() {
            let c = this.clone();
            scope.add_disposer(move || c.dispose());
        }
        this
    }

    /// Counts from 0 to `target` over `duration_ms`, replacing any run in
    /// flight.
    pub fn start(&self, target: u64, duration_ms: f64) {
        {
            let mut guard = self.inner.borrow_mut();
            let this = &mut *guard;
            if this.disposed {
                return;
            }
            this.config.target = target;
            this.config.duration_ms = duration_ms;
            if let Err(e) = this.config.validate() {
                log::warn!("counter: {e}; completing immediately");
            }
            this.duration = millis(duration_ms);
            this.frame.clear(&*this.scheduler);
            this.run += 1;
            this.requested = true;
            this.state = CounterState::started(target);
            Self::arm_frame(this, Rc::downgrade(&self.inner), self.value.clone());
        }
        self.value.set_if_changed(0);
    }

    /// Mirrors a "start animation" flag: `true` starts a run with the
    /// configured target unless one is already running or finished (a
    /// cancelled run starts over), `false` cancels and resets the display
    /// to 0.
    pub fn set_active(&self, active: bool) {
        let (requested, stalled, config) = {
            let inner = self.inner.borrow();
            let stalled = !inner.state.active && !inner.state.is_complete();
            (inner.requested, stalled, inner.config)
        };
        match (active, requested) {
            (true, false) => self.start(config.target, config.duration_ms),
            (true, true) if stalled => self.start(config.target, config.duration_ms),
            (false, true) => self.reset(),
            _ => {}
        }
    }

    /// Changes the target. A requested run restarts from 0 towards it.
    pub fn set_target(&self, target: u64) {
        let (requested, config) = {
            let mut inner = self.inner.borrow_mut();
            if inner.config.target == target {
                return;
            }
            inner.config.target = target;
            (inner.requested, inner.config)
        };
        if requested {
            self.start(target, config.duration_ms);
        }
    }

    /// Stops pending frames. The displayed value stays where it was.
    pub fn cancel(&self) {
        let mut guard = self.inner.borrow_mut();
        let this = &mut *guard;
        this.frame.clear(&*this.scheduler);
        this.run += 1;
        this.state.active = false;
    }

    fn reset(&self) {
        {
            let mut guard = self.inner.borrow_mut();
            let this = &mut *guard;
            if this.disposed {
                return;
            }
            this.frame.clear(&*this.scheduler);
            this.run += 1;
            this.requested = false;
            this.state = CounterState::idle();
        }
        self.value.set_if_changed(0);
    }

    /// Unmount: no frame runs afterwards and further calls are ignored.
    pub fn dispose(&self) {
        let mut guard = self.inner.borrow_mut();
        let this = &mut *guard;
        if this.disposed {
            return;
        }
        this.disposed = true;
        this.frame.clear(&*this.scheduler);
        this.run += 1;
        this.state.active = false;
    }

    pub fn current(&self) -> u64 {
        self.inner.borrow().state.current
    }

    pub fn target(&self) -> u64 {
        self.inner.borrow().config.target
    }

    pub fn is_active(&self) -> bool {
        self.inner.borrow().state.active
    }

    pub fn state(&self) -> CounterState {
        self.inner.borrow().state
    }

    pub fn value(&self) -> Signal<u64> {
        self.value.clone()
    }

    fn arm_frame(this: &mut CounterInner, weak: Weak<RefCell<CounterInner>>, value: Signal<u64>) {
        let run = this.run;
        let id = this
            .scheduler
            .request_frame(Box::new(move || Self::on_frame(weak, value, run)));
        this.frame.arm(&*this.scheduler, id);
    }

    fn on_frame(weak: Weak<RefCell<CounterInner>>, value: Signal<u64>, run: u64) {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let current = {
            let mut guard = inner.borrow_mut();
            let this = &mut *guard;
            if this.disposed || this.run != run {
                return;
            }
            this.frame.fired();
            let now = this.scheduler.now();
            this.state = this.state.tick(now, this.duration, this.config.easing);
            log::trace!("counter: {} / {}", this.state.current, this.state.target);
            if this.state.active {
                Self::arm_frame(this, weak.clone(), value.clone());
            } else {
                log::debug!("counter: reached {}", this.state.target);
            }
            this.state.current
        };
        value.set_if_changed(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn sample_hits_endpoints_exactly() {
        let e = Easing::EaseOutQuart;
        assert_eq!(sample(100, 0.0, e), 0);
        assert_eq!(sample(100, 1.0, e), 100);
        assert_eq!(sample(100, 0.5, e), 93);
        // eased < 1 just before the end would floor to 99 without the clamp
        assert_eq!(sample(100, 0.999, e), 99);
        for target in [1, 7, 85, 100, 1_000_003] {
            assert_eq!(sample(target, 1.0, e), target);
        }
    }

    #[test]
    fn pure_tick_progression() {
        let t0 = Instant::now();
        let d = Duration::from_millis(1000);
        let s = CounterState::started(100).tick(t0, d, Easing::EaseOutQuart);
        assert_eq!(s.current, 0);
        assert!(s.active);
        let s = s.tick(t0 + Duration::from_millis(500), d, Easing::EaseOutQuart);
        assert_eq!(s.current, 93);
        let s = s.tick(t0 + Duration::from_millis(1200), d, Easing::EaseOutQuart);
        assert_eq!(s.current, 100);
        assert!(!s.active);
        assert!(s.is_complete());
        assert_eq!(s.tick(t0 + Duration::from_secs(9), d, Easing::EaseOutQuart), s);
    }

    #[test]
    fn counts_up_monotonically_to_target() {
        let sched = ManualScheduler::new();
        let counter = NumericCounter::new(CounterConfig::default(), sched.clone());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        counter.value().subscribe(move |v| s.borrow_mut().push(*v));

        counter.start(100, 1000.0);
        sched.advance(FRAME);
        assert_eq!(counter.current(), 0);
        sched.advance(Duration::from_millis(2000));

        assert_eq!(counter.current(), 100);
        assert!(!counter.is_active());
        assert_eq!(sched.pending(), 0);
        let seen = seen.borrow();
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last(), Some(&100));
    }

    #[test]
    fn restart_cancels_previous_run() {
        let sched = ManualScheduler::new();
        let counter = NumericCounter::new(CounterConfig::default(), sched.clone());
        counter.start(1000, 1000.0);
        sched.advance(Duration::from_millis(400));
        counter.start(10, 1000.0);
        assert_eq!(counter.current(), 0);
        assert_eq!(sched.pending(), 1);
        sched.advance(Duration::from_millis(2000));
        assert_eq!(counter.current(), 10);
    }

    #[test]
    fn zero_or_negative_duration_completes_on_first_frame() {
        let sched = ManualScheduler::new();
        let counter = NumericCounter::new(CounterConfig::default(), sched.clone());
        counter.start(42, 0.0);
        sched.advance(FRAME);
        assert_eq!(counter.current(), 42);
        counter.start(7, -50.0);
        sched.advance(FRAME);
        assert_eq!(counter.current(), 7);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn withdrawing_activation_resets_and_drops_stale_frames() {
        let sched = ManualScheduler::new();
        let counter = NumericCounter::new(CounterConfig::new(85, 1500.0), sched.clone());
        counter.set_active(true);
        sched.advance(Duration::from_millis(300));
        assert!(counter.current() > 0);

        counter.set_active(false);
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.value().get(), 0);
        sched.advance(Duration::from_secs(5));
        assert_eq!(counter.current(), 0);

        counter.set_active(true);
        sched.advance(Duration::from_secs(5));
        assert_eq!(counter.current(), 85);
        // still requested, finished: no restart
        counter.set_active(true);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn reactivating_after_cancel_runs_to_target() {
        let sched = ManualScheduler::new();
        let counter = NumericCounter::new(CounterConfig::new(100, 1000.0), sched.clone());
        counter.set_active(true);
        sched.advance(Duration::from_millis(200));
        counter.cancel();
        let frozen = counter.current();
        assert!(frozen > 0 && frozen < 100);
        sched.advance(Duration::from_secs(1));
        assert_eq!(counter.current(), frozen);

        counter.set_active(true);
        assert_eq!(counter.current(), 0);
        sched.advance(Duration::from_secs(5));
        assert_eq!(counter.current(), 100);
        assert!(!counter.is_active());
        assert_eq!(sched.pending(), 0);

        counter.cancel();
        counter.set_active(true);
        assert_eq!(sched.pending(), 0);
        assert_eq!(counter.current(), 100);

        counter.set_active(false);
        assert_eq!(counter.current(), 0);
    }

    #[test]
    fn target_change_restarts_requested_run() {
        let sched = ManualScheduler::new();
        let counter = NumericCounter::new(CounterConfig::new(50, 500.0), sched.clone());
        counter.set_target(60);
        assert_eq!(sched.pending(), 0);
        counter.set_active(true);
        sched.advance(Duration::from_secs(1));
        assert_eq!(counter.current(), 60);
        counter.set_target(70);
        assert_eq!(counter.current(), 0);
        sched.advance(Duration::from_secs(1));
        assert_eq!(counter.current(), 70);
    }

    #[test]
    fn dispose_is_idempotent_and_final() {
        let sched = ManualScheduler::new();
        let counter = NumericCounter::new(CounterConfig::default(), sched.clone());
        counter.start(100, 1000.0);
        sched.advance(Duration::from_millis(100));
        let before = counter.current();
        counter.dispose();
        counter.dispose();
        assert_eq!(sched.pending(), 0);
        counter.start(5, 10.0);
        sched.advance(Duration::from_secs(3));
        assert_eq!(counter.current(), before);
    }

    #[test]
    fn cancel_freezes_value() {
        let sched = ManualScheduler::new();
        let counter = NumericCounter::new(CounterConfig::default(), sched.clone());
        counter.start(100, 1000.0);
        sched.advance(Duration::from_millis(200));
        counter.cancel();
        let frozen = counter.current();
        sched.advance(Duration::from_secs(2));
        assert_eq!(counter.current(), frozen);
        assert!(!counter.is_active());
    }
}
