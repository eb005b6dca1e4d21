//! Linear stagger timelines and the timer-driven reveal that plays them.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use unveil_core::*;
use web_time::Duration;

use crate::visibility::VisibilityTrigger;

/// Start offset (and optional length) of one item's animation, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub item_index: usize,
    pub delay: f64,
    pub duration: Option<f64>,
}

impl TimelineEntry {
    /// Delay as a schedulable duration; negative offsets start immediately.
    pub fn delay(&self) -> Duration {
        seconds(self.delay)
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration.map(seconds)
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct AnimationTimeline {
    entries: SmallVec<[TimelineEntry; 8]>,
}

/// `entry[i].delay = base_delay + i * increment`.
///
/// Negative increments are accepted; delays then decrease with the index.
pub fn schedule(count: usize, base_delay_secs: f64, increment_secs: f64) -> AnimationTimeline {
    AnimationTimeline {
        entries: (0..count)
            .map(|i| TimelineEntry {
                item_index: i,
                delay: base_delay_secs + i as f64 * increment_secs,
                duration: None,
            })
            .collect(),
    }
}

impl AnimationTimeline {
    /// Timeline with hand-picked `(delay, duration)` pairs, as used for a
    /// hero block whose headline, subtitle and call to action each get their
    /// own timing.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .enumerate()
                .map(|(i, &(delay, duration))| TimelineEntry {
                    item_index: i,
                    delay,
                    duration: Some(duration),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TimelineEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter()
    }

    /// Shifts every delay, e.g. to nest a per-skill stagger under its
    /// category's delay.
    pub fn offset(mut self, secs: f64) -> Self {
        for e in &mut self.entries {
            e.delay += secs;
        }
        self
    }

    pub fn with_duration(mut self, index: usize, secs: f64) -> Self {
        if let Some(e) = self.entries.get_mut(index) {
            e.duration = Some(secs);
        }
        self
    }

    pub fn with_uniform_duration(mut self, secs: f64) -> Self {
        for e in &mut self.entries {
            e.duration = Some(secs);
        }
        self
    }

    /// Time until the last item has finished animating.
    pub fn span(&self) -> Duration {
        self.entries
            .iter()
            .map(|e| e.delay() + e.duration().unwrap_or(Duration::ZERO))
            .max()
            .unwrap_or(Duration::ZERO)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaggerConfig {
    pub base_delay: f64,
    pub increment: f64,
    pub duration: Option<f64>,
}

impl Default for StaggerConfig {
    fn default() -> Self {
        Self {
            base_delay: 0.3,
            increment: 0.1,
            duration: None,
        }
    }
}

impl StaggerConfig {
    pub fn timeline(&self, count: usize) -> AnimationTimeline {
        let t = schedule(count, self.base_delay, self.increment);
        match self.duration {
            Some(d) => t.with_uniform_duration(d),
            None => t,
        }
    }
}

struct RevealInner {
    timeline: AnimationTimeline,
    scheduler: Rc<dyn Scheduler>,
    revealed: Vec<bool>,
    timers: Vec<TimerId>,
    gate: Option<Dispose>,
    started: bool,
    disposed: bool,
}

/// Plays a timeline: item `i` becomes visible `timeline[i].delay` after
/// `start`.
#[derive(Clone)]
pub struct StaggeredReveal {
    inner: Rc<RefCell<RevealInner>>,
    revealed_count: Signal<usize>,
}

impl StaggeredReveal {
    pub fn new(timeline: AnimationTimeline, scheduler: Rc<dyn Scheduler>) -> Self {
        let revealed = vec![false; timeline.len()];
        let this = Self {
            inner: Rc::new(RefCell::new(RevealInner {
                timeline,
                scheduler,
                revealed,
                timers: Vec::new(),
                gate: None,
                started: false,
                disposed: false,
            })),
            revealed_count: signal(0),
        };
        if let Some(scope) = current_scope() {
            let t = this.clone();
            scope.add_disposer(move || t.dispose());
        }
        this
    }

    /// Starts the timeline once `trigger` is revealed (immediately if it
    /// already is).
    pub fn start_on(&self, trigger: &VisibilityTrigger) {
        if trigger.is_revealed() {
            self.start();
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        let count = self.revealed_count.clone();
        let guard = subscription(&trigger.revealed(), move |revealed| {
            if *revealed && let Some(inner) = weak.upgrade() {
                Self::start_inner(&inner, &count);
            }
        });
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            drop(inner);
            guard.run();
        } else if let Some(prev) = inner.gate.replace(guard) {
            prev.run();
        }
    }

    /// Schedules every item. Later calls are ignored.
    pub fn start(&self) {
        Self::start_inner(&self.inner, &self.revealed_count);
    }

    fn start_inner(inner: &Rc<RefCell<RevealInner>>, count: &Signal<usize>) {
        let mut guard = inner.borrow_mut();
        let this = &mut *guard;
        if this.started || this.disposed {
            return;
        }
        this.started = true;
        if let Some(gate) = this.gate.take() {
            gate.run();
        }
        log::debug!("stagger: starting {} items", this.timeline.len());
        for (slot, entry) in this.timeline.entries.iter().enumerate() {
            let weak: Weak<RefCell<RevealInner>> = Rc::downgrade(inner);
            let count = count.clone();
            let id = this.scheduler.schedule(
                entry.delay(),
                Box::new(move || Self::reveal(&weak, &count, slot)),
            );
            this.timers.push(id);
        }
    }

    fn reveal(weak: &Weak<RefCell<RevealInner>>, count: &Signal<usize>, slot: usize) {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let revealed = {
            let mut inner = inner.borrow_mut();
            if inner.disposed {
                return;
            }
            inner.revealed[slot] = true;
            inner.revealed.iter().filter(|r| **r).count()
        };
        count.set(revealed);
    }

    /// Whether the item at `item_index` has started animating.
    pub fn is_revealed(&self, item_index: usize) -> bool {
        let inner = self.inner.borrow();
        inner
            .timeline
            .iter()
            .position(|e| e.item_index == item_index)
            .is_some_and(|slot| inner.revealed[slot])
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed_count.get()
    }

    pub fn revealed_count_signal(&self) -> Signal<usize> {
        self.revealed_count.clone()
    }

    pub fn timeline(&self) -> AnimationTimeline {
        self.inner.borrow().timeline.clone()
    }

    /// Cancels pending reveals. Items already shown stay shown.
    pub fn dispose(&self) {
        let mut guard = self.inner.borrow_mut();
        let this = &mut *guard;
        if this.disposed {
            return;
        }
        this.disposed = true;
        for id in this.timers.drain(..) {
            this.scheduler.cancel(id);
        }
        let gate = this.gate.take();
        drop(guard);
        if let Some(gate) = gate {
            gate.run();
        }
    }
}
