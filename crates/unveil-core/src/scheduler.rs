//! # Tick scheduling
//!
//! Engines never sleep or poll. They hand a callback to a [`Scheduler`] and
//! keep the returned [`TimerId`] so the callback can be withdrawn later:
//!
//! ```rust
//! use unveil_core::*;
//! use web_time::Duration;
//!
//! let sched = ManualScheduler::new();
//! let hits = signal(0);
//! let id = {
//!     let hits = hits.clone();
//!     sched.schedule(Duration::from_millis(10), Box::new(move || hits.update(|h| *h += 1)))
//! };
//! sched.cancel(id);
//! sched.advance(Duration::from_millis(50));
//! assert_eq!(hits.get(), 0);
//! ```
//!
//! Hosts plug in their own event loop (timers, animation frames); tests and
//! the demo use [`ManualScheduler`], a virtual clock that only moves when
//! `advance` is called.

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use web_time::{Duration, Instant};

new_key_type! {
    /// Cancellation token for a scheduled task. Stale ids are harmless.
    pub struct TimerId;
}

pub type Task = Box<dyn FnOnce()>;

/// 60 Hz, the cadence counters sample at.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub trait Scheduler {
    fn now(&self) -> Instant;

    /// Runs `task` once, `delay` from now. Tasks never run re-entrantly from
    /// inside `schedule`, even with a zero delay.
    fn schedule(&self, delay: Duration, task: Task) -> TimerId;

    /// Withdraws a pending task. Returns false if it already ran or was
    /// cancelled.
    fn cancel(&self, id: TimerId) -> bool;

    fn frame_interval(&self) -> Duration {
        DEFAULT_FRAME_INTERVAL
    }

    /// Schedules `task` for the next animation frame.
    fn request_frame(&self, task: Task) -> TimerId {
        self.schedule(self.frame_interval(), task)
    }
}

struct Pending {
    // None: the delay overflowed the clock, so the task can never fire.
    due: Option<Instant>,
    seq: u64,
    task: Task,
}

struct ManualState {
    now: Instant,
    seq: u64,
    timers: SlotMap<TimerId, Pending>,
}

/// Deterministic scheduler driven by explicit `advance` calls.
pub struct ManualScheduler {
    state: RefCell<ManualState>,
    frame: Duration,
}

impl ManualScheduler {
    pub fn new() -> Rc<Self> {
        Self::with_frame_interval(DEFAULT_FRAME_INTERVAL)
    }

    pub fn with_frame_interval(frame: Duration) -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(ManualState {
                now: Instant::now(),
                seq: 0,
                timers: SlotMap::with_key(),
            }),
            frame,
        })
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Time until the earliest pending task, if any can fire.
    pub fn next_due_in(&self) -> Option<Duration> {
        let state = self.state.borrow();
        state
            .timers
            .values()
            .filter_map(|p| p.due)
            .min()
            .map(|due| due.saturating_duration_since(state.now))
    }

    /// Moves the clock forward by `by`, running every task that falls due on
    /// the way in `(due, scheduling order)`. Tasks scheduled while advancing
    /// run too if they fall due before the end. Returns how many ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = {
            let state = self.state.borrow();
            state.now.checked_add(by).unwrap_or(state.now)
        };
        let mut ran = 0;
        while let Some(task) = self.pop_due(target) {
            task();
            ran += 1;
        }
        let mut state = self.state.borrow_mut();
        if state.now < target {
            state.now = target;
        }
        ran
    }

    /// Jumps from task to task until nothing is pending or `limit` tasks have
    /// run. Returns how many ran.
    pub fn run_until_idle(&self, limit: usize) -> usize {
        let mut ran = 0;
        while ran < limit {
            let Some(wait) = self.next_due_in() else {
                break;
            };
            let target = {
                let state = self.state.borrow();
                state.now.checked_add(wait).unwrap_or(state.now)
            };
            match self.pop_due(target) {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }
        ran
    }

    fn pop_due(&self, target: Instant) -> Option<Task> {
        let mut state = self.state.borrow_mut();
        let (id, due) = state
            .timers
            .iter()
            .filter_map(|(id, p)| p.due.filter(|d| *d <= target).map(|d| (id, d, p.seq)))
            .min_by_key(|(_, due, seq)| (*due, *seq))
            .map(|(id, due, _)| (id, due))?;
        let pending = state.timers.remove(id)?;
        if due > state.now {
            state.now = due;
        }
        Some(pending.task)
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Instant {
        self.state.borrow().now
    }

    fn schedule(&self, delay: Duration, task: Task) -> TimerId {
        let mut state = self.state.borrow_mut();
        let due = state.now.checked_add(delay);
        let seq = state.seq;
        state.seq += 1;
        state.timers.insert(Pending { due, seq, task })
    }

    fn cancel(&self, id: TimerId) -> bool {
        self.state.borrow_mut().timers.remove(id).is_some()
    }

    fn frame_interval(&self) -> Duration {
        self.frame
    }
}

/// Holds at most one pending task and withdraws it on replacement or
/// `clear`. Every engine keeps one of these per timing lane.
#[derive(Default)]
pub struct TimerSlot {
    id: Option<TimerId>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.id.is_some()
    }

    /// Records a freshly scheduled task, cancelling whatever was armed before.
    pub fn arm(&mut self, scheduler: &dyn Scheduler, id: TimerId) {
        if let Some(prev) = self.id.replace(id) {
            scheduler.cancel(prev);
        }
    }

    /// Forgets the armed task without cancelling it; called from inside the
    /// task itself once it is running.
    pub fn fired(&mut self) {
        self.id = None;
    }

    pub fn clear(&mut self, scheduler: &dyn Scheduler) {
        if let Some(id) = self.id.take() {
            scheduler.cancel(id);
        }
    }
}
