//! Staged loading screen progress.
//!
//! Every `interval_ms` the next stage's progress and label become current.
//! One interval after the last stage the sequence schedules completion,
//! which fires `on_complete` once after `completion_delay_ms`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use unveil_core::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadingStage {
    pub progress: u8,
    pub label: String,
}

impl LoadingStage {
    pub fn new(progress: u8, label: impl Into<String>) -> Self {
        Self {
            progress: progress.min(100),
            label: label.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    pub stages: Vec<LoadingStage>,
    pub interval_ms: f64,
    pub completion_delay_ms: f64,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            stages: vec![
                LoadingStage::new(20, "Chargement des compétences..."),
                LoadingStage::new(45, "Préparation des projets..."),
                LoadingStage::new(70, "Optimisation de l'expérience..."),
                LoadingStage::new(90, "Finalisation..."),
                LoadingStage::new(100, "Prêt !"),
            ],
            interval_ms: 800.0,
            completion_delay_ms: 800.0,
        }
    }
}

impl LoadingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("interval_ms", self.interval_ms)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Stages { next: usize },
    Completing,
    Done,
}

struct LoadingInner {
    config: LoadingConfig,
    scheduler: Rc<dyn Scheduler>,
    timer: TimerSlot,
    phase: Phase,
    on_complete: Option<Box<dyn FnOnce()>>,
    disposed: bool,
}

#[derive(Clone)]
pub struct LoadingSequence {
    inner: Rc<RefCell<LoadingInner>>,
    progress: Signal<u8>,
    label: Signal<String>,
}

impl LoadingSequence {
    pub fn start(
        config: LoadingConfig,
        scheduler: Rc<dyn Scheduler>,
        on_complete: impl FnOnce() + 'static,
    ) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("loading: {e}; stages will not wait");
        }
        let this = Self {
            inner: Rc::new(RefCell::new(LoadingInner {
                config,
                scheduler,
                timer: TimerSlot::new(),
                phase: Phase::Stages { next: 0 },
                on_complete: Some(Box::new(on_complete)),
                disposed: false,
            })),
            progress: signal(0),
            label: signal(String::new()),
        };
        if let Some(scope) = current_scope() {
            let s = this.clone();
            scope.add_disposer(move || s.dispose());
        }
        {
            let mut guard = this.inner.borrow_mut();
            let interval = millis(guard.config.interval_ms);
            Self::arm(&mut guard, Rc::downgrade(&this.inner), &this, interval);
        }
        this
    }

    fn arm(
        this: &mut LoadingInner,
        weak: Weak<RefCell<LoadingInner>>,
        outputs: &LoadingSequence,
        delay: web_time::Duration,
    ) {
        let progress = outputs.progress.clone();
        let label = outputs.label.clone();
        let id = this.scheduler.schedule(
            delay,
            Box::new(move || Self::on_tick(weak, progress, label)),
        );
        this.timer.arm(&*this.scheduler, id);
    }

    fn on_tick(weak: Weak<RefCell<LoadingInner>>, progress: Signal<u8>, label: Signal<String>) {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let outputs = LoadingSequence {
            inner: inner.clone(),
            progress,
            label,
        };
        let mut guard = inner.borrow_mut();
        if guard.disposed {
            return;
        }
        guard.timer.fired();
        let interval = millis(guard.config.interval_ms);
        match guard.phase {
            Phase::Stages { next } if next < guard.config.stages.len() => {
                let stage = guard.config.stages[next].clone();
                guard.phase = Phase::Stages { next: next + 1 };
                Self::arm(&mut guard, weak, &outputs, interval);
                drop(guard);
                log::debug!("loading: {}% {}", stage.progress, stage.label);
                outputs.progress.set_if_changed(stage.progress);
                outputs.label.set_if_changed(stage.label);
            }
            Phase::Stages { .. } => {
                guard.phase = Phase::Completing;
                let delay = millis(guard.config.completion_delay_ms);
                Self::arm(&mut guard, weak, &outputs, delay);
            }
            Phase::Completing => {
                guard.phase = Phase::Done;
                let on_complete = guard.on_complete.take();
                drop(guard);
                log::debug!("loading: complete");
                if let Some(f) = on_complete {
                    f();
                }
            }
            Phase::Done => {}
        }
    }

    pub fn progress(&self) -> u8 {
        self.progress.get()
    }

    pub fn label(&self) -> String {
        self.label.get()
    }

    pub fn progress_signal(&self) -> Signal<u8> {
        self.progress.clone()
    }

    pub fn is_complete(&self) -> bool {
        self.inner.borrow().phase == Phase::Done
    }

    /// Cancels the remaining stages; `on_complete` will not run.
    pub fn dispose(&self) {
        let mut guard = self.inner.borrow_mut();
        let this = &mut *guard;
        if this.disposed {
            return;
        }
        this.disposed = true;
        this.timer.clear(&*this.scheduler);
        this.on_complete.take();
    }
}
