//! # Typewriter
//!
//! Types a list of phrases one grapheme at a time, pauses, deletes them again
//! and moves on to the next phrase:
//!
//! ```text
//! Typing ──full──▶ PausingAfterType ──pause──▶ Deleting ──empty──▶ PausingAfterDelete
//!    ▲                                                                    │
//!    └──────────────────── next phrase, on_sentence_complete ◀────────────┘
//! ```
//!
//! Without `loop`, the last phrase is a terminal branch: once it is fully
//! typed the machine freezes on the full text and fires `on_complete` once.
//! A single non-looping phrase is therefore typed once and never deleted.
//!
//! [`TypewriterState::advance`] is the pure transition; [`Typewriter`] runs it
//! on a [`Scheduler`] and adds the cosmetic blinking cursor.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use unveil_core::*;
use web_time::Duration;

/// Gap between a phrase being fully deleted and the next one starting.
pub const DELETE_GAP: Duration = Duration::from_millis(500);

/// Half period of the cursor blink.
pub const CURSOR_BLINK: Duration = Duration::from_millis(500);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    pub phrases: Vec<String>,
    /// Milliseconds per grapheme.
    pub typing_speed: f64,
    /// Milliseconds per grapheme; `typing_speed` when unset.
    pub deleting_speed: Option<f64>,
    pub pause_duration: f64,
    pub initial_delay: f64,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub show_cursor: bool,
    pub cursor_character: String,
    pub hide_cursor_while_typing: bool,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            phrases: Vec::new(),
            typing_speed: 50.0,
            deleting_speed: None,
            pause_duration: 2000.0,
            initial_delay: 0.0,
            looping: true,
            show_cursor: true,
            cursor_character: "|".to_string(),
            hide_cursor_while_typing: false,
        }
    }
}

impl TypewriterConfig {
    pub fn new<S: Into<String>>(phrases: impl IntoIterator<Item = S>) -> Self {
        Self {
            phrases: phrases.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.phrases.is_empty() {
            return Err(ConfigError::EmptyPhrases);
        }
        require_positive("typing_speed", self.typing_speed)?;
        if let Some(d) = self.deleting_speed {
            require_positive("deleting_speed", d)?;
        }
        Ok(())
    }

    pub fn timings(&self) -> Timings {
        let typing = millis(self.typing_speed);
        Timings {
            typing,
            deleting: self.deleting_speed.map_or(typing, millis),
            pause: millis(self.pause_duration),
            initial: millis(self.initial_delay),
        }
    }
}

/// Sanitized delays. A zero speed reveals or removes a whole phrase in one
/// tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timings {
    pub typing: Duration,
    pub deleting: Duration,
    pub pause: Duration,
    pub initial: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Typing,
    PausingAfterType,
    Deleting,
    PausingAfterDelete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypewriterEvent {
    /// A phrase was typed, shown and deleted.
    SentenceComplete { phrase: String, index: usize },
    /// The last phrase of a non-looping list is fully typed.
    Complete,
}

/// Outcome of one transition: when to tick again and what to announce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub next: Option<Duration>,
    pub event: Option<TypewriterEvent>,
}

impl Transition {
    fn after(delay: Duration) -> Self {
        Self {
            next: Some(delay),
            event: None,
        }
    }

    fn halt(event: Option<TypewriterEvent>) -> Self {
        Self { next: None, event }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Phrase {
    text: String,
    /// offsets[i] = byte length of the first `i` graphemes
    offsets: Vec<usize>,
}

impl Phrase {
    fn new(text: String) -> Self {
        let mut offsets: Vec<usize> = text.grapheme_indices(true).map(|(i, _)| i).collect();
        offsets.push(text.len());
        Self { text, offsets }
    }

    fn graphemes(&self) -> usize {
        self.offsets.len() - 1
    }

    fn prefix(&self, n: usize) -> &str {
        &self.text[..self.offsets[n.min(self.graphemes())]]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypewriterState {
    phrases: Vec<Phrase>,
    phrase_index: usize,
    char_index: usize,
    mode: Mode,
    looping: bool,
    finished: bool,
}

impl TypewriterState {
    pub fn new<S: AsRef<str>>(phrases: &[S], looping: bool) -> Self {
        Self {
            phrases: phrases
                .iter()
                .map(|p| Phrase::new(p.as_ref().to_string()))
                .collect(),
            phrase_index: 0,
            char_index: 0,
            mode: Mode::Typing,
            looping,
            finished: false,
        }
    }

    pub fn phrase_index(&self) -> usize {
        self.phrase_index
    }

    /// Number of graphemes of the current phrase on screen.
    pub fn char_index(&self) -> usize {
        self.char_index
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_finished(&self) -> bool {
        self.finished || self.phrases.is_empty()
    }

    pub fn visible_text(&self) -> &str {
        self.phrases
            .get(self.phrase_index)
            .map_or("", |p| p.prefix(self.char_index))
    }

    /// Whether the cursor counts as "in motion" for
    /// `hide_cursor_while_typing`.
    pub fn is_moving(&self) -> bool {
        !self.is_finished() && matches!(self.mode, Mode::Typing | Mode::Deleting)
    }

    fn on_final_phrase(&self) -> bool {
        !self.looping && self.phrase_index + 1 >= self.phrases.len()
    }

    /// Runs one tick of the machine.
    pub fn advance(&mut self, timings: &Timings) -> Transition {
        if self.is_finished() {
            return Transition::halt(None);
        }
        let len = self.phrases[self.phrase_index].graphemes();
        match self.mode {
            Mode::Typing => {
                if timings.typing.is_zero() {
                    self.char_index = len;
                } else if self.char_index < len {
                    self.char_index += 1;
                }
                if self.char_index < len {
                    return Transition::after(timings.typing);
                }
                if self.on_final_phrase() {
                    self.finished = true;
                    return Transition::halt(Some(TypewriterEvent::Complete));
                }
                self.mode = Mode::PausingAfterType;
                Transition::after(timings.pause)
            }
            Mode::PausingAfterType => {
                if self.on_final_phrase() {
                    self.finished = true;
                    return Transition::halt(None);
                }
                self.mode = Mode::Deleting;
                Transition::after(timings.deleting)
            }
            Mode::Deleting => {
                if timings.deleting.is_zero() {
                    self.char_index = 0;
                } else {
                    self.char_index = self.char_index.saturating_sub(1);
                }
                if self.char_index > 0 {
                    return Transition::after(timings.deleting);
                }
                self.mode = Mode::PausingAfterDelete;
                Transition::after(DELETE_GAP)
            }
            Mode::PausingAfterDelete => {
                let index = self.phrase_index;
                let phrase = self.phrases[index].text.clone();
                self.phrase_index = (index + 1) % self.phrases.len();
                self.char_index = 0;
                self.mode = Mode::Typing;
                Transition {
                    next: Some(timings.typing),
                    event: Some(TypewriterEvent::SentenceComplete { phrase, index }),
                }
            }
        }
    }
}

type SentenceCallback = Rc<dyn Fn(&str, usize)>;
type CompleteCallback = Rc<dyn Fn()>;

#[derive(Default, Clone)]
pub struct TypewriterCallbacks {
    on_sentence_complete: Option<SentenceCallback>,
    on_complete: Option<CompleteCallback>,
}

impl TypewriterCallbacks {
    pub fn on_sentence_complete(mut self, f: impl Fn(&str, usize) + 'static) -> Self {
        self.on_sentence_complete = Some(Rc::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl Fn() + 'static) -> Self {
        self.on_complete = Some(Rc::new(f));
        self
    }
}

struct TypewriterInner {
    state: TypewriterState,
    config: TypewriterConfig,
    timings: Timings,
    scheduler: Rc<dyn Scheduler>,
    callbacks: TypewriterCallbacks,
    step: TimerSlot,
    blink: TimerSlot,
    blink_phase: bool,
    // Bumped whenever the machine restarts; older ticks are dropped.
    run: u64,
    disposed: bool,
}

impl TypewriterInner {
    fn cursor_visible(&self) -> bool {
        self.config.show_cursor
            && self.blink_phase
            && !(self.config.hide_cursor_while_typing && self.state.is_moving())
    }
}

/// Scheduler-driven typewriter. Revealed text and cursor visibility are
/// published through [`Typewriter::text`] and [`Typewriter::cursor`].
#[derive(Clone)]
pub struct Typewriter {
    inner: Rc<RefCell<TypewriterInner>>,
    text: Signal<String>,
    cursor: Signal<bool>,
}

impl Typewriter {
    pub fn mount(
        config: TypewriterConfig,
        scheduler: Rc<dyn Scheduler>,
        callbacks: TypewriterCallbacks,
    ) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("typewriter: {e}; using sanitized settings");
        }
        let show_cursor = config.show_cursor;
        let this = Self {
            inner: Rc::new(RefCell::new(TypewriterInner {
                state: TypewriterState::new(&config.phrases, config.looping),
                timings: config.timings(),
                config,
                scheduler,
                callbacks,
                step: TimerSlot::new(),
                blink: TimerSlot::new(),
                blink_phase: true,
                run: 0,
                disposed: false,
            })),
            text: signal(String::new()),
            cursor: signal(show_cursor),
        };
        if let Some(scope) = current_scope() {
            let t = this.clone();
            scope.add_disposer(move || t.dispose());
        }
        this.restart();
        this
    }

    /// Replaces the phrase list and starts over, initial delay included.
    pub fn set_phrases<S: Into<String>>(&self, phrases: impl IntoIterator<Item = S>) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.disposed {
                return;
            }
            inner.config.phrases = phrases.into_iter().map(Into::into).collect();
            if inner.config.phrases.is_empty() {
                log::warn!("typewriter: {}; nothing to type", ConfigError::EmptyPhrases);
            }
            let state = TypewriterState::new(&inner.config.phrases, inner.config.looping);
            inner.state = state;
        }
        self.restart();
    }

    fn restart(&self) {
        {
            let mut guard = self.inner.borrow_mut();
            let this = &mut *guard;
            if this.disposed {
                return;
            }
            this.step.clear(&*this.scheduler);
            this.blink.clear(&*this.scheduler);
            this.run += 1;
            this.blink_phase = true;
            let weak = Rc::downgrade(&self.inner);
            if !this.state.is_finished() {
                let delay = this.timings.initial + this.timings.typing;
                Self::arm_step(this, weak.clone(), self.text.clone(), self.cursor.clone(), delay);
            }
            if this.config.show_cursor {
                Self::arm_blink(this, weak, self.cursor.clone());
            }
        }
        self.publish();
    }

    fn arm_step(
        this: &mut TypewriterInner,
        weak: Weak<RefCell<TypewriterInner>>,
        text: Signal<String>,
        cursor: Signal<bool>,
        delay: Duration,
    ) {
        let run = this.run;
        let id = this.scheduler.schedule(
            delay,
            Box::new(move || Self::on_step(weak, text, cursor, run)),
        );
        this.step.arm(&*this.scheduler, id);
    }

    fn arm_blink(this: &mut TypewriterInner, weak: Weak<RefCell<TypewriterInner>>, cursor: Signal<bool>) {
        let run = this.run;
        let id = this
            .scheduler
            .schedule(CURSOR_BLINK, Box::new(move || Self::on_blink(weak, cursor, run)));
        this.blink.arm(&*this.scheduler, id);
    }

    fn on_step(weak: Weak<RefCell<TypewriterInner>>, text: Signal<String>, cursor: Signal<bool>, run: u64) {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let (event, visible, cursor_visible, callbacks) = {
            let mut guard = inner.borrow_mut();
            let this = &mut *guard;
            if this.disposed || this.run != run {
                return;
            }
            this.step.fired();
            let transition = this.state.advance(&this.timings);
            log::trace!(
                "typewriter: {:?} {:?} -> next {:?}",
                this.state.mode(),
                this.state.visible_text(),
                transition.next
            );
            if let Some(delay) = transition.next {
                Self::arm_step(this, weak.clone(), text.clone(), cursor.clone(), delay);
            }
            (
                transition.event,
                this.state.visible_text().to_string(),
                this.cursor_visible(),
                this.callbacks.clone(),
            )
        };
        text.set_if_changed(visible);
        cursor.set_if_changed(cursor_visible);
        match event {
            Some(TypewriterEvent::SentenceComplete { phrase, index }) => {
                log::debug!("typewriter: finished phrase {index}");
                if let Some(f) = callbacks.on_sentence_complete {
                    f(&phrase, index);
                }
            }
            Some(TypewriterEvent::Complete) => {
                log::debug!("typewriter: complete");
                if let Some(f) = callbacks.on_complete {
                    f();
                }
            }
            None => {}
        }
    }

    fn on_blink(weak: Weak<RefCell<TypewriterInner>>, cursor: Signal<bool>, run: u64) {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let visible = {
            let mut guard = inner.borrow_mut();
            let this = &mut *guard;
            if this.disposed || this.run != run {
                return;
            }
            this.blink.fired();
            this.blink_phase = !this.blink_phase;
            Self::arm_blink(this, weak.clone(), cursor.clone());
            this.cursor_visible()
        };
        cursor.set_if_changed(visible);
    }

    fn publish(&self) {
        let (visible, cursor_visible) = {
            let inner = self.inner.borrow();
            (inner.state.visible_text().to_string(), inner.cursor_visible())
        };
        self.text.set_if_changed(visible);
        self.cursor.set_if_changed(cursor_visible);
    }

    /// Cancels every pending tick. Safe to call repeatedly.
    pub fn dispose(&self) {
        let mut guard = self.inner.borrow_mut();
        let this = &mut *guard;
        if this.disposed {
            return;
        }
        this.disposed = true;
        this.run += 1;
        this.step.clear(&*this.scheduler);
        this.blink.clear(&*this.scheduler);
    }

    pub fn text(&self) -> Signal<String> {
        self.text.clone()
    }

    pub fn cursor(&self) -> Signal<bool> {
        self.cursor.clone()
    }

    /// Revealed text followed by the cursor character when it is showing.
    pub fn display(&self) -> String {
        let inner = self.inner.borrow();
        let mut out = inner.state.visible_text().to_string();
        if inner.cursor_visible() {
            out.push_str(&inner.config.cursor_character);
        }
        out
    }

    pub fn mode(&self) -> Mode {
        self.inner.borrow().state.mode()
    }

    pub fn phrase_index(&self) -> usize {
        self.inner.borrow().state.phrase_index()
    }

    pub fn char_index(&self) -> usize {
        self.inner.borrow().state.char_index()
    }

    pub fn is_finished(&self) -> bool {
        self.inner.borrow().state.is_finished()
    }

    pub fn state(&self) -> TypewriterState {
        self.inner.borrow().state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    fn quiet(phrases: &[&str], looping: bool) -> TypewriterConfig {
        TypewriterConfig {
            typing_speed: 100.0,
            deleting_speed: Some(50.0),
            pause_duration: 1000.0,
            looping,
            show_cursor: false,
            ..TypewriterConfig::new(phrases.iter().copied())
        }
    }

    fn transcript(tw: &Typewriter) -> Rc<RefCell<Vec<String>>> {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let f = frames.clone();
        tw.text().subscribe(move |t| f.borrow_mut().push(t.clone()));
        frames
    }

    #[test]
    fn pure_machine_single_phrase_freezes() {
        let timings = quiet(&["Hi"], false).timings();
        let mut st = TypewriterState::new(&["Hi"], false);
        assert_eq!(st.advance(&timings), Transition::after(timings.typing));
        assert_eq!(st.visible_text(), "H");
        assert_eq!(
            st.advance(&timings),
            Transition::halt(Some(TypewriterEvent::Complete))
        );
        assert_eq!(st.visible_text(), "Hi");
        for _ in 0..5 {
            assert_eq!(st.advance(&timings), Transition::halt(None));
        }
        assert_eq!(st.mode(), Mode::Typing);
        assert_eq!(st.visible_text(), "Hi");
    }

    #[test]
    fn pure_machine_walks_all_modes() {
        let timings = quiet(&["ab", "c"], true).timings();
        let mut st = TypewriterState::new(&["ab", "c"], true);
        st.advance(&timings);
        assert_eq!(st.advance(&timings), Transition::after(timings.pause));
        assert_eq!(st.mode(), Mode::PausingAfterType);
        assert_eq!(st.advance(&timings), Transition::after(timings.deleting));
        assert_eq!(st.mode(), Mode::Deleting);
        st.advance(&timings);
        assert_eq!(st.visible_text(), "a");
        assert_eq!(st.advance(&timings), Transition::after(DELETE_GAP));
        assert_eq!(st.mode(), Mode::PausingAfterDelete);
        assert_eq!(
            st.advance(&timings).event,
            Some(TypewriterEvent::SentenceComplete {
                phrase: "ab".into(),
                index: 0
            })
        );
        assert_eq!((st.phrase_index(), st.char_index(), st.mode()), (1, 0, Mode::Typing));
    }

    #[test]
    fn single_phrase_without_loop_types_once_and_completes_once() {
        let sched = ManualScheduler::new();
        let completes = Rc::new(Cell::new(0));
        let c = completes.clone();
        let tw = Typewriter::mount(
            quiet(&["Hi"], false),
            sched.clone(),
            TypewriterCallbacks::default().on_complete(move || c.set(c.get() + 1)),
        );
        let frames = transcript(&tw);
        sched.advance(Duration::from_secs(60));
        assert_eq!(*frames.borrow(), vec!["H", "Hi"]);
        assert_eq!(tw.text().get(), "Hi");
        assert!(tw.is_finished());
        assert_eq!(completes.get(), 1);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn looping_cycles_phrases_in_order() {
        let sched = ManualScheduler::new();
        let finished = Rc::new(RefCell::new(Vec::new()));
        let f = finished.clone();
        let tw = Typewriter::mount(
            quiet(&["A", "B"], true),
            sched.clone(),
            TypewriterCallbacks::default()
                .on_sentence_complete(move |p, i| f.borrow_mut().push((p.to_string(), i))),
        );
        let mut indices = Vec::new();
        for _ in 0..80 {
            sched.advance(Duration::from_millis(50));
            if indices.last() != Some(&tw.phrase_index()) {
                indices.push(tw.phrase_index());
            }
        }
        // one phrase cycle: type 100 + pause 1000 + delete 50 + gap 500
        sched.advance(Duration::from_millis(1650 * 4));
        assert_eq!(&indices[..3], &[0, 1, 0]);
        let finished = finished.borrow();
        assert!(finished.len() >= 5);
        for (k, (phrase, index)) in finished.iter().enumerate() {
            assert_eq!(*index, k % 2);
            assert_eq!(phrase, if k % 2 == 0 { "A" } else { "B" });
        }
    }

    #[test]
    fn typing_transcript() {
        let sched = ManualScheduler::new();
        let tw = Typewriter::mount(quiet(&["ab", "c"], false), sched.clone(), Default::default());
        let frames = transcript(&tw);
        sched.advance(Duration::from_secs(30));
        insta::assert_snapshot!(frames.borrow().join(" / "), @r#"a / ab / a /  / c"#);
    }

    #[test]
    fn initial_delay_keeps_machine_inert() {
        let sched = ManualScheduler::new();
        let cfg = TypewriterConfig {
            initial_delay: 500.0,
            ..quiet(&["Salut"], false)
        };
        let tw = Typewriter::mount(cfg, sched.clone(), Default::default());
        sched.advance(Duration::from_millis(599));
        assert_eq!(tw.text().get(), "");
        sched.advance(Duration::from_millis(1));
        assert_eq!(tw.text().get(), "S");
    }

    #[test]
    fn graphemes_are_typed_whole() {
        let sched = ManualScheduler::new();
        let tw = Typewriter::mount(quiet(&["é👍🏽!"], false), sched.clone(), Default::default());
        let frames = transcript(&tw);
        sched.advance(Duration::from_secs(5));
        assert_eq!(*frames.borrow(), vec!["é", "é👍🏽", "é👍🏽!"]);
    }

    #[test]
    fn zero_speeds_complete_phrases_in_one_tick() {
        let sched = ManualScheduler::new();
        let cfg = TypewriterConfig {
            typing_speed: 0.0,
            deleting_speed: Some(-5.0),
            pause_duration: 0.0,
            ..quiet(&["Développeur", "Créateur"], true)
        };
        let tw = Typewriter::mount(cfg, sched.clone(), Default::default());
        let frames = transcript(&tw);
        sched.advance(Duration::from_millis(1200));
        assert_eq!(
            *frames.borrow(),
            vec!["Développeur", "", "Créateur", "", "Développeur", ""]
        );
    }

    #[test]
    fn empty_phrase_list_is_already_complete() {
        let sched = ManualScheduler::new();
        let done = Rc::new(Cell::new(false));
        let d = done.clone();
        let tw = Typewriter::mount(
            TypewriterConfig {
                show_cursor: false,
                ..TypewriterConfig::default()
            },
            sched.clone(),
            TypewriterCallbacks::default().on_complete(move || d.set(true)),
        );
        assert!(tw.is_finished());
        assert_eq!(sched.pending(), 0);
        sched.advance(Duration::from_secs(1));
        assert_eq!(tw.display(), "");
        assert!(!done.get());
    }

    #[test]
    fn cursor_blinks_independently_and_hides_while_typing() {
        let sched = ManualScheduler::new();
        let cfg = TypewriterConfig {
            show_cursor: true,
            cursor_character: "_".into(),
            ..quiet(&["ok"], false)
        };
        let tw = Typewriter::mount(cfg, sched.clone(), Default::default());
        assert_eq!(tw.display(), "_");
        sched.advance(Duration::from_millis(500));
        assert_eq!(tw.display(), "ok");
        sched.advance(Duration::from_millis(500));
        assert_eq!(tw.display(), "ok_");
        assert!(tw.is_finished());

        let cfg = TypewriterConfig {
            show_cursor: true,
            hide_cursor_while_typing: true,
            ..quiet(&["hello"], false)
        };
        let tw = Typewriter::mount(cfg, sched.clone(), Default::default());
        sched.advance(Duration::from_millis(100));
        assert!(!tw.cursor().get());
        sched.advance(Duration::from_millis(400));
        assert_eq!(tw.text().get(), "hello");
        assert!(!tw.cursor().get()); // blink phase is off at 500ms
        sched.advance(Duration::from_millis(500));
        assert!(tw.cursor().get());
    }

    #[test]
    fn set_phrases_restarts_and_cancels_old_ticks() {
        let sched = ManualScheduler::new();
        let tw = Typewriter::mount(quiet(&["first"], true), sched.clone(), Default::default());
        sched.advance(Duration::from_millis(300));
        assert_eq!(tw.text().get(), "fir");
        tw.set_phrases(["xy"]);
        assert_eq!(tw.text().get(), "");
        assert_eq!(sched.pending(), 1);
        sched.advance(Duration::from_millis(200));
        assert_eq!(tw.text().get(), "xy");
        assert_eq!(tw.phrase_index(), 0);
    }

    #[test]
    fn dispose_stops_everything_and_is_idempotent() {
        let sched = ManualScheduler::new();
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let cfg = TypewriterConfig {
            show_cursor: true,
            ..quiet(&["a", "b"], true)
        };
        let tw = Typewriter::mount(
            cfg,
            sched.clone(),
            TypewriterCallbacks::default().on_sentence_complete(move |_, _| c.set(c.get() + 1)),
        );
        sched.advance(Duration::from_millis(150));
        let snapshot = tw.state();
        let cursor = tw.cursor().get();
        tw.dispose();
        tw.dispose();
        assert_eq!(sched.pending(), 0);
        sched.advance(Duration::from_secs(30));
        assert_eq!(tw.state(), snapshot);
        assert_eq!(tw.cursor().get(), cursor);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn config_from_json_uses_defaults() {
        let cfg: TypewriterConfig =
            serde_json::from_str(r#"{"phrases":["Hi"],"loop":false,"typing_speed":120}"#).unwrap();
        assert!(!cfg.looping);
        assert_eq!(cfg.cursor_character, "|");
        assert_eq!(cfg.timings().deleting, Duration::from_millis(120));
        assert!(cfg.validate().is_ok());
        assert!(matches!(
            TypewriterConfig::default().validate(),
            Err(ConfigError::EmptyPhrases)
        ));
    }
}
