//! Presentation engines for an animated landing page.
//!
//! Each engine is an `Rc`-shared handle that owns its timers, publishes its
//! state through [`Signal`](unveil_core::Signal)s, and tears itself down on
//! `dispose` or when the enclosing [`Scope`](unveil_core::Scope) is disposed.
//!
//! ```rust
//! use unveil_core::*;
//! use unveil_ui::*;
//! use web_time::Duration;
//!
//! let sched = ManualScheduler::new();
//! let tw = Typewriter::mount(
//!     TypewriterConfig {
//!         looping: false,
//!         ..TypewriterConfig::new(["hi"])
//!     },
//!     sched.clone(),
//!     TypewriterCallbacks::default(),
//! );
//! sched.advance(Duration::from_millis(100));
//! assert_eq!(tw.text().get(), "hi");
//! ```

pub mod counter;
pub mod loading;
pub mod navigation;
pub mod scroll_spy;
pub mod stagger;
pub mod typewriter;
pub mod visibility;

pub use counter::{CounterConfig, CounterState, NumericCounter};
pub use loading::{LoadingConfig, LoadingSequence, LoadingStage};
pub use navigation::{NavItem, NavigationMenu};
pub use scroll_spy::{ScrollSpy, Section, active_index};
pub use stagger::{AnimationTimeline, StaggerConfig, StaggeredReveal, TimelineEntry};
pub use typewriter::{
    Mode, Timings, Transition, Typewriter, TypewriterCallbacks, TypewriterConfig,
    TypewriterEvent, TypewriterState,
};
pub use visibility::{VisibilityConfig, VisibilityTrigger};
