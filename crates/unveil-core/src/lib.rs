//! # Signals, Scopes, and Ticks
//!
//! Unveil drives presentation-only animation state: reveal latches, counters,
//! typewriters, scroll tracking. The core supplies the few pieces every
//! engine shares:
//!
//! - `Signal<T>`: observable value; engines publish each tick through one.
//! - `Dispose` / `Scope`: idempotent cleanup bound to a mount.
//! - `Scheduler`: injectable "run this later" with cancellation.
//! - `Viewport`: explicit registry of page regions plus scroll position.
//!
//! ## Signals
//!
//! ```rust
//! use unveil_core::*;
//!
//! let count = signal(0);
//! count.set(1);
//! count.update(|v| *v += 1);
//! assert_eq!(count.get(), 2);
//! ```
//!
//! ## Scopes and cleanup
//!
//! Anything created inside `Scope::run` that returns a `Dispose` through
//! `effect` is torn down with the scope:
//!
//! ```rust
//! use std::{cell::Cell, rc::Rc};
//! use unveil_core::*;
//!
//! let stopped = Rc::new(Cell::new(false));
//! let scope = Scope::new();
//! scope.run(|| {
//!     let stopped = stopped.clone();
//!     effect(move || on_unmount(move || stopped.set(true)));
//! });
//! scope.dispose();
//! scope.dispose();
//! assert!(stopped.get());
//! ```
//!
//! ## Deterministic time
//!
//! Engines only ever see time through a `Scheduler`. Tests and offline hosts
//! use `ManualScheduler` and call `advance` to move the clock.

pub mod animation;
pub mod effects;
pub mod error;
pub mod prelude;
pub mod region;
pub mod scheduler;
pub mod scope;
pub mod signal;

pub use animation::*;
pub use effects::*;
pub use error::*;
pub use prelude::*;
pub use region::*;
pub use scheduler::*;
pub use signal::*;
