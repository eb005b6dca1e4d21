pub use crate::animation::{Easing, millis, progress, seconds};
pub use crate::effects::{Dispose, effect, on_unmount, subscription};
pub use crate::error::{ConfigError, ObserveError};
pub use crate::region::{
    IntersectionSource, NoIntersection, Region, RegionHandle, ScrollSample, Viewport,
};
pub use crate::scheduler::{ManualScheduler, Scheduler, Task, TimerId, TimerSlot};
pub use crate::scope::{Scope, current_scope};
pub use crate::signal::{Signal, signal};
