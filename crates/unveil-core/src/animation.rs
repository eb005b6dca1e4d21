use serde::{Deserialize, Serialize};
use web_time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// `1 - (1 - t)^4`, the counters' deceleration curve.
    #[default]
    EaseOutQuart,
}

impl Easing {
    /// Maps linear progress in `[0, 1]` onto the curve. Input is clamped.
    pub fn interpolate(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
        }
    }
}

/// `min(elapsed / duration, 1)`. A zero duration is complete immediately.
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
}

/// Converts configured milliseconds into a `Duration`. Zero, negative and
/// non-finite inputs collapse to `Duration::ZERO`.
pub fn millis(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0.0 {
        // Rounded to whole nanoseconds so integral milliseconds stay exact.
        Duration::from_nanos((ms * 1_000_000.0).round() as u64)
    } else {
        Duration::ZERO
    }
}

/// Same as [`millis`] for configuration expressed in seconds.
pub fn seconds(s: f64) -> Duration {
    if s.is_finite() && s > 0.0 {
        Duration::from_nanos((s * 1_000_000_000.0).round() as u64)
    } else {
        Duration::ZERO
    }
}
