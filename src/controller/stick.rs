//! # Stick Tracking Module
//!
//! Converts raw analog stick samples into signed percentage coordinates.
//!
//! ## Auto-Calibration
//!
//! Every axis starts with a symmetric calibration range of ±20000 raw units.
//! Whenever a raw sample falls outside the current range, the range is widened
//! to include it. Ranges never shrink, so the tracker learns the true travel of
//! each stick while it is being used and no manual calibration step is needed.
//! Until a stick has been pushed to its real extremes, readings are compressed.
//!
//! ## Normalization
//!
//! Positive raw values are divided by the positive bound, negative raw values by
//! the negative bound, and zero always maps to zero:
//!
//! | Raw | X | Y |
//! |-----|---|---|
//! | `> 0` | `100 * raw / x_max` | `-100 * raw / y_max` |
//! | `< 0` | `-100 * raw / x_min` | `100 * raw / y_min` |
//! | `0` | `0` | `0` |
//!
//! The Y axis is inverted so that pushing a stick up reads as positive Y.
//! Widening happens before normalization, so the bound used by each branch is
//! always at least the magnitude of the sample and results stay in `[-100, 100]`.
//!
//! ## Usage
//!
//! ```
//! use switch_pro_controller::controller::stick::{StickId, StickTracker};
//!
//! let mut tracker = StickTracker::new(StickId::Left);
//!
//! assert!(tracker.update(10_000.0, 0.0)?);
//! assert_eq!(tracker.snapshot().x, 50.0);
//!
//! // Same sample again: nothing changed
//! assert!(!tracker.update(10_000.0, 0.0)?);
//! # Ok::<(), switch_pro_controller::error::ControllerError>(())
//! ```

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::error::{ControllerError, Result};

/// Default calibration bound, applied symmetrically to every axis.
pub const DEFAULT_PEAK_VALUE: f32 = 20_000.0;

/// Normalized value at full deflection (percent).
pub const FULL_SCALE: f32 = 100.0;

/// Identity of one of the controller's two-axis inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StickId {
    /// Left analog stick.
    Left,
    /// Right analog stick.
    Right,
    /// Directional pad, reported as a hat axis pair.
    Pad,
}

impl StickId {
    /// Number of sticks on the controller.
    pub const COUNT: usize = 3;

    /// All sticks, in the order their axis pairs appear in a raw sample.
    pub const ALL: [StickId; Self::COUNT] = [StickId::Left, StickId::Right, StickId::Pad];

    /// Public name of the stick.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            StickId::Left => "left",
            StickId::Right => "right",
            StickId::Pad => "pad",
        }
    }

    /// Slot of this stick in the controller's stick table.
    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StickId {
    type Err = ControllerError;

    /// Parses an exact, case-sensitive stick name.
    fn from_str(name: &str) -> Result<Self> {
        StickId::ALL
            .into_iter()
            .find(|id| id.name() == name)
            .ok_or_else(|| ControllerError::StickNotFound(name.to_string()))
    }
}

/// Observed raw range of both axes of a stick.
///
/// Invariant: `x_min <= 0 <= x_max` and `y_min <= 0 <= y_max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl AxisBounds {
    /// Creates bounds of `±peak` on both axes.
    #[must_use]
    pub fn symmetric(peak: f32) -> Self {
        let peak = peak.abs();
        Self {
            x_min: -peak,
            x_max: peak,
            y_min: -peak,
            y_max: peak,
        }
    }
}

impl Default for AxisBounds {
    fn default() -> Self {
        Self::symmetric(DEFAULT_PEAK_VALUE)
    }
}

/// Point-in-time copy of a stick's normalized position.
///
/// Both coordinates are in `[-100.0, 100.0]`, with `0.0` at rest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stick {
    #[serde(rename = "name")]
    pub id: StickId,
    pub x: f32,
    pub y: f32,
}

/// Owns the calibration bounds and current position of one stick.
#[derive(Debug, Clone)]
pub struct StickTracker {
    id: StickId,
    bounds: AxisBounds,
    x: f32,
    y: f32,
}

impl StickTracker {
    /// Creates a tracker at rest with the default `±20000` bounds.
    #[must_use]
    pub fn new(id: StickId) -> Self {
        Self::with_peak(id, DEFAULT_PEAK_VALUE)
    }

    /// Creates a tracker at rest with `±peak` bounds on both axes.
    #[must_use]
    pub fn with_peak(id: StickId, peak: f32) -> Self {
        Self {
            id,
            bounds: AxisBounds::symmetric(peak),
            x: 0.0,
            y: 0.0,
        }
    }

    /// Returns the stick identity.
    #[must_use]
    pub fn id(&self) -> StickId {
        self.id
    }

    /// Returns the current calibration bounds.
    #[must_use]
    pub fn bounds(&self) -> AxisBounds {
        self.bounds
    }

    /// Returns a copy of the current position.
    #[must_use]
    pub fn snapshot(&self) -> Stick {
        Stick {
            id: self.id,
            x: self.x,
            y: self.y,
        }
    }

    /// Applies one raw `(x, y)` sample.
    ///
    /// Widens the calibration bounds if needed, then normalizes both axes
    /// against the (possibly widened) bounds.
    ///
    /// # Returns
    ///
    /// `true` if either normalized coordinate differs from the previous one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAxisValue` if either sample is NaN or infinite. The
    /// tracker is left untouched in that case.
    pub fn update(&mut self, raw_x: f32, raw_y: f32) -> Result<bool> {
        self.check_finite('x', raw_x)?;
        self.check_finite('y', raw_y)?;

        self.widen(raw_x, raw_y);

        let new_x = normalize(raw_x, self.bounds.x_min, self.bounds.x_max, FULL_SCALE);
        // Y is inverted: raw up (negative) reads as positive
        let new_y = normalize(raw_y, self.bounds.y_min, self.bounds.y_max, -FULL_SCALE);

        if new_x == self.x && new_y == self.y {
            return Ok(false);
        }

        self.x = new_x;
        self.y = new_y;
        Ok(true)
    }

    fn check_finite(&self, axis: char, value: f32) -> Result<()> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(ControllerError::InvalidAxisValue {
                stick: self.id.name(),
                axis,
                value,
            })
        }
    }

    /// Widens the bounds to include the sample. A value cannot be both below
    /// the minimum and above the maximum, so at most one side moves per axis.
    fn widen(&mut self, raw_x: f32, raw_y: f32) {
        if raw_x < self.bounds.x_min {
            self.bounds.x_min = raw_x;
            info!(stick = %self.id, x_min = raw_x, "Stick peak value changed");
        } else if raw_x > self.bounds.x_max {
            self.bounds.x_max = raw_x;
            info!(stick = %self.id, x_max = raw_x, "Stick peak value changed");
        }

        if raw_y < self.bounds.y_min {
            self.bounds.y_min = raw_y;
            info!(stick = %self.id, y_min = raw_y, "Stick peak value changed");
        } else if raw_y > self.bounds.y_max {
            self.bounds.y_max = raw_y;
            info!(stick = %self.id, y_max = raw_y, "Stick peak value changed");
        }
    }
}

/// Maps a raw value to `[-|scale|, |scale|]` using the bound on its own side
/// of zero. A negative `scale` flips the sign convention.
#[inline]
fn normalize(raw: f32, min: f32, max: f32, scale: f32) -> f32 {
    let limit = scale.abs();
    let value = if raw > 0.0 {
        scale * raw / max
    } else if raw < 0.0 {
        -scale * raw / min
    } else {
        return 0.0;
    };
    // Rounding at a bound of ~2^31 can land one ulp past full scale
    value.clamp(-limit, limit)
}
