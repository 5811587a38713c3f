//! # Device Module
//!
//! Raw sample acquisition from a physical Switch Pro controller.
//!
//! This module handles:
//! - The raw sample shape consumed by the controller core
//! - Folding Linux evdev events into fixed-shape samples
//! - Detecting and opening the controller's event device
//!
//! The core never talks to a device directly; the polling loop in
//! [`crate::driver`] reads samples through [`SampleSource`] and hands them to
//! [`crate::controller::SwitchProController::apply`].

pub mod evdev_source;
pub mod report;

pub use evdev_source::EvdevSource;
pub use report::ReportAccumulator;

use crate::error::Result;

/// One polled input report: six signed axis values and a button bitmask.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawSample {
    /// Axis data as `(x, y)` pairs for the left, right and pad sticks.
    pub axes: Vec<i32>,
    /// One bit per button, see [`crate::controller::button::ButtonId::code`].
    pub buttons: u32,
}

impl RawSample {
    #[must_use]
    pub fn new(axes: Vec<i32>, buttons: u32) -> Self {
        Self { axes, buttons }
    }
}

/// Anything that can produce raw samples, one per call.
#[cfg_attr(test, mockall::automock)]
pub trait SampleSource: Send {
    /// Reads the next raw sample. May block until the device reports.
    ///
    /// # Errors
    ///
    /// Returns a `Device` error if the device cannot be read.
    fn read_sample(&mut self) -> Result<RawSample>;
}
