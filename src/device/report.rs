//! # Report Accumulator Module
//!
//! Folds raw evdev events from the Switch Pro controller into a [`RawSample`].
//!
//! The kernel reports only what changed, so the accumulator keeps the last
//! value of every axis and button and hands out the complete report on demand.
//!
//! ## Axis Codes (EV_ABS)
//!
//! | Axis | evdev Code | Sample Index |
//! |------|------------|--------------|
//! | Left Stick X | ABS_X | 0 |
//! | Left Stick Y | ABS_Y | 1 |
//! | Right Stick X | ABS_RX | 2 |
//! | Right Stick Y | ABS_RY | 3 |
//! | D-Pad X | ABS_HAT0X | 4 |
//! | D-Pad Y | ABS_HAT0Y | 5 |
//!
//! Hat values (-1/0/1) are scaled to ±32767 so the pad travels the same raw
//! range as the sticks. Controllers that report the d-pad as `BTN_DPAD_*`
//! keys are folded into the same two slots.
//!
//! ## Button Codes (EV_KEY)
//!
//! | Button | evdev Code |
//! |--------|------------|
//! | b | BTN_SOUTH |
//! | a | BTN_EAST |
//! | x | BTN_NORTH |
//! | y | BTN_WEST |
//! | l / r | BTN_TL / BTN_TR |
//! | zl / zr | BTN_TL2 / BTN_TR2 |
//! | - / + | BTN_SELECT / BTN_START |
//! | ls / rs | BTN_THUMBL / BTN_THUMBR |
//! | home | BTN_MODE |
//! | capture | BTN_Z |

use evdev::{AbsoluteAxisType, InputEvent, Key};

use super::RawSample;
use crate::controller::button::ButtonId;
use crate::controller::switch_pro::AXIS_COUNT;

/// Raw magnitude of a fully pressed d-pad direction.
pub const HAT_SCALE: i32 = 32_767;

const PAD_X: usize = 4;
const PAD_Y: usize = 5;

/// Accumulates evdev events into the latest complete report.
#[derive(Debug, Clone, Default)]
pub struct ReportAccumulator {
    axes: [i32; AXIS_COUNT],
    buttons: u32,
}

impl ReportAccumulator {
    /// Creates an accumulator with every axis at rest and every button released.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current report.
    #[must_use]
    pub fn sample(&self) -> RawSample {
        RawSample::new(self.axes.to_vec(), self.buttons)
    }

    /// Processes a single evdev input event. Sync and unknown events are ignored.
    pub fn process_event(&mut self, event: &InputEvent) {
        match event.kind() {
            evdev::InputEventKind::AbsAxis(axis) => {
                self.process_axis_event(axis, event.value());
            }
            evdev::InputEventKind::Key(key) => {
                self.process_key_event(key, event.value() != 0);
            }
            _ => {}
        }
    }

    /// Resets all state, e.g. after reconnecting the device.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn process_axis_event(&mut self, axis: AbsoluteAxisType, value: i32) {
        match axis {
            AbsoluteAxisType::ABS_X => self.axes[0] = value,
            AbsoluteAxisType::ABS_Y => self.axes[1] = value,
            AbsoluteAxisType::ABS_RX => self.axes[2] = value,
            AbsoluteAxisType::ABS_RY => self.axes[3] = value,
            AbsoluteAxisType::ABS_HAT0X => self.axes[PAD_X] = value.signum() * HAT_SCALE,
            AbsoluteAxisType::ABS_HAT0Y => self.axes[PAD_Y] = value.signum() * HAT_SCALE,
            _ => {
                // Ignore gyro, accelerometer, etc.
            }
        }
    }

    fn process_key_event(&mut self, key: Key, pressed: bool) {
        let button = match key {
            Key::BTN_SOUTH => ButtonId::B,
            Key::BTN_EAST => ButtonId::A,
            Key::BTN_NORTH => ButtonId::X,
            Key::BTN_WEST => ButtonId::Y,
            Key::BTN_TL => ButtonId::L,
            Key::BTN_TR => ButtonId::R,
            Key::BTN_TL2 => ButtonId::Zl,
            Key::BTN_TR2 => ButtonId::Zr,
            Key::BTN_SELECT => ButtonId::Minus,
            Key::BTN_START => ButtonId::Plus,
            Key::BTN_THUMBL => ButtonId::LeftStick,
            Key::BTN_THUMBR => ButtonId::RightStick,
            Key::BTN_MODE => ButtonId::Home,
            Key::BTN_Z => ButtonId::Capture,

            Key::BTN_DPAD_LEFT => return self.set_dpad(PAD_X, -HAT_SCALE, pressed),
            Key::BTN_DPAD_RIGHT => return self.set_dpad(PAD_X, HAT_SCALE, pressed),
            Key::BTN_DPAD_UP => return self.set_dpad(PAD_Y, -HAT_SCALE, pressed),
            Key::BTN_DPAD_DOWN => return self.set_dpad(PAD_Y, HAT_SCALE, pressed),

            _ => return,
        };

        if pressed {
            self.buttons |= button.code();
        } else {
            self.buttons &= !button.code();
        }
    }

    /// Releasing a direction only recenters the axis if that direction is
    /// still the one held.
    fn set_dpad(&mut self, slot: usize, direction: i32, pressed: bool) {
        if pressed {
            self.axes[slot] = direction;
        } else if self.axes[slot] == direction {
            self.axes[slot] = 0;
        }
    }
}
