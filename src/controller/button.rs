//! # Button Tracking Module
//!
//! Decodes the raw button bitmask into per-button pressed/released states.
//!
//! ## Button Codes
//!
//! Each button owns one bit of the mask:
//!
//! | Button | Code | Button | Code |
//! |--------|------|--------|------|
//! | capture | 8192 | zr | 128 |
//! | home | 4096 | zl | 64 |
//! | rs (right stick click) | 2048 | r | 32 |
//! | ls (left stick click) | 1024 | l | 16 |
//! | + | 512 | x | 8 |
//! | - | 256 | y | 4 |
//! | | | a | 2 |
//! | | | b | 1 |
//!
//! ## Decoding
//!
//! Buttons are visited from the largest code to the smallest. A button is
//! pressed when the remaining mask is at least its code, in which case the code
//! is subtracted. Because the codes are disjoint powers of two visited high to
//! low, this selects exactly the buttons whose bit is set. Bits above the known
//! codes are masked off first so they can never be mistaken for a button.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{ControllerError, Result};

/// Identity of one of the controller's digital buttons.
///
/// Variants are declared in decode order (largest code first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ButtonId {
    #[serde(rename = "capture")]
    Capture,
    #[serde(rename = "home")]
    Home,
    /// Right stick click.
    #[serde(rename = "rs")]
    RightStick,
    /// Left stick click.
    #[serde(rename = "ls")]
    LeftStick,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "zr")]
    Zr,
    #[serde(rename = "zl")]
    Zl,
    #[serde(rename = "r")]
    R,
    #[serde(rename = "l")]
    L,
    #[serde(rename = "x")]
    X,
    #[serde(rename = "y")]
    Y,
    #[serde(rename = "a")]
    A,
    #[serde(rename = "b")]
    B,
}

impl ButtonId {
    /// Number of buttons on the controller.
    pub const COUNT: usize = 14;

    /// All buttons, largest code first.
    pub const ALL: [ButtonId; Self::COUNT] = [
        ButtonId::Capture,
        ButtonId::Home,
        ButtonId::RightStick,
        ButtonId::LeftStick,
        ButtonId::Plus,
        ButtonId::Minus,
        ButtonId::Zr,
        ButtonId::Zl,
        ButtonId::R,
        ButtonId::L,
        ButtonId::X,
        ButtonId::Y,
        ButtonId::A,
        ButtonId::B,
    ];

    /// Mask covering every known button code.
    pub const KNOWN_MASK: u32 = (1 << Self::COUNT) - 1;

    /// Public name of the button.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ButtonId::Capture => "capture",
            ButtonId::Home => "home",
            ButtonId::RightStick => "rs",
            ButtonId::LeftStick => "ls",
            ButtonId::Plus => "+",
            ButtonId::Minus => "-",
            ButtonId::Zr => "zr",
            ButtonId::Zl => "zl",
            ButtonId::R => "r",
            ButtonId::L => "l",
            ButtonId::X => "x",
            ButtonId::Y => "y",
            ButtonId::A => "a",
            ButtonId::B => "b",
        }
    }

    /// Bit code of the button in the raw mask.
    #[must_use]
    pub fn code(self) -> u32 {
        1 << (Self::COUNT - 1 - self.index())
    }

    /// Slot of this button in the controller's button table.
    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ButtonId {
    type Err = ControllerError;

    /// Parses an exact, case-sensitive button name.
    fn from_str(name: &str) -> Result<Self> {
        ButtonId::ALL
            .into_iter()
            .find(|id| id.name() == name)
            .ok_or_else(|| ControllerError::ButtonNotFound(name.to_string()))
    }
}

/// Binary state of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ButtonState {
    #[default]
    Released,
    Pressed,
}

impl ButtonState {
    /// Returns `1` for pressed and `0` for released.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            ButtonState::Released => 0,
            ButtonState::Pressed => 1,
        }
    }

    #[must_use]
    pub fn is_pressed(self) -> bool {
        self == ButtonState::Pressed
    }
}

impl Serialize for ButtonState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_i32())
    }
}

/// Point-in-time copy of a button's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Button {
    #[serde(rename = "name")]
    pub id: ButtonId,
    pub state: ButtonState,
}

/// Owns the state of every button.
#[derive(Debug, Clone, Default)]
pub struct ButtonTracker {
    states: [ButtonState; ButtonId::COUNT],
}

impl ButtonTracker {
    /// Creates a tracker with every button released.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state of one button.
    #[must_use]
    pub fn state(&self, id: ButtonId) -> ButtonState {
        self.states[id.index()]
    }

    /// Returns a copy of one button.
    #[must_use]
    pub fn snapshot(&self, id: ButtonId) -> Button {
        Button {
            id,
            state: self.state(id),
        }
    }

    /// Returns copies of every button, largest code first.
    #[must_use]
    pub fn snapshot_all(&self) -> Vec<Button> {
        ButtonId::ALL.iter().map(|&id| self.snapshot(id)).collect()
    }

    /// Decodes a raw mask into button states.
    ///
    /// # Returns
    ///
    /// The buttons whose state flipped, in decode order (largest code first).
    ///
    /// # Examples
    ///
    /// ```
    /// use switch_pro_controller::controller::button::{ButtonId, ButtonState, ButtonTracker};
    ///
    /// let mut tracker = ButtonTracker::new();
    /// assert_eq!(tracker.update(2), vec![ButtonId::A]);
    /// assert_eq!(tracker.state(ButtonId::A), ButtonState::Pressed);
    ///
    /// // Unchanged mask flips nothing
    /// assert!(tracker.update(2).is_empty());
    /// ```
    pub fn update(&mut self, mask: u32) -> Vec<ButtonId> {
        let mut remaining = mask & ButtonId::KNOWN_MASK;
        let mut changed = Vec::new();

        for id in ButtonId::ALL {
            let code = id.code();
            let new_state = if remaining >= code {
                remaining -= code;
                ButtonState::Pressed
            } else {
                ButtonState::Released
            };

            let slot = &mut self.states[id.index()];
            if *slot != new_state {
                *slot = new_state;
                changed.push(id);
            }
        }

        changed
    }
}
