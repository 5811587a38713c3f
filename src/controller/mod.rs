//! # Controller Module
//!
//! Switch Pro controller state model.
//!
//! This module handles:
//! - Auto-calibrating analog sticks to signed percentages
//! - Decoding the raw button bitmask into pressed/released states
//! - Emitting one event per observed stick or button change
//! - Lookup by name and full-state snapshots for diagnostics

pub mod button;
pub mod event;
pub mod stick;
pub mod switch_pro;

pub use button::{Button, ButtonId, ButtonState};
pub use event::{Event, EventQueue, EventReceiver};
pub use stick::{AxisBounds, Stick, StickId};
pub use switch_pro::{ControllerSnapshot, SwitchProController};
