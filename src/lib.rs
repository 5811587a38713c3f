//! # Switch Pro Controller Library
//!
//! Live state model of a Nintendo Switch Pro Controller.
//!
//! This library turns raw polled input reports (six signed axis values and a
//! button bitmask) into auto-calibrated stick positions and button states, and
//! emits an event for every observed change.

pub mod config;
pub mod error;
pub mod controller;
pub mod device;
pub mod driver;
