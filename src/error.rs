//! # Error Types
//!
//! Custom error types for the Switch Pro controller using `thiserror`.

use thiserror::Error;

/// Main error type for the controller core and its collaborators
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Lookup by an unknown stick name
    #[error("Stick not found: {0}")]
    StickNotFound(String),

    /// Lookup by an unknown button name
    #[error("Button not found: {0}")]
    ButtonNotFound(String),

    /// Raw sample carries fewer axis values than the controller needs
    #[error("Malformed sample: expected {expected} axis values, got {actual}")]
    MalformedSample { expected: usize, actual: usize },

    /// Raw axis value is NaN or infinite
    #[error("Invalid {axis} value {value} for stick {stick}")]
    InvalidAxisValue {
        stick: &'static str,
        axis: char,
        value: f32,
    },

    /// Device access errors
    #[error("Device error: {0}")]
    Device(String),

    /// No matching input device
    #[error("No controller found (tried: {0})")]
    DeviceNotFound(String),

    /// Polling loop gave up on the device
    #[error("Controller lost after {failures} consecutive read failures")]
    DeviceLost { failures: u32 },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the controller crate
pub type Result<T> = std::result::Result<T, ControllerError>;
