//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{ControllerError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub poll: PollConfig,
}

/// Input device configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    /// Event device path; empty means auto-detect by name
    #[serde(default)]
    pub path: String,

    #[serde(default = "default_name_hint")]
    pub name_hint: String,
}

/// Stick calibration configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CalibrationConfig {
    /// Initial symmetric bound of every axis, in raw units
    #[serde(default = "default_peak_value")]
    pub peak_value: f32,
}

/// Event queue configuration
#[derive(Debug, Deserialize, Clone)]
pub struct EventsConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

/// Polling loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
}

// Default value functions
fn default_name_hint() -> String { "Pro Controller".to_string() }

fn default_peak_value() -> f32 { crate::controller::stick::DEFAULT_PEAK_VALUE }

fn default_queue_capacity() -> usize { crate::controller::event::DEFAULT_QUEUE_CAPACITY }

fn default_interval_ms() -> u64 { 10 }
fn default_max_consecutive_failures() -> u32 { 50 }

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            name_hint: default_name_hint(),
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            peak_value: default_peak_value(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing sections and fields fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use switch_pro_controller::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns `Config` error if parsing or validation fails.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.device.path.is_empty() && self.device.name_hint.is_empty() {
            return Err(invalid("name_hint cannot be empty when device path is not set"));
        }

        if !self.calibration.peak_value.is_finite() || self.calibration.peak_value <= 0.0 {
            return Err(invalid("peak_value must be a finite number greater than 0"));
        }

        if self.events.queue_capacity == 0 || self.events.queue_capacity > 65536 {
            return Err(invalid("queue_capacity must be between 1 and 65536"));
        }

        if self.poll.interval_ms == 0 || self.poll.interval_ms > 1000 {
            return Err(invalid("interval_ms must be between 1 and 1000"));
        }

        if self.poll.max_consecutive_failures == 0 {
            return Err(invalid("max_consecutive_failures must be greater than 0"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> ControllerError {
    ControllerError::Config(toml::de::Error::custom(message))
}
