//! # Evdev Sample Source
//!
//! Detects the Switch Pro controller among the Linux `/dev/input/event*`
//! devices and reads raw samples from it.
//!
//! ## Controller Detection
//!
//! A configured device path is opened directly. Otherwise every event device is
//! scanned in path order and the first one whose name contains the configured
//! hint (default `"Pro Controller"`) is used. The `hid-nintendo` driver names
//! the wired and Bluetooth controller `"Nintendo Switch Pro Controller"`.

use evdev::Device;
use std::path::Path;
use tracing::{debug, info};

use super::{RawSample, ReportAccumulator, SampleSource};
use crate::config::DeviceConfig;
use crate::error::{ControllerError, Result};

/// Directory scanned for event devices.
const INPUT_DIR: &str = "/dev/input";

/// Switch Pro controller handle backed by evdev.
pub struct EvdevSource {
    device: Device,
    device_path: String,
    report: ReportAccumulator,
}

impl std::fmt::Debug for EvdevSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvdevSource")
            .field("device_path", &self.device_path)
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}

impl EvdevSource {
    /// Opens the controller described by the device configuration.
    ///
    /// # Errors
    ///
    /// - `DeviceNotFound`: no device matched the name hint
    /// - `Device`: the configured path could not be opened or `/dev/input`
    ///   could not be read
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use switch_pro_controller::config::DeviceConfig;
    /// use switch_pro_controller::device::EvdevSource;
    ///
    /// let source = EvdevSource::open(&DeviceConfig::default())?;
    /// println!("Connected to controller at: {}", source.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(config: &DeviceConfig) -> Result<Self> {
        if config.path.is_empty() {
            Self::detect(&config.name_hint)
        } else {
            Self::open_path(&config.path)
        }
    }

    /// Opens a specific event device without checking its name.
    ///
    /// # Errors
    ///
    /// Returns `Device` if the path cannot be opened.
    pub fn open_path(path: &str) -> Result<Self> {
        let device = Device::open(path)
            .map_err(|e| ControllerError::Device(format!("Failed to open {}: {}", path, e)))?;

        info!(
            "Opened controller {:?} at: {}",
            device.name().unwrap_or("unknown"),
            path
        );

        Ok(Self::from_device(device, path.to_string()))
    }

    /// Scans `/dev/input` for the first device whose name contains `name_hint`.
    ///
    /// # Errors
    ///
    /// - `Device`: `/dev/input` is missing or unreadable
    /// - `DeviceNotFound`: no device matched
    pub fn detect(name_hint: &str) -> Result<Self> {
        let input_dir = Path::new(INPUT_DIR);

        if !input_dir.exists() {
            return Err(ControllerError::Device(format!(
                "{} directory not found",
                INPUT_DIR
            )));
        }

        let mut entries: Vec<_> = std::fs::read_dir(input_dir)
            .map_err(|e| ControllerError::Device(format!("Failed to read {}: {}", INPUT_DIR, e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                ControllerError::Device(format!("Failed to read directory entry: {}", e))
            })?;

        // Deterministic choice when several controllers are connected
        entries.sort_by_key(|entry| entry.path());

        for entry in entries {
            let path = entry.path();

            let is_event_device = path
                .file_name()
                .map(|name| name.to_string_lossy().starts_with("event"))
                .unwrap_or(false);
            if !is_event_device {
                continue;
            }

            match Device::open(&path) {
                Ok(device) => {
                    let name = device.name().unwrap_or_default().to_string();
                    debug!("Found input device: {} ({:?})", path.display(), name);

                    if name.contains(name_hint) {
                        let device_path = path.to_string_lossy().to_string();
                        info!("Found {} at: {}", name, device_path);
                        return Ok(Self::from_device(device, device_path));
                    }
                }
                Err(e) => {
                    // Permission denied or other errors - skip device
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }

        Err(ControllerError::DeviceNotFound(format!(
            "{}/event* matching {:?}",
            INPUT_DIR, name_hint
        )))
    }

    fn from_device(device: Device, device_path: String) -> Self {
        Self {
            device,
            device_path,
            report: ReportAccumulator::new(),
        }
    }

    /// Returns the `/dev/input/eventX` path of this controller.
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Returns the device name reported by the kernel.
    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }
}

impl SampleSource for EvdevSource {
    /// Waits for the next batch of events and returns the updated report.
    ///
    /// Blocks until the controller reports at least one event.
    fn read_sample(&mut self) -> Result<RawSample> {
        let events = self
            .device
            .fetch_events()
            .map_err(|e| ControllerError::Device(format!("Failed to fetch events: {}", e)))?;

        for event in events {
            self.report.process_event(&event);
        }

        Ok(self.report.sample())
    }
}
