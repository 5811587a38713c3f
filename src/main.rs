//! # Switch Pro Monitor
//!
//! Prints every stick and button change of a connected Nintendo Switch Pro
//! Controller.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Set up logging with tracing subscriber
//!    - Load configuration (first argument, `config/default.toml`, or defaults)
//!    - Open the controller's event device
//!
//! 2. **Main Loop**
//!    - Poll raw samples on a dedicated thread every 10ms
//!    - Log each change event as it arrives
//!    - Dump the full controller state at debug level every few seconds
//!
//! 3. **Shutdown**
//!    - Ctrl+C stops polling and exits
//!    - Losing the controller ends the program with an error
//!
//! Run the application:
//! ```bash
//! RUST_LOG=debug cargo run --release -- config/default.toml
//! ```

use anyhow::Result;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use switch_pro_controller::config::Config;
use switch_pro_controller::controller::{Event, SwitchProController};
use switch_pro_controller::device::EvdevSource;
use switch_pro_controller::driver::Poller;

/// Configuration file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Seconds between full-state dumps
const STATUS_INTERVAL_SECS: u64 = 5;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("Switch Pro Monitor v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = load_config(std::env::args().nth(1).as_deref())?;

    let controller = Arc::new(SwitchProController::with_config(
        &config.calibration,
        &config.events,
    ));

    let source = EvdevSource::open(&config.device)?;
    info!("Controller opened at: {}", source.device_path());

    // Reads block on the device, so polling gets its own thread
    let stop = Arc::new(AtomicBool::new(false));
    let (done_tx, mut done_rx) = oneshot::channel();
    {
        let poller = Poller::new(source, Arc::clone(&controller), &config.poll);
        let stop = Arc::clone(&stop);
        std::thread::spawn(move || {
            let _ = done_tx.send(poller.run(stop));
        });
    }

    let events = controller.events();
    let mut status_interval = interval(Duration::from_secs(STATUS_INTERVAL_SECS));

    info!("Press Ctrl+C to exit");

    loop {
        tokio::select! {
            Some(event) = events.next_async() => log_event(&event),

            _ = status_interval.tick() => {
                match controller.display() {
                    Ok(state) => debug!("Controller state:\n{}", state),
                    Err(e) => warn!("Failed to render controller state: {}", e),
                }
            }

            result = &mut done_rx => {
                match result {
                    Ok(Ok(stats)) => info!("Polling finished: {:?}", stats),
                    Ok(Err(e)) => return Err(e.into()),
                    Err(_) => anyhow::bail!("Polling thread exited unexpectedly"),
                }
                break;
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                stop.store(true, Ordering::Relaxed);
                break;
            }
        }
    }

    info!("Events dropped on full queue: {}", controller.queue().dropped());
    Ok(())
}

/// Loads the configuration from `path`, the default file, or built-in defaults.
fn load_config(path: Option<&str>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            info!("Loading configuration from {}", path);
            Config::load(path)?
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            info!("Loading configuration from {}", DEFAULT_CONFIG_PATH);
            Config::load(DEFAULT_CONFIG_PATH)?
        }
        None => {
            info!("No configuration file, using defaults");
            Config::default()
        }
    };
    Ok(config)
}

fn log_event(event: &Event) {
    match event {
        Event::Stick(stick) => info!("{} - X:{:.1} Y:{:.1}", stick.id, stick.x, stick.y),
        Event::Button(button) => info!("{}:{}", button.id, button.state.as_i32()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_interval_constant() {
        assert_eq!(STATUS_INTERVAL_SECS, 5);
    }

    #[test]
    fn test_load_config_missing_explicit_path_fails() {
        assert!(load_config(Some("/nonexistent/switch-pro.toml")).is_err());
    }

    #[test]
    fn test_shipped_default_config_is_valid() {
        let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml"))
            .expect("config/default.toml should load");
        assert_eq!(config.poll.interval_ms, 10);
        assert_eq!(config.calibration.peak_value, 20_000.0);
    }
}
