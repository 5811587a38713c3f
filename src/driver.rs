//! # Polling Driver Module
//!
//! Feeds raw samples from a [`SampleSource`] into a shared
//! [`SwitchProController`] at a fixed cadence.
//!
//! The driver owns the failure policy for the device: individual read errors
//! are logged and retried, and only a run of consecutive failures ends the loop
//! with [`ControllerError::DeviceLost`]. Samples the controller rejects are
//! logged and skipped. Nothing in here exits the process.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//! use switch_pro_controller::config::Config;
//! use switch_pro_controller::controller::SwitchProController;
//! use switch_pro_controller::device::EvdevSource;
//! use switch_pro_controller::driver::Poller;
//!
//! let config = Config::default();
//! let controller = Arc::new(SwitchProController::new());
//! let source = EvdevSource::open(&config.device)?;
//!
//! let poller = Poller::new(source, Arc::clone(&controller), &config.poll);
//! poller.run(Arc::new(AtomicBool::new(false)))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::PollConfig;
use crate::controller::SwitchProController;
use crate::device::SampleSource;
use crate::error::{ControllerError, Result};

/// Counters describing a finished polling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollStats {
    /// Samples read from the source.
    pub samples: u64,
    /// Samples the controller rejected.
    pub rejected: u64,
    /// Failed reads, consecutive or not.
    pub read_failures: u64,
}

/// Blocking polling loop around a sample source.
pub struct Poller<S: SampleSource> {
    source: S,
    controller: Arc<SwitchProController>,
    interval: Duration,
    max_consecutive_failures: u32,
}

impl<S: SampleSource> Poller<S> {
    #[must_use]
    pub fn new(source: S, controller: Arc<SwitchProController>, config: &PollConfig) -> Self {
        Self {
            source,
            controller,
            interval: Duration::from_millis(config.interval_ms),
            max_consecutive_failures: config.max_consecutive_failures.max(1),
        }
    }

    /// Polls until `stop` is set or the source fails too many times in a row.
    ///
    /// Run this on a dedicated thread (e.g. `tokio::task::spawn_blocking`):
    /// reads may block until the device reports.
    ///
    /// # Errors
    ///
    /// Returns `DeviceLost` after `max_consecutive_failures` failed reads in
    /// a row. A successful read resets the count.
    pub fn run(mut self, stop: Arc<AtomicBool>) -> Result<PollStats> {
        let mut stats = PollStats::default();
        let mut consecutive_failures: u32 = 0;

        info!(
            "Polling controller every {}ms",
            self.interval.as_millis()
        );

        while !stop.load(Ordering::Relaxed) {
            match self.source.read_sample() {
                Ok(sample) => {
                    consecutive_failures = 0;
                    stats.samples += 1;

                    if let Err(e) = self.controller.apply(&sample) {
                        stats.rejected += 1;
                        warn!("Skipping sample: {}", e);
                    }
                }
                Err(e) => {
                    consecutive_failures += 1;
                    stats.read_failures += 1;
                    warn!(
                        "Failed to read sample ({}/{}): {}",
                        consecutive_failures, self.max_consecutive_failures, e
                    );

                    if consecutive_failures >= self.max_consecutive_failures {
                        error!("Giving up on controller after {} failed reads", consecutive_failures);
                        return Err(ControllerError::DeviceLost {
                            failures: consecutive_failures,
                        });
                    }
                }
            }

            std::thread::sleep(self.interval);
        }

        debug!(?stats, "Polling stopped");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Event;
    use crate::device::{MockSampleSource, RawSample};

    fn fast_config(max_consecutive_failures: u32) -> PollConfig {
        PollConfig {
            interval_ms: 1,
            max_consecutive_failures,
        }
    }

    /// Sets `stop` once the source has been read `reads` times.
    fn stop_after(stop: &Arc<AtomicBool>, reads: usize, mut source: MockSampleSource) -> MockSampleSource {
        let stop = Arc::clone(stop);
        let mut seen = 0;
        source.expect_read_sample().returning(move || {
            seen += 1;
            if seen >= reads {
                stop.store(true, Ordering::Relaxed);
            }
            Ok(RawSample::new(vec![0; 6], 0))
        });
        source
    }

    #[test]
    fn test_samples_reach_controller() {
        let controller = Arc::new(SwitchProController::new());
        let events = controller.events();
        let stop = Arc::new(AtomicBool::new(false));

        let mut source = MockSampleSource::new();
        let mut sequence = mockall::Sequence::new();
        source
            .expect_read_sample()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|| Ok(RawSample::new(vec![20_000, 0, 0, 0, 0, 0], 2)));
        let source = stop_after(&stop, 1, source);

        let stats = Poller::new(source, Arc::clone(&controller), &fast_config(3))
            .run(stop)
            .unwrap();

        assert_eq!(stats.samples, 2);
        assert_eq!(controller.get_stick("left").unwrap().x, 0.0);
        assert_eq!(controller.get_button_state("a").unwrap(), 0);

        // Press then release for both entities
        let emitted: Vec<_> = std::iter::from_fn(|| events.try_next()).collect();
        assert_eq!(emitted.len(), 4);
        assert!(matches!(emitted[0], Event::Stick(_)));
        assert!(matches!(emitted[1], Event::Button(_)));
    }

    #[test]
    fn test_stop_flag_set_before_run() {
        let controller = Arc::new(SwitchProController::new());
        let mut source = MockSampleSource::new();
        source.expect_read_sample().never();

        let stats = Poller::new(source, controller, &fast_config(3))
            .run(Arc::new(AtomicBool::new(true)))
            .unwrap();
        assert_eq!(stats, PollStats::default());
    }

    #[test]
    fn test_consecutive_failures_lose_device() {
        let controller = Arc::new(SwitchProController::new());
        let mut source = MockSampleSource::new();
        source
            .expect_read_sample()
            .times(3)
            .returning(|| Err(ControllerError::Device("unplugged".to_string())));

        let result = Poller::new(source, controller, &fast_config(3))
            .run(Arc::new(AtomicBool::new(false)));

        match result {
            Err(ControllerError::DeviceLost { failures }) => assert_eq!(failures, 3),
            other => panic!("Expected DeviceLost, got: {:?}", other),
        }
    }

    #[test]
    fn test_success_resets_failure_count() {
        let controller = Arc::new(SwitchProController::new());
        let stop = Arc::new(AtomicBool::new(false));

        let mut source = MockSampleSource::new();
        let mut sequence = mockall::Sequence::new();
        for _ in 0..2 {
            source
                .expect_read_sample()
                .times(1)
                .in_sequence(&mut sequence)
                .returning(|| Err(ControllerError::Device("glitch".to_string())));
            source
                .expect_read_sample()
                .times(1)
                .in_sequence(&mut sequence)
                .returning(|| Ok(RawSample::new(vec![0; 6], 0)));
        }
        let source = stop_after(&stop, 1, source);

        let stats = Poller::new(source, controller, &fast_config(2))
            .run(stop)
            .unwrap();

        assert_eq!(stats.read_failures, 2);
        assert_eq!(stats.samples, 3);
    }

    #[test]
    fn test_malformed_sample_skipped() {
        let controller = Arc::new(SwitchProController::new());
        let stop = Arc::new(AtomicBool::new(false));

        let mut source = MockSampleSource::new();
        let mut sequence = mockall::Sequence::new();
        source
            .expect_read_sample()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|| Ok(RawSample::new(vec![1, 2], 2)));
        let source = stop_after(&stop, 1, source);

        let stats = Poller::new(source, Arc::clone(&controller), &fast_config(1))
            .run(stop)
            .unwrap();

        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.samples, 2);
        assert_eq!(controller.get_button_state("a").unwrap(), 0);
    }
}
