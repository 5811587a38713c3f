//! # Switch Pro Controller Module
//!
//! Composition root that owns every stick and button, routes raw samples to
//! the trackers and turns their change signals into queued [`Event`]s.
//!
//! ## Sample Layout
//!
//! | Axis index | Stick | Axis |
//! |------------|-------|------|
//! | 0, 1 | left | x, y |
//! | 2, 3 | right | x, y |
//! | 4, 5 | pad | x, y |
//!
//! The button mask is decoded as described in [`crate::controller::button`].
//!
//! ## Thread Safety
//!
//! All methods take `&self`. Stick and button tables sit behind read/write
//! locks, so the controller can be shared in an `Arc` between the polling
//! thread and any number of readers. Every accessor returns a copy taken under
//! the lock, so a reader never sees `x` from one update and `y` from another.
//!
//! ## Usage
//!
//! ```
//! use switch_pro_controller::controller::{Event, SwitchProController};
//!
//! let controller = SwitchProController::new();
//! let events = controller.events();
//!
//! controller.update_buttons(2);
//! assert_eq!(controller.get_button_state("a")?, 1);
//!
//! match events.try_next() {
//!     Some(Event::Button(button)) => assert_eq!(button.id.name(), "a"),
//!     other => panic!("unexpected event: {:?}", other),
//! }
//! # Ok::<(), switch_pro_controller::error::ControllerError>(())
//! ```

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, warn};

use super::button::{Button, ButtonId, ButtonTracker};
use super::event::{Event, EventQueue, EventReceiver};
use super::stick::{AxisBounds, Stick, StickId, StickTracker, DEFAULT_PEAK_VALUE};
use crate::config::{CalibrationConfig, EventsConfig};
use crate::device::RawSample;
use crate::error::{ControllerError, Result};

/// Number of raw axis values consumed per sample (one pair per stick).
pub const AXIS_COUNT: usize = StickId::COUNT * 2;

/// Full state of the controller at one instant, for diagnostics.
///
/// Calibration bounds are not part of this dump.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerSnapshot {
    pub sticks: Vec<Stick>,
    pub buttons: Vec<Button>,
}

/// Live model of a Switch Pro controller.
#[derive(Debug)]
pub struct SwitchProController {
    sticks: RwLock<[StickTracker; StickId::COUNT]>,
    buttons: RwLock<ButtonTracker>,
    queue: EventQueue,
}

impl Default for SwitchProController {
    fn default() -> Self {
        Self::new()
    }
}

impl SwitchProController {
    /// Creates a controller with default calibration and queue capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&CalibrationConfig::default(), &EventsConfig::default())
    }

    /// Creates a controller from configuration.
    #[must_use]
    pub fn with_config(calibration: &CalibrationConfig, events: &EventsConfig) -> Self {
        let peak = if calibration.peak_value.is_finite() {
            calibration.peak_value
        } else {
            DEFAULT_PEAK_VALUE
        };

        debug!(
            peak,
            queue_capacity = events.queue_capacity,
            "Creating Switch Pro controller"
        );

        Self {
            sticks: RwLock::new(StickId::ALL.map(|id| StickTracker::with_peak(id, peak))),
            buttons: RwLock::new(ButtonTracker::new()),
            queue: EventQueue::new(events.queue_capacity),
        }
    }

    // ==================== Lookup ====================

    /// Returns a copy of the stick with the given name.
    ///
    /// # Errors
    ///
    /// `StickNotFound` if the name is not one of `left`, `right`, `pad`.
    pub fn get_stick(&self, name: &str) -> Result<Stick> {
        Ok(self.stick(name.parse()?))
    }

    /// Returns a copy of a stick.
    #[must_use]
    pub fn stick(&self, id: StickId) -> Stick {
        self.sticks.read()[id.index()].snapshot()
    }

    /// Returns the current calibration bounds of a stick.
    #[must_use]
    pub fn bounds(&self, id: StickId) -> AxisBounds {
        self.sticks.read()[id.index()].bounds()
    }

    /// Returns a copy of the button with the given name.
    ///
    /// # Errors
    ///
    /// `ButtonNotFound` if no button has that exact name.
    pub fn get_button(&self, name: &str) -> Result<Button> {
        Ok(self.button(name.parse()?))
    }

    /// Returns a copy of a button.
    #[must_use]
    pub fn button(&self, id: ButtonId) -> Button {
        self.buttons.read().snapshot(id)
    }

    /// Returns `1` if the named button is pressed, `0` otherwise.
    ///
    /// # Errors
    ///
    /// `ButtonNotFound` if no button has that exact name.
    pub fn get_button_state(&self, name: &str) -> Result<i32> {
        Ok(self.get_button(name)?.state.as_i32())
    }

    // ==================== Updates ====================

    /// Applies one full raw sample: sticks first, then buttons.
    ///
    /// # Errors
    ///
    /// See [`Self::update_sticks`]. Buttons are not touched when the axis
    /// data is rejected.
    pub fn apply(&self, sample: &RawSample) -> Result<()> {
        self.update_sticks(&sample.axes)?;
        self.update_buttons(sample.buttons);
        Ok(())
    }

    /// Applies raw axis data as consecutive `(x, y)` pairs for the left,
    /// right and pad sticks. Values past the sixth are ignored.
    ///
    /// # Errors
    ///
    /// `MalformedSample` if fewer than six values are given. No stick is
    /// updated in that case.
    pub fn update_sticks(&self, axes: &[i32]) -> Result<()> {
        if axes.len() < AXIS_COUNT {
            warn!(
                expected = AXIS_COUNT,
                actual = axes.len(),
                "Rejecting undersized axis sample"
            );
            return Err(ControllerError::MalformedSample {
                expected: AXIS_COUNT,
                actual: axes.len(),
            });
        }

        let mut sticks = self.sticks.write();
        for (tracker, pair) in sticks.iter_mut().zip(axes.chunks_exact(2)) {
            // i32 samples are always finite, so the tracker cannot reject them
            if tracker.update(pair[0] as f32, pair[1] as f32)? {
                self.emit(Event::Stick(tracker.snapshot()));
            }
        }

        Ok(())
    }

    /// Decodes the raw button mask and emits one event per flipped button.
    pub fn update_buttons(&self, mask: u32) {
        let mut buttons = self.buttons.write();
        for id in buttons.update(mask) {
            self.emit(Event::Button(buttons.snapshot(id)));
        }
    }

    // ==================== Events & Diagnostics ====================

    /// Returns a consumer handle for the event queue.
    #[must_use]
    pub fn events(&self) -> EventReceiver {
        self.queue.receiver()
    }

    /// Returns the event queue, e.g. to inspect its drop counter.
    #[must_use]
    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// Returns copies of every stick and button.
    #[must_use]
    pub fn snapshot(&self) -> ControllerSnapshot {
        let sticks = self.sticks.read().iter().map(StickTracker::snapshot).collect();
        let buttons = self.buttons.read().snapshot_all();
        ControllerSnapshot { sticks, buttons }
    }

    /// Renders the full state as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Propagates serialization failures as `Io` errors.
    pub fn display(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.snapshot()).map_err(|e| ControllerError::Io(e.into()))
    }

    fn emit(&self, event: Event) {
        debug!(?event, "Controller state changed");
        self.queue.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::button::ButtonState;
    use std::sync::Arc;

    fn drain(events: &EventReceiver) -> Vec<Event> {
        std::iter::from_fn(|| events.try_next()).collect()
    }

    // ==================== Lookup Tests ====================

    #[test]
    fn test_fresh_controller_at_rest() {
        let controller = SwitchProController::new();

        for id in StickId::ALL {
            let stick = controller.stick(id);
            assert_eq!((stick.x, stick.y), (0.0, 0.0));
            assert_eq!(controller.bounds(id), AxisBounds::symmetric(20_000.0));
        }
        for id in ButtonId::ALL {
            assert_eq!(controller.button(id).state, ButtonState::Released);
        }
    }

    #[test]
    fn test_get_stick_by_name() {
        let controller = SwitchProController::new();
        let stick = controller.get_stick("right").unwrap();
        assert_eq!(stick.id, StickId::Right);
    }

    #[test]
    fn test_get_stick_unknown_name() {
        let controller = SwitchProController::new();
        match controller.get_stick("middle") {
            Err(ControllerError::StickNotFound(name)) => assert_eq!(name, "middle"),
            other => panic!("Expected StickNotFound, got: {:?}", other),
        }
    }

    #[test]
    fn test_get_button_unknown_name_leaves_state() {
        let controller = SwitchProController::new();
        controller.update_buttons(ButtonId::B.code());
        let before = controller.snapshot();

        assert!(matches!(
            controller.get_button("q"),
            Err(ControllerError::ButtonNotFound(_))
        ));
        assert!(controller.get_button_state("q").is_err());
        assert_eq!(controller.snapshot(), before);
    }

    #[test]
    fn test_get_button_state() {
        let controller = SwitchProController::new();
        assert_eq!(controller.get_button_state("a").unwrap(), 0);
        controller.update_buttons(2);
        assert_eq!(controller.get_button_state("a").unwrap(), 1);
        assert_eq!(controller.get_button("a").unwrap().state, ButtonState::Pressed);
    }

    // ==================== Update Scenario Tests ====================

    #[test]
    fn test_zero_sample_on_fresh_controller_emits_nothing() {
        let controller = SwitchProController::new();
        let events = controller.events();

        controller.apply(&RawSample::new(vec![0; 6], 0)).unwrap();
        assert!(drain(&events).is_empty());
    }

    #[test]
    fn test_button_a_press_emits_one_event() {
        let controller = SwitchProController::new();
        let events = controller.events();

        controller.update_buttons(2);

        let emitted = drain(&events);
        assert_eq!(
            emitted,
            vec![Event::Button(Button {
                id: ButtonId::A,
                state: ButtonState::Pressed,
            })]
        );
    }

    #[test]
    fn test_left_stick_peak_then_half() {
        let controller = SwitchProController::new();
        let events = controller.events();

        controller.update_sticks(&[20_000, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(controller.bounds(StickId::Left).x_max, 20_000.0);

        controller.update_sticks(&[10_000, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(controller.bounds(StickId::Left).x_max, 20_000.0);

        let emitted = drain(&events);
        assert_eq!(emitted.len(), 2);
        match (emitted[0], emitted[1]) {
            (Event::Stick(first), Event::Stick(second)) => {
                assert_eq!(first.id, StickId::Left);
                assert_eq!(first.x, 100.0);
                assert_eq!(second.id, StickId::Left);
                assert_eq!(second.x, 50.0);
            }
            other => panic!("Expected two stick events, got: {:?}", other),
        }
    }

    #[test]
    fn test_axis_pairs_routed_to_sticks_in_order() {
        let controller = SwitchProController::new();
        let events = controller.events();

        controller
            .update_sticks(&[0, 0, 20_000, 0, 0, -20_000])
            .unwrap();

        assert_eq!(controller.get_stick("right").unwrap().x, 100.0);
        assert_eq!(controller.get_stick("pad").unwrap().y, 100.0);

        let ids: Vec<_> = drain(&events)
            .into_iter()
            .map(|event| match event {
                Event::Stick(stick) => stick.id,
                Event::Button(button) => panic!("Unexpected button event: {:?}", button),
            })
            .collect();
        assert_eq!(ids, vec![StickId::Right, StickId::Pad]);
    }

    #[test]
    fn test_extra_axis_values_ignored() {
        let controller = SwitchProController::new();
        controller
            .update_sticks(&[0, 0, 0, 0, 0, 0, 32_767, 32_767])
            .unwrap();
        assert!(controller.events().try_next().is_none());
    }

    #[test]
    fn test_undersized_sample_rejected() {
        let controller = SwitchProController::new();
        let events = controller.events();

        match controller.update_sticks(&[20_000, 0, 0]) {
            Err(ControllerError::MalformedSample { expected, actual }) => {
                assert_eq!(expected, 6);
                assert_eq!(actual, 3);
            }
            other => panic!("Expected MalformedSample, got: {:?}", other),
        }

        // Nothing applied, not even the complete first pair
        assert_eq!(controller.stick(StickId::Left).x, 0.0);
        assert!(events.try_next().is_none());
    }

    #[test]
    fn test_apply_skips_buttons_on_malformed_axes() {
        let controller = SwitchProController::new();
        assert!(controller.apply(&RawSample::new(vec![], 2)).is_err());
        assert_eq!(controller.get_button_state("a").unwrap(), 0);
    }

    #[test]
    fn test_sticks_emitted_before_buttons() {
        let controller = SwitchProController::new();
        let events = controller.events();

        controller
            .apply(&RawSample::new(vec![1_000, 0, 0, 0, 0, 0], ButtonId::Home.code()))
            .unwrap();

        let emitted = drain(&events);
        assert!(matches!(emitted[0], Event::Stick(_)));
        assert!(matches!(emitted[1], Event::Button(_)));
    }

    #[test]
    fn test_custom_peak_and_capacity() {
        let controller = SwitchProController::with_config(
            &CalibrationConfig { peak_value: 32_767.0 },
            &EventsConfig { queue_capacity: 1 },
        );

        assert_eq!(controller.bounds(StickId::Pad).y_min, -32_767.0);

        controller.update_buttons(ButtonId::A.code() | ButtonId::B.code());
        assert_eq!(controller.queue().len(), 1);
        assert_eq!(controller.queue().dropped(), 1);
    }

    // ==================== Diagnostics Tests ====================

    #[test]
    fn test_snapshot_contents() {
        let controller = SwitchProController::new();
        controller.update_sticks(&[-10_000, 0, 0, 0, 0, 0]).unwrap();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.sticks.len(), 3);
        assert_eq!(snapshot.buttons.len(), 14);
        assert_eq!(snapshot.sticks[0].x, -50.0);
    }

    #[test]
    fn test_snapshot_does_not_consume_events() {
        let controller = SwitchProController::new();
        controller.update_buttons(1);
        let _ = controller.snapshot();
        assert_eq!(controller.queue().len(), 1);
    }

    #[test]
    fn test_display_excludes_calibration_bounds() {
        let controller = SwitchProController::new();
        controller.update_buttons(ButtonId::Plus.code());

        let json = controller.display().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["sticks"][0]["name"], "left");
        assert_eq!(value["sticks"][0]["x"], 0.0);
        assert_eq!(value["buttons"][4]["name"], "+");
        assert_eq!(value["buttons"][4]["state"], 1);
        assert!(!json.contains("x_max"));
        assert!(!json.contains("min"));
    }

    // ==================== Concurrency Tests ====================

    #[test]
    fn test_readers_see_consistent_pairs() {
        let controller = Arc::new(SwitchProController::with_config(
            &CalibrationConfig::default(),
            &EventsConfig { queue_capacity: 16 },
        ));

        let writer = {
            let controller = Arc::clone(&controller);
            std::thread::spawn(move || {
                for i in 0..2_000 {
                    let v = if i % 2 == 0 { 10_000 } else { -10_000 };
                    // x and y always move together: x = 50 pairs with y = -50
                    controller.update_sticks(&[v, v, 0, 0, 0, 0]).unwrap();
                }
            })
        };

        for _ in 0..2_000 {
            let stick = controller.stick(StickId::Left);
            assert_eq!(stick.x, -stick.y, "Torn read: {:?}", stick);
        }

        writer.join().unwrap();
    }
}
