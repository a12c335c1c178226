//! Unified shared state between the tick loop and its observers.
//!
//! `SharedBathState` wraps the single [`BathController`] and the snapshot it
//! publishes at each tick boundary. The tick loop is the only writer; the
//! display and telemetry services are read-only observers that clone the
//! published snapshot on their own cadence.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rs_sousvide::services::SharedBathState;
//!
//! let state = Arc::new(SharedBathState::new(controller));
//!
//! // Tick loop advances the controller and publishes the result
//! let now_ms = state.now_ms();
//! let snap = state.with_controller(|c| c.tick(event, sample))?;
//! state.publish_snapshot(snap);
//!
//! // Observers read the published snapshot
//! let snapshot = state.snapshot();
//!
//! // Change detection for telemetry publishing
//! if let Some(changed) = state.check_changes() {
//!     // Publish changed snapshot
//! }
//! ```

use std::sync::Mutex;
use std::time::Instant;

use crate::controller::{BathSnapshot, ControllerState};
use crate::traits::{Buzzer, HeaterSwitch};
use crate::BathController;

// ============================================================================
// Snapshot Provider Trait
// ============================================================================

/// Trait for providing read-only bath state access.
///
/// This is the whole surface observers get: a tick-boundary snapshot and a
/// shared time base. There is deliberately no mutation path, the adapters
/// never command the controller.
pub trait SnapshotProvider: Send + Sync {
    /// Get the most recently published snapshot.
    fn snapshot(&self) -> BathSnapshot;

    /// Get the current timestamp in milliseconds.
    fn now_ms(&self) -> u64;
}

// ============================================================================
// Change Detection
// ============================================================================

/// Tracks last published values for change detection (telemetry publishing)
#[derive(Clone, Debug)]
pub struct ChangeDetection {
    /// Last published measured temperature
    pub last_measured_c: Option<f32>,
    /// Last published setpoint
    pub last_target_c: f32,
    /// Last published controller state
    pub last_state: ControllerState,
}

impl Default for ChangeDetection {
    fn default() -> Self {
        Self {
            last_measured_c: None,
            last_target_c: 0.0,
            last_state: ControllerState::Idle,
        }
    }
}

/// Temperature deltas below this are treated as unchanged, keeping probe
/// noise out of the telemetry stream.
const MEASURED_EPSILON_C: f32 = 0.05;

fn measured_changed(a: Option<f32>, b: Option<f32>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).abs() > MEASURED_EPSILON_C,
        (None, None) => false,
        _ => true,
    }
}

// ============================================================================
// Shared Bath State
// ============================================================================

/// Shared state between the tick loop and the display/telemetry services.
///
/// # Thread Safety
///
/// - The controller sits behind a `Mutex` held only by the tick loop's
///   brief `with_controller` closures.
/// - The published snapshot has its own lock so observers never contend
///   with a tick in progress; they see the previous tick's snapshot until
///   the new one is stored in a single assignment.
/// - Change detection has a separate lock to keep telemetry publishes off
///   the snapshot path.
pub struct SharedBathState<H: HeaterSwitch, Z: Buzzer> {
    /// The controller - mutable access for the tick loop only
    controller: Mutex<BathController<H, Z>>,

    /// Time when the state was created (shared time base for all services)
    start_time: Instant,

    /// Snapshot published at the last tick boundary
    snapshot: Mutex<BathSnapshot>,

    /// Change detection for telemetry publishing
    change_detection: Mutex<ChangeDetection>,
}

impl<H: HeaterSwitch, Z: Buzzer> SharedBathState<H, Z> {
    /// Create new shared state wrapping a controller.
    ///
    /// The `start_time` is set to `Instant::now()`, which becomes the time
    /// base for all `now_ms()` calls across the tick loop and observers.
    pub fn new(controller: BathController<H, Z>) -> Self {
        let snapshot = controller.snapshot();
        Self {
            controller: Mutex::new(controller),
            start_time: Instant::now(),
            snapshot: Mutex::new(snapshot),
            change_detection: Mutex::new(ChangeDetection::default()),
        }
    }

    /// Get current timestamp in milliseconds since state creation.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Get the start time instant.
    #[inline]
    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    /// Access the controller with a mutable lock.
    ///
    /// Only the tick loop should use this; the closure pattern keeps the
    /// lock from being held across anything but the tick itself.
    pub fn with_controller<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut BathController<H, Z>) -> R,
    {
        let mut guard = self.controller.lock().unwrap();
        f(&mut *guard)
    }

    /// Store the snapshot produced by a finished tick.
    ///
    /// All fields land together in one assignment, so an observer can never
    /// pair this tick's measurement with last tick's state.
    pub fn publish_snapshot(&self, snapshot: BathSnapshot) {
        *self.snapshot.lock().unwrap() = snapshot;
    }

    /// Get the most recently published snapshot.
    pub fn snapshot(&self) -> BathSnapshot {
        *self.snapshot.lock().unwrap()
    }

    /// Check for changes since the last check and update detection state.
    ///
    /// Returns `Some(BathSnapshot)` if the measured temperature, setpoint,
    /// or state changed since the last call, `None` if unchanged. Used by
    /// telemetry to publish only on change.
    pub fn check_changes(&self) -> Option<BathSnapshot> {
        let snapshot = self.snapshot();

        let mut detection = self.change_detection.lock().unwrap();
        let changed = measured_changed(snapshot.measured_c, detection.last_measured_c)
            || snapshot.target_c != detection.last_target_c
            || snapshot.state != detection.last_state;

        if changed {
            detection.last_measured_c = snapshot.measured_c;
            detection.last_target_c = snapshot.target_c;
            detection.last_state = snapshot.state;
            Some(snapshot)
        } else {
            None
        }
    }

    /// Force synchronization of change detection to the current snapshot.
    ///
    /// Call after a forced (heartbeat) publish so the next `check_changes`
    /// does not re-report values that just went out.
    pub fn sync_change_detection(&self) {
        let snapshot = self.snapshot();
        let mut detection = self.change_detection.lock().unwrap();
        detection.last_measured_c = snapshot.measured_c;
        detection.last_target_c = snapshot.target_c;
        detection.last_state = snapshot.state;
    }

    /// Get current change detection values (for debugging/testing).
    pub fn change_detection_state(&self) -> ChangeDetection {
        self.change_detection.lock().unwrap().clone()
    }
}

impl<H, Z> SnapshotProvider for SharedBathState<H, Z>
where
    H: HeaterSwitch + Send,
    Z: Buzzer + Send,
{
    fn snapshot(&self) -> BathSnapshot {
        SharedBathState::snapshot(self)
    }

    fn now_ms(&self) -> u64 {
        SharedBathState::now_ms(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlConfig;
    use crate::hal::{MockBuzzer, MockRelay};
    use crate::input::ButtonEvent;

    fn shared() -> SharedBathState<MockRelay, MockBuzzer> {
        let controller =
            BathController::new(MockRelay::new(), MockBuzzer::new(), ControlConfig::default());
        SharedBathState::new(controller)
    }

    #[test]
    fn snapshot_starts_at_controller_defaults() {
        let state = shared();
        let snap = state.snapshot();
        assert_eq!(snap.state, ControllerState::Idle);
        assert_eq!(snap.target_c, 60.0);
        assert_eq!(snap.measured_c, None);
    }

    #[test]
    fn published_snapshot_is_what_observers_see() {
        let state = shared();
        let snap = state
            .with_controller(|c| c.tick(ButtonEvent::None, Some(Ok(30.0))))
            .unwrap();
        state.publish_snapshot(snap);

        let seen = state.snapshot();
        assert_eq!(seen.measured_c, Some(30.0));
        assert_eq!(seen.state, ControllerState::Heating);
    }

    #[test]
    fn observers_see_previous_tick_until_publish() {
        let state = shared();
        let snap = state
            .with_controller(|c| c.tick(ButtonEvent::None, Some(Ok(30.0))))
            .unwrap();

        // Tick ran but was not published: observers still see startup state.
        assert_eq!(state.snapshot().measured_c, None);

        state.publish_snapshot(snap);
        assert_eq!(state.snapshot().measured_c, Some(30.0));
    }

    #[test]
    fn check_changes_fires_once_per_change() {
        let state = shared();
        // Startup snapshot differs from the detection default (target 0.0).
        assert!(state.check_changes().is_some());
        assert!(state.check_changes().is_none());

        let snap = state
            .with_controller(|c| c.tick(ButtonEvent::Increase, None))
            .unwrap();
        state.publish_snapshot(snap);
        let changed = state.check_changes().unwrap();
        assert_eq!(changed.target_c, 60.5);
        assert!(state.check_changes().is_none());
    }

    #[test]
    fn tiny_measurement_jitter_is_not_a_change() {
        let state = shared();
        let snap = state
            .with_controller(|c| c.tick(ButtonEvent::None, Some(Ok(30.0))))
            .unwrap();
        state.publish_snapshot(snap);
        assert!(state.check_changes().is_some());

        let snap = state
            .with_controller(|c| c.tick(ButtonEvent::None, Some(Ok(30.01))))
            .unwrap();
        state.publish_snapshot(snap);
        assert!(state.check_changes().is_none());
    }

    #[test]
    fn sync_suppresses_the_next_check() {
        let state = shared();
        state.sync_change_detection();
        assert!(state.check_changes().is_none());
    }
}
