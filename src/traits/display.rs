//! Display abstraction for bath state visualization.
//!
//! This module defines the [`BathDisplay`] trait for rendering controller
//! state to various display devices (OLED, LCD, etc.), plus the [`Frame`]
//! selection logic that rotates between the current-temperature and
//! target-temperature screens.
//!
//! The display is a read-only observer of the controller: it consumes
//! [`BathSnapshot`] values and must tolerate unchanged values between polls
//! (no dirty flag is provided).
//!
//! [`BathSnapshot`]: crate::BathSnapshot

use crate::controller::ControllerState;
use crate::BathSnapshot;

/// The screens a presentation adapter can show.
///
/// Mirrors the frame carousel of the appliance's UI: the measured and target
/// temperatures alternate on a fixed period, and a dedicated error screen
/// takes over while the controller is faulted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Frame {
    /// Measured bath temperature.
    CurrentTemp,
    /// Operator-chosen setpoint.
    TargetTemp,
    /// Fault notice; latched while the controller is in `Error`.
    ErrorScreen,
}

/// Display trait for rendering bath state.
///
/// Implementors provide hardware-specific rendering for displays like
/// SSD1306 OLED, character LCDs, or simulated displays for testing.
///
/// # Example
///
/// ```ignore
/// use rs_sousvide::traits::{BathDisplay, Frame};
/// use rs_sousvide::BathSnapshot;
///
/// struct MyDisplay { /* ... */ }
///
/// impl BathDisplay for MyDisplay {
///     type Error = ();
///
///     fn init(&mut self) -> Result<(), ()> { Ok(()) }
///     fn clear(&mut self) -> Result<(), ()> { Ok(()) }
///     fn render(&mut self, frame: Frame, snapshot: &BathSnapshot) -> Result<(), ()> {
///         // Draw the big temperature digits, the frame label, etc.
///         Ok(())
///     }
///     fn show_message(&mut self, line1: &str, line2: Option<&str>) -> Result<(), ()> {
///         Ok(())
///     }
/// }
/// ```
pub trait BathDisplay {
    /// Error type for display operations.
    type Error;

    /// Initializes the display hardware.
    ///
    /// Called once at startup. Implementations should:
    /// - Configure the display controller
    /// - Clear the screen
    /// - Set up fonts/contrast as needed
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Clears the display.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Renders one frame of the carousel from a state snapshot.
    ///
    /// Called on the adapter's own cadence, independent of the control
    /// tick. The snapshot is tick-boundary consistent; the adapter never
    /// mutates controller state.
    fn render(&mut self, frame: Frame, snapshot: &BathSnapshot) -> Result<(), Self::Error>;

    /// Shows a simple message (e.g., for startup or connection progress).
    ///
    /// # Arguments
    ///
    /// * `line1` - First line of text
    /// * `line2` - Optional second line of text
    fn show_message(&mut self, line1: &str, line2: Option<&str>) -> Result<(), Self::Error>;
}

/// Rotates the temperature frames on a fixed period.
///
/// Selects which [`Frame`] to render for a given time and snapshot: the
/// error screen whenever the controller is faulted, otherwise
/// current/target alternating every `frame_period_ms`.
///
/// # Example
///
/// ```rust
/// use rs_sousvide::traits::{Frame, FrameRotation};
/// use rs_sousvide::BathSnapshot;
///
/// let rotation = FrameRotation::new(7_000);
/// let snapshot = BathSnapshot::default();
///
/// assert_eq!(rotation.select(0, &snapshot), Frame::CurrentTemp);
/// assert_eq!(rotation.select(7_000, &snapshot), Frame::TargetTemp);
/// assert_eq!(rotation.select(14_000, &snapshot), Frame::CurrentTemp);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FrameRotation {
    frame_period_ms: u64,
}

impl FrameRotation {
    /// Create a rotation with the given per-frame display period.
    pub fn new(frame_period_ms: u64) -> Self {
        Self {
            frame_period_ms: frame_period_ms.max(1),
        }
    }

    /// Pick the frame to render at `now_ms` for this snapshot.
    pub fn select(&self, now_ms: u64, snapshot: &BathSnapshot) -> Frame {
        if snapshot.state == ControllerState::Error {
            return Frame::ErrorScreen;
        }
        if (now_ms / self.frame_period_ms) % 2 == 0 {
            Frame::CurrentTemp
        } else {
            Frame::TargetTemp
        }
    }
}

impl Default for FrameRotation {
    /// Seven seconds per frame, matching the appliance's stock UI pacing.
    fn default() -> Self {
        Self::new(7_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_in(state: ControllerState) -> BathSnapshot {
        BathSnapshot {
            state,
            ..BathSnapshot::default()
        }
    }

    #[test]
    fn rotation_alternates_between_temp_frames() {
        let rotation = FrameRotation::new(1_000);
        let snap = BathSnapshot::default();

        assert_eq!(rotation.select(0, &snap), Frame::CurrentTemp);
        assert_eq!(rotation.select(999, &snap), Frame::CurrentTemp);
        assert_eq!(rotation.select(1_000, &snap), Frame::TargetTemp);
        assert_eq!(rotation.select(1_999, &snap), Frame::TargetTemp);
        assert_eq!(rotation.select(2_000, &snap), Frame::CurrentTemp);
    }

    #[test]
    fn error_state_latches_error_screen() {
        let rotation = FrameRotation::new(1_000);
        let snap = snapshot_in(ControllerState::Error);

        // Regardless of where the carousel would be, the error screen wins.
        assert_eq!(rotation.select(0, &snap), Frame::ErrorScreen);
        assert_eq!(rotation.select(1_500, &snap), Frame::ErrorScreen);
        assert_eq!(rotation.select(123_456, &snap), Frame::ErrorScreen);
    }

    #[test]
    fn zero_period_does_not_divide_by_zero() {
        let rotation = FrameRotation::new(0);
        let snap = BathSnapshot::default();
        // Clamped to a 1ms period; just must not panic.
        let _ = rotation.select(42, &snap);
    }
}
