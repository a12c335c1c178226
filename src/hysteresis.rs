//! Hysteresis band policy for relay actuation.
//!
//! The probe trails the bath by more than its own response time, so switching
//! the relay on a bare `measured < target` threshold oscillates: the element
//! keeps heating after the cutoff and the reading keeps climbing after the
//! element stops. [`HysteresisBand`] encodes the dead-zone policy the
//! controller uses instead, in both its wide (heat-up) and narrow (hold)
//! forms.
//!
//! The band widths are deployment calibration, not correctness invariants;
//! the qualitative contract is that the relay never switches more than once
//! while the measurement stays inside the band.
//!
//! # Example
//!
//! ```rust
//! use rs_sousvide::hysteresis::HysteresisBand;
//!
//! let band = HysteresisBand::new(0.5, 2.0);
//!
//! // Heat-up: element on until within half a degree of target.
//! assert!(band.heatup_command(58.0, 60.0));
//! assert!(!band.heatup_command(59.7, 60.0));
//!
//! // Hold: inside the narrow band, keep whatever the relay was doing.
//! assert!(band.hold_command(59.9, 60.0, true));
//! assert!(!band.hold_command(59.9, 60.0, false));
//! ```

/// Dead-zone widths around the setpoint, in degrees.
///
/// `low` is the switching margin below target used while heating and (at
/// half width) while holding; `high` is the cool-off distance that sends a
/// held bath back into full heat-up (e.g., after the lid is lifted).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HysteresisBand {
    low: f32,
    high: f32,
}

impl HysteresisBand {
    /// Create a band with the given widths.
    ///
    /// Widths are forced non-negative, and `high` is forced to at least
    /// `low` so the cool-off threshold can never sit inside the switching
    /// margin.
    pub fn new(low: f32, high: f32) -> Self {
        let low = low.max(0.0);
        Self {
            low,
            high: high.max(low),
        }
    }

    /// Lower switching margin in degrees.
    #[inline]
    pub fn low(&self) -> f32 {
        self.low
    }

    /// Cool-off width in degrees.
    #[inline]
    pub fn high(&self) -> f32 {
        self.high
    }

    /// Relay decision during heat-up.
    ///
    /// On while `measured < target − low`, off once the measurement enters
    /// the margin. The margin absorbs the thermal lag: the element's
    /// residual heat carries the bath the rest of the way to target.
    #[inline]
    pub fn heatup_command(&self, measured: f32, target: f32) -> bool {
        measured < target - self.low
    }

    /// Relay decision while holding at target.
    ///
    /// On below `target − low/2`, off at or above `target`; in between the
    /// previous command stands. The narrower margin trades a little extra
    /// switching for a tighter hold.
    #[inline]
    pub fn hold_command(&self, measured: f32, target: f32, was_on: bool) -> bool {
        if measured >= target {
            false
        } else if measured < target - self.low / 2.0 {
            true
        } else {
            was_on
        }
    }

    /// True when the measurement has reached (or passed) the target.
    #[inline]
    pub fn reached(&self, measured: f32, target: f32) -> bool {
        measured >= target
    }

    /// True when a held bath has cooled materially below target and should
    /// re-enter full heat-up.
    #[inline]
    pub fn cooled_off(&self, measured: f32, target: f32) -> bool {
        measured < target - self.high
    }
}

impl Default for HysteresisBand {
    /// Half a degree of switching margin, two degrees of cool-off.
    ///
    /// Chosen to trade overshoot against relay wear on a typical immersion
    /// heater; tune per deployment via `ControlConfig`.
    fn default() -> Self {
        Self::new(0.5, 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heatup_switches_only_at_margin() {
        let band = HysteresisBand::new(0.5, 2.0);

        assert!(band.heatup_command(20.0, 60.0));
        assert!(band.heatup_command(59.49, 60.0));
        // At and inside the margin: off, even though target is not reached.
        assert!(!band.heatup_command(59.5, 60.0));
        assert!(!band.heatup_command(59.9, 60.0));
        assert!(!band.heatup_command(60.0, 60.0));
    }

    #[test]
    fn hold_keeps_previous_command_inside_band() {
        let band = HysteresisBand::new(0.5, 2.0);

        // Below half-margin: on regardless of history.
        assert!(band.hold_command(59.7, 60.0, false));
        assert!(band.hold_command(59.7, 60.0, true));

        // At/above target: off regardless of history.
        assert!(!band.hold_command(60.0, 60.0, true));
        assert!(!band.hold_command(60.3, 60.0, true));

        // In between: history decides, so no switching inside the band.
        assert!(band.hold_command(59.9, 60.0, true));
        assert!(!band.hold_command(59.9, 60.0, false));
    }

    #[test]
    fn no_double_switch_within_band_width() {
        let band = HysteresisBand::new(0.5, 2.0);
        let target = 60.0;

        // Sweep a measurement up and down inside the hold band; the relay
        // command may change at most once until the band is exited.
        let mut relay = true;
        let mut changes = 0;
        for measured in [59.8, 59.85, 59.9, 59.87, 59.92, 59.88] {
            let next = band.hold_command(measured, target, relay);
            if next != relay {
                changes += 1;
            }
            relay = next;
        }
        assert_eq!(changes, 0);
    }

    #[test]
    fn cooled_off_uses_wide_band() {
        let band = HysteresisBand::new(0.5, 2.0);

        assert!(!band.cooled_off(58.5, 60.0));
        assert!(!band.cooled_off(58.0, 60.0));
        assert!(band.cooled_off(57.9, 60.0));
    }

    #[test]
    fn reached_is_inclusive() {
        let band = HysteresisBand::default();
        assert!(band.reached(60.0, 60.0));
        assert!(band.reached(60.1, 60.0));
        assert!(!band.reached(59.99, 60.0));
    }

    #[test]
    fn degenerate_widths_are_sanitized() {
        let band = HysteresisBand::new(-1.0, -5.0);
        assert_eq!(band.low(), 0.0);
        assert_eq!(band.high(), 0.0);

        // high is never narrower than low
        let band = HysteresisBand::new(2.0, 0.5);
        assert_eq!(band.high(), 2.0);
    }
}
