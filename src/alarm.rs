//! Per-tick arbitration of buzzer tone requests.
//!
//! Several things can ask for a tone in the same control tick: a button
//! press wants its feedback click, reaching the setpoint wants the confirm
//! chirp, and a faulted controller wants the error pattern. The buzzer can
//! only play one, so [`AlarmArbiter`] latches the highest-priority request
//! per tick and dispatches it once.
//!
//! Priority is fixed: `Error > Confirm > ButtonTick`. An error tone is never
//! displaced by a lower-priority request, and repeating the same request
//! within one tick is indistinguishable from making it once.

use crate::traits::{AlarmPattern, Buzzer};

/// Collects tone requests for one tick and plays the winner.
///
/// # Example
///
/// ```rust
/// use rs_sousvide::alarm::AlarmArbiter;
/// use rs_sousvide::traits::AlarmPattern;
/// use rs_sousvide::hal::MockBuzzer;
///
/// let mut arbiter = AlarmArbiter::new();
/// let mut buzzer = MockBuzzer::new();
///
/// arbiter.request(AlarmPattern::ButtonTick);
/// arbiter.request(AlarmPattern::Error);
/// arbiter.request(AlarmPattern::Confirm);
///
/// arbiter.dispatch(&mut buzzer);
/// assert_eq!(buzzer.played, vec![AlarmPattern::Error]);
/// ```
#[derive(Debug, Default)]
pub struct AlarmArbiter {
    pending: Option<AlarmPattern>,
}

impl AlarmArbiter {
    /// Create an arbiter with no pending request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a tone for this tick.
    ///
    /// A lower-priority request never displaces a higher one; duplicate
    /// requests collapse into one.
    pub fn request(&mut self, pattern: AlarmPattern) {
        self.pending = Some(match self.pending {
            Some(current) if current >= pattern => current,
            _ => pattern,
        });
    }

    /// The request that would currently win, if any.
    pub fn pending(&self) -> Option<AlarmPattern> {
        self.pending
    }

    /// Play the winning request on the buzzer and clear the latch.
    ///
    /// Best-effort: a buzzer error drops the tone, it is not propagated
    /// into the control loop. Returns the pattern that was played.
    pub fn dispatch<Z: Buzzer>(&mut self, buzzer: &mut Z) -> Option<AlarmPattern> {
        let winner = self.pending.take()?;
        let _ = buzzer.play(winner);
        Some(winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockBuzzer;

    #[test]
    fn single_request_plays() {
        let mut arbiter = AlarmArbiter::new();
        let mut buzzer = MockBuzzer::new();

        arbiter.request(AlarmPattern::Confirm);
        assert_eq!(arbiter.dispatch(&mut buzzer), Some(AlarmPattern::Confirm));
        assert_eq!(buzzer.played, vec![AlarmPattern::Confirm]);
    }

    #[test]
    fn error_wins_regardless_of_order() {
        for order in [
            [
                AlarmPattern::Error,
                AlarmPattern::Confirm,
                AlarmPattern::ButtonTick,
            ],
            [
                AlarmPattern::ButtonTick,
                AlarmPattern::Confirm,
                AlarmPattern::Error,
            ],
            [
                AlarmPattern::Confirm,
                AlarmPattern::Error,
                AlarmPattern::ButtonTick,
            ],
        ] {
            let mut arbiter = AlarmArbiter::new();
            for pattern in order {
                arbiter.request(pattern);
            }
            assert_eq!(arbiter.pending(), Some(AlarmPattern::Error));
        }
    }

    #[test]
    fn confirm_beats_button_tick() {
        let mut arbiter = AlarmArbiter::new();
        arbiter.request(AlarmPattern::ButtonTick);
        arbiter.request(AlarmPattern::Confirm);
        assert_eq!(arbiter.pending(), Some(AlarmPattern::Confirm));
    }

    #[test]
    fn duplicate_requests_play_once() {
        let mut arbiter = AlarmArbiter::new();
        let mut buzzer = MockBuzzer::new();

        arbiter.request(AlarmPattern::ButtonTick);
        arbiter.request(AlarmPattern::ButtonTick);
        arbiter.dispatch(&mut buzzer);

        assert_eq!(buzzer.played.len(), 1);
    }

    #[test]
    fn dispatch_clears_the_latch() {
        let mut arbiter = AlarmArbiter::new();
        let mut buzzer = MockBuzzer::new();

        arbiter.request(AlarmPattern::Error);
        arbiter.dispatch(&mut buzzer);

        // Nothing pending for the next tick until requested again.
        assert_eq!(arbiter.pending(), None);
        assert_eq!(arbiter.dispatch(&mut buzzer), None);
        assert_eq!(buzzer.played.len(), 1);
    }

    #[test]
    fn buzzer_failure_is_swallowed() {
        let mut arbiter = AlarmArbiter::new();
        let mut buzzer = MockBuzzer::new();
        buzzer.fail_next = true;

        arbiter.request(AlarmPattern::Confirm);
        // Returns the winner even though the hardware refused it.
        assert_eq!(arbiter.dispatch(&mut buzzer), Some(AlarmPattern::Confirm));
    }
}
