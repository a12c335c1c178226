//! Debounced setpoint button input with press-and-hold auto-repeat.
//!
//! Turns the raw levels of the two momentary push-buttons into discrete
//! [`ButtonEvent`]s. A level change only becomes an event after it has held
//! stable for the debounce window, holding a button past the hold threshold
//! emits repeats at a fixed rate for fast setpoint scrolling, and pressing
//! both buttons at once is treated as ambiguous intent and suppressed.
//!
//! Events are transient: the control loop consumes each one immediately,
//! nothing is queued.
//!
//! # Example
//!
//! ```rust
//! use rs_sousvide::input::{ButtonEvent, Debouncer};
//! use rs_sousvide::config::InputConfig;
//! use rs_sousvide::hal::MockButtons;
//!
//! let buttons = MockButtons::new();
//! let mut debouncer = Debouncer::new(buttons, InputConfig::default());
//!
//! debouncer.buttons_mut().set_increase(true);
//! assert_eq!(debouncer.poll(0), ButtonEvent::None); // level seen, not stable yet
//! assert_eq!(debouncer.poll(30), ButtonEvent::Increase); // debounce window elapsed
//! assert_eq!(debouncer.poll(40), ButtonEvent::None); // edge already consumed
//! ```

use crate::config::InputConfig;
use crate::traits::ButtonPins;

/// A debounced button event, produced at most once per poll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ButtonEvent {
    /// Raise the setpoint by one step.
    Increase,
    /// Lower the setpoint by one step.
    Decrease,
    /// No validated input this poll.
    #[default]
    None,
}

/// Debounce state for one physical button.
#[derive(Clone, Copy, Debug, Default)]
struct Channel {
    /// Validated (debounced) level.
    stable: bool,
    /// Most recent raw level.
    candidate: bool,
    /// When the raw level last changed.
    candidate_since: u64,
    /// When the validated press began.
    held_since: u64,
    /// When this channel last emitted an event (edge or repeat).
    last_emit: u64,
}

impl Channel {
    /// Feed one raw sample; returns true on a validated press edge.
    fn update(&mut self, raw: bool, now_ms: u64, debounce_ms: u64) -> bool {
        if raw != self.candidate {
            self.candidate = raw;
            self.candidate_since = now_ms;
        }
        if self.candidate != self.stable
            && now_ms.saturating_sub(self.candidate_since) >= debounce_ms
        {
            self.stable = self.candidate;
            if self.stable {
                self.held_since = now_ms;
                self.last_emit = now_ms;
                return true;
            }
        }
        false
    }

    /// True when a held press is due for an auto-repeat emission.
    fn repeat_due(&mut self, now_ms: u64, hold_ms: u64, repeat_ms: u64) -> bool {
        if !self.stable || now_ms.saturating_sub(self.held_since) < hold_ms {
            return false;
        }
        if now_ms.saturating_sub(self.last_emit) >= repeat_ms {
            self.last_emit = now_ms;
            true
        } else {
            false
        }
    }
}

/// Two-button debouncer producing setpoint events.
///
/// Owns the [`ButtonPins`] device and is polled once per pass of the tick
/// loop. All timing comes from the caller-supplied `now_ms` so the debouncer
/// is deterministic under test.
pub struct Debouncer<B: ButtonPins> {
    buttons: B,
    config: InputConfig,
    increase: Channel,
    decrease: Channel,
}

impl<B: ButtonPins> Debouncer<B> {
    /// Create a debouncer over the given button device.
    pub fn new(buttons: B, config: InputConfig) -> Self {
        Self {
            buttons,
            config,
            increase: Channel::default(),
            decrease: Channel::default(),
        }
    }

    /// Sample both buttons and produce at most one event.
    ///
    /// Call once per tick-loop pass. Press edges win over auto-repeats;
    /// with both buttons validated down, nothing is emitted and repeat
    /// timers still advance, so releasing one button does not release a
    /// burst of stale repeats.
    pub fn poll(&mut self, now_ms: u64) -> ButtonEvent {
        let inc_raw = self.buttons.increase_pressed();
        let dec_raw = self.buttons.decrease_pressed();

        let inc_edge = self.increase.update(inc_raw, now_ms, self.config.debounce_ms);
        let dec_edge = self.decrease.update(dec_raw, now_ms, self.config.debounce_ms);

        // Both held: ambiguous intent, suppress edges and repeats alike.
        if self.increase.stable && self.decrease.stable {
            return ButtonEvent::None;
        }

        if inc_edge {
            return ButtonEvent::Increase;
        }
        if dec_edge {
            return ButtonEvent::Decrease;
        }

        let hold = self.config.hold_ms;
        let repeat = self.config.repeat_ms;
        if self.increase.repeat_due(now_ms, hold, repeat) {
            return ButtonEvent::Increase;
        }
        if self.decrease.repeat_due(now_ms, hold, repeat) {
            return ButtonEvent::Decrease;
        }

        ButtonEvent::None
    }

    /// Get a reference to the button device.
    pub fn buttons(&self) -> &B {
        &self.buttons
    }

    /// Get a mutable reference to the button device.
    pub fn buttons_mut(&mut self) -> &mut B {
        &mut self.buttons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockButtons;

    fn debouncer() -> Debouncer<MockButtons> {
        // debounce 30ms, hold 600ms, repeat 150ms
        Debouncer::new(MockButtons::new(), InputConfig::default())
    }

    // =========================================================================
    // Debounce Window Tests
    // =========================================================================

    #[test]
    fn press_shorter_than_window_is_ignored() {
        let mut d = debouncer();

        d.buttons_mut().set_increase(true);
        assert_eq!(d.poll(0), ButtonEvent::None);

        // Bounce back before the window elapses.
        d.buttons_mut().set_increase(false);
        assert_eq!(d.poll(10), ButtonEvent::None);
        assert_eq!(d.poll(100), ButtonEvent::None);
    }

    #[test]
    fn stable_press_emits_one_edge() {
        let mut d = debouncer();

        d.buttons_mut().set_increase(true);
        assert_eq!(d.poll(0), ButtonEvent::None);
        assert_eq!(d.poll(30), ButtonEvent::Increase);
        // Still held, but no repeat yet: silent.
        assert_eq!(d.poll(60), ButtonEvent::None);
    }

    #[test]
    fn bouncy_release_then_press_counts_once() {
        let mut d = debouncer();

        d.buttons_mut().set_increase(true);
        d.poll(0);
        assert_eq!(d.poll(30), ButtonEvent::Increase);

        // Chatter during release: candidate resets each flip.
        d.buttons_mut().set_increase(false);
        d.poll(40);
        d.buttons_mut().set_increase(true);
        d.poll(45);
        d.buttons_mut().set_increase(false);
        d.poll(50);
        assert_eq!(d.poll(90), ButtonEvent::None); // release validated, no event

        // Clean second press emits again.
        d.buttons_mut().set_increase(true);
        d.poll(100);
        assert_eq!(d.poll(130), ButtonEvent::Increase);
    }

    #[test]
    fn decrease_edge_emits() {
        let mut d = debouncer();

        d.buttons_mut().set_decrease(true);
        d.poll(0);
        assert_eq!(d.poll(30), ButtonEvent::Decrease);
    }

    // =========================================================================
    // Auto-Repeat Tests
    // =========================================================================

    #[test]
    fn hold_produces_repeats_at_fixed_rate() {
        let mut d = debouncer();

        d.buttons_mut().set_increase(true);
        d.poll(0);
        assert_eq!(d.poll(30), ButtonEvent::Increase); // edge at t=30

        // Before hold threshold (600ms after the edge): quiet.
        assert_eq!(d.poll(400), ButtonEvent::None);

        // Past the threshold, repeats every 150ms.
        assert_eq!(d.poll(650), ButtonEvent::Increase);
        assert_eq!(d.poll(700), ButtonEvent::None); // only 50ms since last emit
        assert_eq!(d.poll(800), ButtonEvent::Increase);
        assert_eq!(d.poll(950), ButtonEvent::Increase);
    }

    #[test]
    fn release_stops_repeats() {
        let mut d = debouncer();

        d.buttons_mut().set_increase(true);
        d.poll(0);
        d.poll(30);
        assert_eq!(d.poll(700), ButtonEvent::Increase);

        d.buttons_mut().set_increase(false);
        d.poll(710);
        assert_eq!(d.poll(900), ButtonEvent::None);
        assert_eq!(d.poll(2_000), ButtonEvent::None);
    }

    // =========================================================================
    // Both-Buttons Tests
    // =========================================================================

    #[test]
    fn simultaneous_press_yields_none() {
        let mut d = debouncer();

        d.buttons_mut().set_increase(true);
        d.buttons_mut().set_decrease(true);
        d.poll(0);
        assert_eq!(d.poll(30), ButtonEvent::None);
        assert_eq!(d.poll(1_000), ButtonEvent::None); // no repeats either
    }

    #[test]
    fn second_button_joins_and_silences() {
        let mut d = debouncer();

        d.buttons_mut().set_increase(true);
        d.poll(0);
        assert_eq!(d.poll(30), ButtonEvent::Increase);

        d.buttons_mut().set_decrease(true);
        d.poll(40);
        // Once both are validated down, everything is suppressed.
        assert_eq!(d.poll(70), ButtonEvent::None);
        assert_eq!(d.poll(1_000), ButtonEvent::None);
    }

    #[test]
    fn releasing_one_of_two_resumes_single_button_behavior() {
        let mut d = debouncer();

        d.buttons_mut().set_increase(true);
        d.buttons_mut().set_decrease(true);
        d.poll(0);
        assert_eq!(d.poll(30), ButtonEvent::None);

        d.buttons_mut().set_decrease(false);
        d.poll(40);
        d.poll(70); // decrease release validated

        // Increase is still held; repeats resume once due.
        assert_eq!(d.poll(700), ButtonEvent::Increase);
    }
}
