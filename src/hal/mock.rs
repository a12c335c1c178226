//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware and telemetry traits,
//! enabling development and testing on desktop without a probe, relay board,
//! or broker attached.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockProbe`] | [`TemperatureProbe`] | Queued readings and faults |
//! | [`MockRelay`] | [`HeaterSwitch`] | Tracks commands and transitions |
//! | [`MockButtons`] | [`ButtonPins`] | Settable raw levels |
//! | [`MockBuzzer`] | [`Buzzer`] | Records played patterns |
//! | [`MockClock`] | [`Clock`] | Controllable time source |
//! | [`MockDisplay`] | [`BathDisplay`] | Tracks render calls |
//! | [`MockTelemetry`] | [`TelemetrySink`] | Captures publishes |
//!
//! # Example
//!
//! ```rust
//! use rs_sousvide::controller::{BathController, ControllerState};
//! use rs_sousvide::config::ControlConfig;
//! use rs_sousvide::input::ButtonEvent;
//! use rs_sousvide::hal::{MockBuzzer, MockRelay};
//!
//! let mut controller =
//!     BathController::new(MockRelay::new(), MockBuzzer::new(), ControlConfig::default());
//!
//! controller.tick(ButtonEvent::None, Some(Ok(25.0))).unwrap();
//! assert_eq!(controller.state(), ControllerState::Heating);
//! assert!(controller.heater().heat_on);
//! ```
//!
//! [`TemperatureProbe`]: crate::traits::TemperatureProbe
//! [`HeaterSwitch`]: crate::traits::HeaterSwitch
//! [`ButtonPins`]: crate::traits::ButtonPins
//! [`Buzzer`]: crate::traits::Buzzer
//! [`Clock`]: crate::traits::Clock
//! [`BathDisplay`]: crate::traits::BathDisplay
//! [`TelemetrySink`]: crate::traits::TelemetrySink

extern crate alloc;
use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;

use crate::controller::BathSnapshot;
use crate::traits::{
    AlarmPattern, BathDisplay, ButtonPins, Buzzer, Clock, Frame, HeaterSwitch, SensorFault,
    TelemetrySink, TemperatureProbe,
};

#[cfg(feature = "std")]
use crate::traits::TelemetrySinkAsync;

// ============================================================================
// Hardware Mocks
// ============================================================================

/// Mock temperature probe for testing.
///
/// Serves queued results in FIFO order. When the queue runs dry the most
/// recent result repeats, which keeps long tick-loop tests from having to
/// enumerate every sample.
///
/// # Example
///
/// ```rust
/// use rs_sousvide::hal::MockProbe;
/// use rs_sousvide::traits::{SensorFault, TemperatureProbe};
///
/// let mut probe = MockProbe::new()
///     .queue_reading(42.0)
///     .queue_fault(SensorFault::Bus);
///
/// assert_eq!(probe.read_celsius(), Ok(42.0));
/// assert_eq!(probe.read_celsius(), Err(SensorFault::Bus));
/// assert_eq!(probe.read_celsius(), Err(SensorFault::Bus)); // last repeats
/// ```
#[derive(Debug, Default)]
pub struct MockProbe {
    queue: VecDeque<Result<f32, SensorFault>>,
    last: Option<Result<f32, SensorFault>>,
    /// Number of times `read_celsius` was called.
    pub reads: usize,
}

impl MockProbe {
    /// Creates a new mock probe with nothing queued.
    ///
    /// Reading an empty, never-fed probe reports `Disconnected`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a temperature reading (builder style).
    pub fn queue_reading(mut self, degrees_c: f32) -> Self {
        self.queue.push_back(Ok(degrees_c));
        self
    }

    /// Queues a fault (builder style).
    pub fn queue_fault(mut self, fault: SensorFault) -> Self {
        self.queue.push_back(Err(fault));
        self
    }

    /// Appends a reading to an already constructed probe.
    pub fn push_reading(&mut self, degrees_c: f32) {
        self.queue.push_back(Ok(degrees_c));
    }

    /// Appends a fault to an already constructed probe.
    pub fn push_fault(&mut self, fault: SensorFault) {
        self.queue.push_back(Err(fault));
    }
}

impl TemperatureProbe for MockProbe {
    fn read_celsius(&mut self) -> Result<f32, SensorFault> {
        self.reads += 1;
        if let Some(next) = self.queue.pop_front() {
            self.last = Some(next);
        }
        self.last.unwrap_or(Err(SensorFault::Disconnected))
    }
}

/// Mock relay for testing.
///
/// # Example
///
/// ```rust
/// use rs_sousvide::hal::MockRelay;
/// use rs_sousvide::traits::HeaterSwitch;
///
/// let mut relay = MockRelay::new();
/// relay.set_heat(true).unwrap();
/// relay.set_heat(true).unwrap();
/// relay.set_heat(false).unwrap();
///
/// assert!(!relay.heat_on);
/// assert_eq!(relay.writes, 3);
/// assert_eq!(relay.transitions, 2); // off->on, on->off
/// ```
#[derive(Debug, Default)]
pub struct MockRelay {
    /// Last commanded heat state.
    pub heat_on: bool,
    /// Total number of `set_heat` calls.
    pub writes: usize,
    /// Number of calls that changed the commanded state.
    pub transitions: usize,
    /// When true, the next write fails (then the flag clears).
    pub fail_next: bool,
}

impl MockRelay {
    /// Creates a new mock relay, off.
    pub fn new() -> Self {
        Self::default()
    }
}

impl HeaterSwitch for MockRelay {
    type Error = &'static str;

    fn set_heat(&mut self, on: bool) -> Result<(), Self::Error> {
        if self.fail_next {
            self.fail_next = false;
            return Err("relay write failed");
        }
        self.writes += 1;
        if self.heat_on != on {
            self.transitions += 1;
        }
        self.heat_on = on;
        Ok(())
    }
}

/// Mock button pair for testing.
///
/// Levels are logical "pressed" states; set them directly and let the
/// debouncer sample.
#[derive(Debug, Default)]
pub struct MockButtons {
    increase: bool,
    decrease: bool,
}

impl MockButtons {
    /// Creates a new mock button pair, both released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the raw level of the increase button.
    pub fn set_increase(&mut self, pressed: bool) {
        self.increase = pressed;
    }

    /// Sets the raw level of the decrease button.
    pub fn set_decrease(&mut self, pressed: bool) {
        self.decrease = pressed;
    }
}

impl ButtonPins for MockButtons {
    fn increase_pressed(&mut self) -> bool {
        self.increase
    }

    fn decrease_pressed(&mut self) -> bool {
        self.decrease
    }
}

/// Mock buzzer that records every pattern played.
#[derive(Debug, Default)]
pub struct MockBuzzer {
    /// Patterns in the order they were played.
    pub played: Vec<AlarmPattern>,
    /// When true, the next play fails (then the flag clears).
    pub fail_next: bool,
}

impl MockBuzzer {
    /// Creates a new mock buzzer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Buzzer for MockBuzzer {
    type Error = &'static str;

    fn play(&mut self, pattern: AlarmPattern) -> Result<(), Self::Error> {
        if self.fail_next {
            self.fail_next = false;
            return Err("buzzer busy");
        }
        self.played.push(pattern);
        Ok(())
    }
}

/// Mock clock for testing.
///
/// Provides a controllable time source for testing time-dependent behavior.
///
/// # Example
///
/// ```rust
/// use rs_sousvide::hal::MockClock;
/// use rs_sousvide::traits::Clock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.set(1000);
/// clock.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Debug, Default)]
pub struct MockClock {
    current_ms: u64,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current time in milliseconds.
    pub fn set(&mut self, ms: u64) {
        self.current_ms = ms;
    }

    /// Advances the clock by the given duration.
    pub fn advance(&mut self, ms: u64) {
        self.current_ms += ms;
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms
    }
}

// ============================================================================
// Display Mock
// ============================================================================

/// Mock display that tracks render calls.
///
/// # Example
///
/// ```rust
/// use rs_sousvide::hal::MockDisplay;
/// use rs_sousvide::traits::BathDisplay;
///
/// let mut display = MockDisplay::new();
/// display.init().unwrap();
/// assert!(display.initialized);
/// assert_eq!(display.render_count, 0);
/// ```
#[derive(Debug, Default)]
pub struct MockDisplay {
    /// Frame passed to the most recent render().
    pub last_frame: Option<Frame>,
    /// Snapshot passed to the most recent render().
    pub last_snapshot: Option<BathSnapshot>,
    /// Number of times render() was called.
    pub render_count: usize,
    /// Last message shown via show_message().
    pub last_message: Option<(String, Option<String>)>,
    /// Whether init() was called.
    pub initialized: bool,
}

impl MockDisplay {
    /// Creates a new mock display.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BathDisplay for MockDisplay {
    type Error = &'static str;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.initialized = true;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.last_frame = None;
        self.last_snapshot = None;
        Ok(())
    }

    fn render(&mut self, frame: Frame, snapshot: &BathSnapshot) -> Result<(), Self::Error> {
        self.last_frame = Some(frame);
        self.last_snapshot = Some(*snapshot);
        self.render_count += 1;
        Ok(())
    }

    fn show_message(&mut self, line1: &str, line2: Option<&str>) -> Result<(), Self::Error> {
        self.last_message = Some((String::from(line1), line2.map(String::from)));
        Ok(())
    }
}

// ============================================================================
// Telemetry Mock
// ============================================================================

/// Mock telemetry sink that captures publishes.
///
/// # Example
///
/// ```rust
/// use rs_sousvide::hal::MockTelemetry;
/// use rs_sousvide::traits::TelemetrySink;
///
/// let mut sink = MockTelemetry::new();
/// sink.publish("sousvide/target", b"60.0", true).unwrap();
///
/// assert_eq!(sink.published.len(), 1);
/// assert_eq!(sink.published_to("sousvide/target").len(), 1);
/// ```
#[derive(Debug)]
pub struct MockTelemetry {
    /// All published messages as (topic, payload, retain).
    pub published: Vec<(String, Vec<u8>, bool)>,
    /// Reported connection state.
    pub connected: bool,
    /// When true, the next publish fails (then the flag clears).
    pub fail_next: bool,
}

impl MockTelemetry {
    /// Creates a new mock sink, connected.
    pub fn new() -> Self {
        Self {
            published: Vec::new(),
            connected: true,
            fail_next: false,
        }
    }

    /// Returns all messages published to a specific topic.
    pub fn published_to(&self, topic: &str) -> Vec<&(String, Vec<u8>, bool)> {
        self.published.iter().filter(|(t, _, _)| t == topic).collect()
    }
}

impl Default for MockTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySink for MockTelemetry {
    type Error = &'static str;

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Self::Error> {
        if self.fail_next {
            self.fail_next = false;
            return Err("publish failed");
        }
        self.published
            .push((String::from(topic), Vec::from(payload), retain));
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(feature = "std")]
impl TelemetrySinkAsync for MockTelemetry {
    async fn publish_async(
        &mut self,
        topic: &str,
        payload: &[u8],
        retain: bool,
    ) -> Result<(), Self::Error> {
        self.publish(topic, payload, retain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_repeats_last_result_when_drained() {
        let mut probe = MockProbe::new().queue_reading(40.0);
        assert_eq!(probe.read_celsius(), Ok(40.0));
        assert_eq!(probe.read_celsius(), Ok(40.0));
        assert_eq!(probe.reads, 2);
    }

    #[test]
    fn empty_probe_reads_disconnected() {
        let mut probe = MockProbe::new();
        assert_eq!(probe.read_celsius(), Err(SensorFault::Disconnected));
    }

    #[test]
    fn relay_counts_transitions_not_writes() {
        let mut relay = MockRelay::new();
        relay.set_heat(false).unwrap();
        relay.set_heat(true).unwrap();
        relay.set_heat(true).unwrap();
        assert_eq!(relay.writes, 3);
        assert_eq!(relay.transitions, 1);
    }

    #[test]
    fn relay_failure_clears_after_one_write() {
        let mut relay = MockRelay::new();
        relay.fail_next = true;
        assert!(relay.set_heat(true).is_err());
        assert!(relay.set_heat(true).is_ok());
    }

    #[test]
    fn telemetry_filters_by_topic() {
        let mut sink = MockTelemetry::new();
        sink.publish("sousvide/measured", b"41.5", true).unwrap();
        sink.publish("sousvide/target", b"60.0", true).unwrap();
        sink.publish("sousvide/measured", b"42.0", true).unwrap();

        assert_eq!(sink.published_to("sousvide/measured").len(), 2);
        assert_eq!(sink.published_to("sousvide/target").len(), 1);
    }
}
