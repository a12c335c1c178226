//! Hardware abstraction traits for the temperature probe, relay, buttons, and buzzer.
//!
//! This module defines the core hardware interfaces that allow rs-sousvide to
//! work across different platforms (ESP-class boards, desktop mocks, etc.).
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`TemperatureProbe`] | Raw bath temperature readings |
//! | [`HeaterSwitch`] | Relay actuation for the heating element |
//! | [`ButtonPins`] | Raw levels of the two setpoint push-buttons |
//! | [`Buzzer`] | Piezo tone patterns |
//! | [`Clock`] | Time source for `no_std` environments |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. For real hardware, implement these traits
//! over your board's GPIO and one-wire/I2C drivers (the `embedded-hal`
//! feature provides portable digital-pin backed drivers in `hal::gpio`).
//!
//! # Example
//!
//! ```rust
//! use rs_sousvide::traits::{HeaterSwitch, TemperatureProbe};
//! use rs_sousvide::hal::{MockProbe, MockRelay};
//!
//! let mut probe = MockProbe::new().queue_reading(42.5);
//! assert_eq!(probe.read_celsius().unwrap(), 42.5);
//!
//! let mut relay = MockRelay::new();
//! relay.set_heat(true).unwrap();
//! assert!(relay.heat_on);
//! ```

/// Faults a temperature probe or its bus can report.
///
/// Produced by [`TemperatureProbe`] implementations and by the plausibility
/// checks in [`SensorReader`]. Any of these counts toward the controller's
/// consecutive-fault threshold.
///
/// [`SensorReader`]: crate::sensor::SensorReader
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SensorFault {
    /// No probe responded on the bus.
    ///
    /// One-wire probes signal this with a reserved sentinel reading
    /// (−127 °C on DS18B20-class parts).
    Disconnected,

    /// The probe answered, but the value is not a believable bath
    /// temperature (reserved error code, power-on reset value, or a
    /// reading far outside the liquid range).
    ImplausibleReading,

    /// The bus transaction itself failed (CRC error, timeout, contention).
    ///
    /// Usually transient; the controller tolerates isolated occurrences
    /// by reusing the previous reading.
    Bus,
}

impl SensorFault {
    /// Returns the fault as a short lowercase string for logs and telemetry.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_sousvide::SensorFault;
    ///
    /// assert_eq!(SensorFault::Disconnected.as_str(), "disconnected");
    /// assert_eq!(SensorFault::Bus.as_str(), "bus");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SensorFault::Disconnected => "disconnected",
            SensorFault::ImplausibleReading => "implausible",
            SensorFault::Bus => "bus",
        }
    }
}

/// Temperature probe trait - abstracts the contact sensor on the bath.
///
/// Implement this trait for your probe hardware (one-wire DS18B20,
/// thermocouple amplifier, etc.). A call may block for up to the probe's
/// conversion time; the tick period is sized to absorb that latency, so
/// implementations must not block longer than their advertised maximum.
///
/// # Implementation Notes
///
/// - Return raw degrees Celsius; calibration is applied by the reader
/// - Map reserved sentinel values to the matching [`SensorFault`] rather
///   than returning them as numbers
/// - There is no cancellation: a stalled conversion delays the tick, it
///   must never return a partial value
pub trait TemperatureProbe {
    /// Take one reading in degrees Celsius.
    ///
    /// Blocks for at most the probe's conversion time.
    fn read_celsius(&mut self) -> Result<f32, SensorFault>;
}

/// Relay driver trait - abstracts the heating element switch.
///
/// The argument is always "heat should be on"; implementations translate
/// that to the wiring's actuation polarity (some relay boards assert on a
/// low level). The write is fire-and-forget: there is no feedback channel
/// to confirm the contactor actually moved, so a wiring fault downstream
/// of this call is undetectable.
///
/// # Implementation Notes
///
/// - Must be idempotent: repeating the same command is indistinguishable
///   from issuing it once (no pulse outputs)
/// - Called exactly once per control tick with a freshly derived decision
///
/// # Example Implementation
///
/// ```rust,ignore
/// use rs_sousvide::traits::HeaterSwitch;
///
/// struct MyRelay { /* pin handle */ }
///
/// impl HeaterSwitch for MyRelay {
///     type Error = ();
///
///     fn set_heat(&mut self, on: bool) -> Result<(), ()> {
///         // Active-low board: asserted level is inverted here.
///         // set_pin_level(!on)
///         Ok(())
///     }
/// }
/// ```
pub trait HeaterSwitch {
    /// Error type for relay operations.
    type Error;

    /// Command the heating element on or off.
    ///
    /// `on == true` always means "heat the bath", regardless of the
    /// hardware's signal polarity.
    fn set_heat(&mut self, on: bool) -> Result<(), Self::Error>;
}

/// Raw input levels of the two setpoint push-buttons.
///
/// Returns logical "pressed" states; input polarity (pull-up wiring reads
/// low when pressed) is resolved by the implementation. Debouncing and
/// auto-repeat are layered on top by [`Debouncer`], so these methods should
/// report the instantaneous level without filtering.
///
/// [`Debouncer`]: crate::input::Debouncer
pub trait ButtonPins {
    /// True while the "increase setpoint" button is held down.
    fn increase_pressed(&mut self) -> bool;

    /// True while the "decrease setpoint" button is held down.
    fn decrease_pressed(&mut self) -> bool;
}

/// Tone patterns the alarm driver can play.
///
/// Variant order is the arbitration priority: when multiple requests land
/// in the same tick, the greatest wins and an [`Error`](Self::Error) tone is
/// never preempted by a lower-priority request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AlarmPattern {
    /// Short click acknowledging a button press.
    ButtonTick,
    /// Confirmation chirp when the bath first reaches the setpoint.
    Confirm,
    /// Repeating error pattern while the controller is faulted.
    Error,
}

/// Buzzer trait - drives the piezo with simple tone patterns.
///
/// Playback is best-effort and must not block the tick loop; a pattern that
/// cannot be started is simply dropped. Repeating one pattern within a tick
/// has the same audible effect as playing it once.
pub trait Buzzer {
    /// Error type for buzzer operations.
    type Error;

    /// Start playing a tone pattern.
    fn play(&mut self, pattern: AlarmPattern) -> Result<(), Self::Error>;
}

/// Time source trait for `no_std` compatibility.
///
/// Provides monotonic time in milliseconds for debounce windows and the
/// sampling cadence. On desktop, this can wrap `std::time::Instant`. On
/// embedded, use a hardware timer.
///
/// # Example
///
/// ```rust
/// use rs_sousvide::traits::Clock;
/// use rs_sousvide::hal::MockClock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}
