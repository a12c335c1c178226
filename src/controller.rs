//! Core bath control loop: setpoint, state machine, relay and alarm policy.
//!
//! [`BathController`] is the single writer of all control state. Once per
//! tick it consumes one debounced [`ButtonEvent`] and at most one sensor
//! sample, advances the `{Idle, Heating, AtTarget, Error}` state machine,
//! derives a fresh relay command (never cached across ticks), writes it to
//! the heater, arbitrates buzzer requests, and returns a consistent
//! [`BathSnapshot`] for the display and telemetry observers.
//!
//! Safety invariant: the relay command is `false` on every tick in which the
//! state is `Error`. A faulted bath is never left heating unattended.
//!
//! # Example
//!
//! ```rust
//! use rs_sousvide::controller::{BathController, ControllerState};
//! use rs_sousvide::config::ControlConfig;
//! use rs_sousvide::input::ButtonEvent;
//! use rs_sousvide::hal::{MockBuzzer, MockRelay};
//!
//! let config = ControlConfig::default(); // target 60.0
//! let mut controller = BathController::new(MockRelay::new(), MockBuzzer::new(), config);
//!
//! // First tick: no measurement yet, stays Idle with the relay off.
//! let snap = controller.tick(ButtonEvent::None, None).unwrap();
//! assert_eq!(snap.state, ControllerState::Idle);
//! assert!(!controller.relay_on());
//!
//! // A valid reading below target starts the heat-up.
//! let snap = controller.tick(ButtonEvent::None, Some(Ok(20.0))).unwrap();
//! assert_eq!(snap.state, ControllerState::Heating);
//! assert!(controller.relay_on());
//! ```

use crate::alarm::AlarmArbiter;
use crate::config::ControlConfig;
use crate::hysteresis::HysteresisBand;
use crate::input::ButtonEvent;
use crate::traits::{AlarmPattern, Buzzer, HeaterSwitch, SensorFault};

// =============================================================================
// Controller State
// =============================================================================

/// Controller state machine states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ControllerState {
    /// Relay off, waiting for a valid measurement below the setpoint.
    #[default]
    Idle,
    /// Driving the bath up to the setpoint with the wide hysteresis band.
    Heating,
    /// Holding at the setpoint with the narrow band.
    AtTarget,
    /// Sensor fault streak exceeded the threshold; relay forced off.
    Error,
}

impl ControllerState {
    /// Stable lowercase name, used for display and telemetry payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerState::Idle => "idle",
            ControllerState::Heating => "heating",
            ControllerState::AtTarget => "at_target",
            ControllerState::Error => "error",
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Tick-boundary-consistent view of the controller for read-only observers.
///
/// All fields are written together at the end of each tick; the display and
/// telemetry adapters only ever see a measurement, target, and state that
/// belong to the same tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BathSnapshot {
    /// Latest calibrated temperature, if one has ever been taken.
    pub measured_c: Option<f32>,
    /// False when the measurement is a stale value being reused across a
    /// transient sensor fault.
    pub measurement_fresh: bool,
    /// Current setpoint in degrees.
    pub target_c: f32,
    /// Controller state this tick.
    pub state: ControllerState,
}

/// Latest reading as the controller carries it between ticks.
#[derive(Clone, Copy, Debug)]
struct Measurement {
    degrees_c: f32,
    fresh: bool,
}

// =============================================================================
// Bath Controller
// =============================================================================

/// Single-writer control loop over a heater relay and alarm buzzer.
///
/// Owns the setpoint, the latest measurement, the fault/recovery streak
/// counters, and the actuators. Everything else in the system is either a
/// feeder (debouncer, sensor reader) or a read-only observer of the
/// [`BathSnapshot`] this controller produces.
pub struct BathController<H: HeaterSwitch, Z: Buzzer> {
    heater: H,
    buzzer: Z,
    arbiter: AlarmArbiter,
    band: HysteresisBand,
    config: ControlConfig,
    state: ControllerState,
    target_c: f32,
    measurement: Option<Measurement>,
    relay_on: bool,
    fault_streak: u8,
    valid_streak: u8,
    last_fault: Option<SensorFault>,
}

impl<H: HeaterSwitch, Z: Buzzer> BathController<H, Z> {
    /// Create a controller in `Idle` with the configured default setpoint.
    ///
    /// The relay is not touched until the first [`tick`](Self::tick).
    pub fn new(heater: H, buzzer: Z, config: ControlConfig) -> Self {
        let target_c = config
            .default_target_c
            .clamp(config.setpoint_min_c, config.setpoint_max_c);
        Self {
            heater,
            buzzer,
            arbiter: AlarmArbiter::new(),
            band: HysteresisBand::new(config.hysteresis_low_c, config.hysteresis_high_c),
            config,
            state: ControllerState::Idle,
            target_c,
            measurement: None,
            relay_on: false,
            fault_streak: 0,
            valid_streak: 0,
            last_fault: None,
        }
    }

    /// Run one control tick.
    ///
    /// Strictly in order: apply the setpoint event, book the sensor sample,
    /// advance the state machine, derive and write the relay command, then
    /// dispatch the winning alarm. `sample` is `None` on the (frequent)
    /// passes where no reading was due; streak counters only move when a
    /// sample is present.
    ///
    /// The only error that propagates is a failed relay write; everything
    /// else is absorbed into the state machine.
    pub fn tick(
        &mut self,
        event: ButtonEvent,
        sample: Option<Result<f32, SensorFault>>,
    ) -> Result<BathSnapshot, H::Error> {
        self.apply_event(event);
        if let Some(sample) = sample {
            self.book_sample(sample);
        }
        self.advance_state();

        // Derived fresh each tick; a command is never reused after a fault.
        let command = self.relay_command();
        self.heater.set_heat(command)?;
        self.relay_on = command;

        if self.state == ControllerState::Error {
            self.arbiter.request(AlarmPattern::Error);
        }
        self.arbiter.dispatch(&mut self.buzzer);

        Ok(self.snapshot())
    }

    /// Apply a setpoint event: fixed step, clamped to the safe range.
    ///
    /// Out-of-range adjustments clamp silently; boundary scrolling is normal
    /// use, not an error. Events in `Error` are ignored entirely.
    fn apply_event(&mut self, event: ButtonEvent) {
        if self.state == ControllerState::Error || event == ButtonEvent::None {
            return;
        }
        let step = self.config.setpoint_step_c;
        let next = match event {
            ButtonEvent::Increase => self.target_c + step,
            ButtonEvent::Decrease => self.target_c - step,
            ButtonEvent::None => self.target_c,
        };
        self.target_c = next.clamp(self.config.setpoint_min_c, self.config.setpoint_max_c);
        self.arbiter.request(AlarmPattern::ButtonTick);
    }

    /// Fold one sensor sample into the measurement and streak counters.
    fn book_sample(&mut self, sample: Result<f32, SensorFault>) {
        match sample {
            Ok(degrees_c) => {
                self.measurement = Some(Measurement {
                    degrees_c,
                    fresh: true,
                });
                self.fault_streak = 0;
                self.valid_streak = self.valid_streak.saturating_add(1);
                self.last_fault = None;
            }
            Err(fault) => {
                // Stale-reading fallback: keep the last value, mark it stale.
                if let Some(m) = self.measurement.as_mut() {
                    m.fresh = false;
                }
                self.fault_streak = self.fault_streak.saturating_add(1);
                self.valid_streak = 0;
                self.last_fault = Some(fault);
            }
        }
    }

    /// Advance the state machine for this tick.
    fn advance_state(&mut self) {
        // Fault escalation pre-empts everything, from any state.
        if self.state != ControllerState::Error && self.fault_streak >= self.config.fault_threshold
        {
            self.state = ControllerState::Error;
            return;
        }

        match self.state {
            ControllerState::Error => {
                // Terminal until a clean streak of valid readings.
                if self.valid_streak >= self.config.fault_threshold {
                    self.state = ControllerState::Idle;
                }
            }
            ControllerState::Idle => {
                if let Some(m) = self.measurement {
                    if self.target_c > m.degrees_c {
                        self.state = ControllerState::Heating;
                    }
                }
            }
            ControllerState::Heating => {
                if let Some(m) = self.measurement {
                    if self.band.reached(m.degrees_c, self.target_c) {
                        self.state = ControllerState::AtTarget;
                        self.arbiter.request(AlarmPattern::Confirm);
                    }
                }
            }
            ControllerState::AtTarget => {
                if let Some(m) = self.measurement {
                    if self.band.cooled_off(m.degrees_c, self.target_c) {
                        self.state = ControllerState::Heating;
                    }
                }
            }
        }
    }

    /// Relay command for the current tick.
    fn relay_command(&self) -> bool {
        let Some(m) = self.measurement else {
            return false;
        };
        match self.state {
            ControllerState::Idle | ControllerState::Error => false,
            ControllerState::Heating => self.band.heatup_command(m.degrees_c, self.target_c),
            ControllerState::AtTarget => {
                self.band
                    .hold_command(m.degrees_c, self.target_c, self.relay_on)
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current controller state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Current setpoint in degrees.
    pub fn target_c(&self) -> f32 {
        self.target_c
    }

    /// Latest measurement in degrees, if any reading has been taken.
    pub fn measured_c(&self) -> Option<f32> {
        self.measurement.map(|m| m.degrees_c)
    }

    /// Relay command written on the most recent tick.
    pub fn relay_on(&self) -> bool {
        self.relay_on
    }

    /// The most recent sensor fault, cleared by a valid reading.
    pub fn last_fault(&self) -> Option<SensorFault> {
        self.last_fault
    }

    /// Consistent view of the controller for read-only observers.
    pub fn snapshot(&self) -> BathSnapshot {
        BathSnapshot {
            measured_c: self.measured_c(),
            measurement_fresh: self.measurement.map(|m| m.fresh).unwrap_or(false),
            target_c: self.target_c,
            state: self.state,
        }
    }

    /// Get a reference to the heater.
    pub fn heater(&self) -> &H {
        &self.heater
    }

    /// Get a mutable reference to the heater.
    pub fn heater_mut(&mut self) -> &mut H {
        &mut self.heater
    }

    /// Get a reference to the buzzer.
    pub fn buzzer(&self) -> &Z {
        &self.buzzer
    }

    /// Get a mutable reference to the buzzer.
    pub fn buzzer_mut(&mut self) -> &mut Z {
        &mut self.buzzer
    }
}
