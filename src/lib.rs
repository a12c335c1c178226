//! # rs-sousvide
//!
//! A closed-loop thermal controller for a sous-vide appliance: it holds a
//! liquid bath at an operator-chosen setpoint by cycling a heating element
//! through a relay, fed by a contact temperature probe and two setpoint
//! buttons.
//!
//! ## Features
//!
//! - **Hardware abstraction**: Traits for the probe, relay, buttons, buzzer,
//!   and display, with mock implementations for desktop testing
//! - **Hysteresis relay policy**: Wide band for heat-up, narrow band for
//!   holding at target, no switching chatter inside the band
//! - **Fault escalation**: Stale-reading fallback for isolated sensor
//!   faults, forced relay-off `Error` state after a consecutive-fault streak
//! - **Debounced input**: Validated button edges with press-and-hold
//!   auto-repeat for fast setpoint scrolling
//! - **Read-only observers**: Display and telemetry consume tick-boundary
//!   snapshots and can never touch the control loop
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware, display, and telemetry abstractions
//! - `hysteresis` - Relay switching policy around the setpoint
//! - `sensor` - Gated sampling with sentinel and plausibility screening
//! - `input` - Button debouncing and auto-repeat
//! - `alarm` - Priority arbitration of buzzer tones
//! - `controller` - The state machine that ties everything together
//! - `hal` - Concrete implementations (mock for testing, `embedded-hal`
//!   GPIO drivers for hardware)
//! - `services` - Tick loop, display, and telemetry runners (`std`)
//!
//! ## Example
//!
//! ```rust
//! use rs_sousvide::{
//!     BathController, ControllerState,
//!     config::ControlConfig,
//!     hal::{MockBuzzer, MockRelay},
//!     input::ButtonEvent,
//! };
//!
//! // Create controller with mock actuators
//! let mut controller =
//!     BathController::new(MockRelay::new(), MockBuzzer::new(), ControlConfig::default());
//!
//! // Nudge the setpoint up one step
//! controller.tick(ButtonEvent::Increase, None).unwrap();
//! assert_eq!(controller.target_c(), 60.5);
//!
//! // Feed a reading below target: the bath starts heating
//! controller.tick(ButtonEvent::None, Some(Ok(21.0))).unwrap();
//! assert_eq!(controller.state(), ControllerState::Heating);
//! assert!(controller.relay_on());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Priority arbitration of buzzer tone requests.
pub mod alarm;
/// The control loop state machine and its snapshot type.
pub mod controller;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Hysteresis band policy for relay actuation.
pub mod hysteresis;
/// Button debouncing with press-and-hold auto-repeat.
pub mod input;
/// Gated temperature sampling with fault screening.
pub mod sensor;
/// Core traits for hardware, display, and telemetry abstraction.
pub mod traits;

/// Shared configuration system for desktop and embedded targets.
pub mod config;

/// Tick loop, display, and telemetry services (std-only).
#[cfg(feature = "std")]
pub mod services;

// Re-exports for convenience
pub use alarm::AlarmArbiter;
pub use config::Config;
pub use controller::{BathController, BathSnapshot, ControllerState};
pub use hysteresis::HysteresisBand;
pub use input::{ButtonEvent, Debouncer};
pub use sensor::SensorReader;
pub use traits::{
    // Hardware
    AlarmPattern,
    ButtonPins,
    Buzzer,
    Clock,
    HeaterSwitch,
    SensorFault,
    TemperatureProbe,
    // Display
    BathDisplay,
    Frame,
    FrameRotation,
    // Telemetry
    TelemetrySink,
};

#[cfg(feature = "std")]
pub use traits::TelemetrySinkAsync;
