//! Trait definitions for hardware abstraction, display, and telemetry.
//!
//! This module defines the core abstractions that allow rs-sousvide to:
//! - Run on different hardware (ESP-class boards, desktop mock)
//! - Render state on different displays
//! - Publish telemetry through different backends
//!
//! # Submodules
//!
//! - `hardware`: Temperature probe, relay, buttons, buzzer, clock
//! - `display`: Frame selection and display rendering trait
//! - `telemetry`: Telemetry sink trait for remote state publishing
//!
//! # Hardware Abstraction
//!
//! The key hardware traits are:
//!
//! - [`TemperatureProbe`]: Bath temperature readings with fault signaling
//! - [`HeaterSwitch`]: Polarity-corrected relay actuation
//! - [`ButtonPins`]: Raw levels of the two setpoint buttons
//! - [`Buzzer`]: Piezo tone patterns with fixed priorities
//! - [`Clock`]: Time source for `no_std` environments

pub mod display;
pub mod hardware;
pub mod telemetry;

pub use display::*;
pub use hardware::*;
pub use telemetry::*;
