//! Services around the core control loop.
//!
//! This module wires the controller to the outside world on desktop-class
//! targets:
//! - `tick`: the single-writer control loop pass
//! - `display`: presentation adapter rendering the frame carousel
//! - `telemetry`: change-driven publishing to a remote store (the
//!   `telemetry` feature adds the MQTT backend)
//!
//! All services share one controller through `SharedBathState` wrapped in
//! `Arc`; the tick loop is the only writer, everything else observes
//! tick-boundary snapshots.
//!
//! # Shared State Pattern
//!
//! ```ignore
//! use std::sync::Arc;
//! use rs_sousvide::services::{SharedBathState, TickLoop, TelemetryRunner};
//!
//! // Create single shared state
//! let state = Arc::new(SharedBathState::new(controller));
//!
//! // Tick loop writes; display and telemetry observe
//! let mut tick = TickLoop::new(Arc::clone(&state), sensor, debouncer, 50);
//! let mut telemetry = TelemetryRunner::new(Arc::clone(&state), sink, config);
//! ```

pub mod display;
pub mod shared;
pub mod telemetry;
pub mod tick;

pub use display::*;
pub use shared::*;
pub use telemetry::*;
pub use tick::*;
