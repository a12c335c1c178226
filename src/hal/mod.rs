//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `gpio`: Portable drivers over `embedded-hal` digital pins (requires
//!   the `embedded-hal` feature)

pub mod mock;

#[cfg(feature = "embedded-hal")]
pub mod gpio;

pub use mock::*;

#[cfg(feature = "embedded-hal")]
pub use gpio::*;
