//! Portable GPIO-backed drivers over `embedded-hal` digital pins.
//!
//! These adapters wire the hardware traits to any board with an
//! `embedded-hal` 1.0 implementation: a relay on one output pin, the two
//! setpoint buttons on input pins, and a piezo on an output pin. Signal
//! polarity lives here so the control loop only ever deals in logical
//! "heat on" / "pressed" values.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::traits::{AlarmPattern, ButtonPins, Buzzer, HeaterSwitch};

// ============================================================================
// Relay
// ============================================================================

/// Relay driver on a single digital output pin.
///
/// Many relay boards assert on a low level; `active_low` keeps that wiring
/// detail out of the controller.
pub struct GpioRelay<P: OutputPin> {
    pin: P,
    active_low: bool,
}

impl<P: OutputPin> GpioRelay<P> {
    /// Create a driver for a board that asserts on a high level.
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            active_low: false,
        }
    }

    /// Create a driver for a board that asserts on a low level.
    pub fn active_low(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
        }
    }

    /// Release the underlying pin.
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> HeaterSwitch for GpioRelay<P> {
    type Error = P::Error;

    fn set_heat(&mut self, on: bool) -> Result<(), Self::Error> {
        if on != self.active_low {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        }
    }
}

// ============================================================================
// Buttons
// ============================================================================

/// Setpoint button pair on two digital input pins.
///
/// With the usual internal pull-up wiring a pressed button reads low; pass
/// `pressed_low = true` for that arrangement. A pin read error counts as
/// "not pressed", which the debounce window then absorbs as bounce.
pub struct GpioButtons<I, D>
where
    I: InputPin,
    D: InputPin,
{
    increase: I,
    decrease: D,
    pressed_low: bool,
}

impl<I, D> GpioButtons<I, D>
where
    I: InputPin,
    D: InputPin,
{
    /// Create a button pair with the given input polarity.
    pub fn new(increase: I, decrease: D, pressed_low: bool) -> Self {
        Self {
            increase,
            decrease,
            pressed_low,
        }
    }

    /// Create a button pair wired to ground through internal pull-ups.
    pub fn pull_up(increase: I, decrease: D) -> Self {
        Self::new(increase, decrease, true)
    }
}

impl<I, D> ButtonPins for GpioButtons<I, D>
where
    I: InputPin,
    D: InputPin,
{
    fn increase_pressed(&mut self) -> bool {
        self.increase
            .is_low()
            .map(|low| low == self.pressed_low)
            .unwrap_or(false)
    }

    fn decrease_pressed(&mut self) -> bool {
        self.decrease
            .is_low()
            .map(|low| low == self.pressed_low)
            .unwrap_or(false)
    }
}

// ============================================================================
// Buzzer
// ============================================================================

/// Piezo driver on an output pin with a delay source for beep timing.
///
/// Patterns are short fixed beep sequences; the longest (error) takes under
/// half a second, bounded well inside a tick period.
pub struct GpioBuzzer<P: OutputPin, D: DelayNs> {
    pin: P,
    delay: D,
}

impl<P: OutputPin, D: DelayNs> GpioBuzzer<P, D> {
    /// Create a buzzer driver.
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    fn beep(&mut self, duration_ms: u32) -> Result<(), P::Error> {
        self.pin.set_high()?;
        self.delay.delay_ms(duration_ms);
        self.pin.set_low()?;
        Ok(())
    }
}

impl<P: OutputPin, D: DelayNs> Buzzer for GpioBuzzer<P, D> {
    type Error = P::Error;

    fn play(&mut self, pattern: AlarmPattern) -> Result<(), Self::Error> {
        match pattern {
            AlarmPattern::ButtonTick => self.beep(10),
            AlarmPattern::Confirm => {
                self.beep(60)?;
                self.delay.delay_ms(60);
                self.beep(60)
            }
            AlarmPattern::Error => {
                for _ in 0..3 {
                    self.beep(100)?;
                    self.delay.delay_ms(50);
                }
                Ok(())
            }
        }
    }
}
