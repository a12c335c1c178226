//! Periodic temperature sampling with sentinel and plausibility screening.
//!
//! The DS18B20-class probes this crate targets signal trouble in-band: a
//! disconnected sensor reads the `-127` sentinel, and a probe that lost power
//! mid-conversion reports its power-on-reset value of `85.0`. [`SensorReader`]
//! screens raw readings for these sentinels, applies the per-probe calibration
//! offset, and range-checks the result against the plausible bath window
//! before the controller ever sees it.
//!
//! Sampling is self-gated: the reader is polled every pass of the tick loop
//! but only touches the probe once per sample interval, because each 1-wire
//! conversion blocks the bus for most of a second at full resolution.
//!
//! # Example
//!
//! ```rust
//! use rs_sousvide::sensor::SensorReader;
//! use rs_sousvide::config::SensorConfig;
//! use rs_sousvide::hal::MockProbe;
//! use rs_sousvide::traits::SensorFault;
//!
//! let probe = MockProbe::new().queue_reading(55.2).queue_reading(-127.0);
//! let mut reader = SensorReader::new(probe, SensorConfig::default());
//!
//! assert_eq!(reader.poll(0), Some(Ok(55.2)));
//! assert_eq!(reader.poll(1_000), None); // not due yet
//! assert_eq!(reader.poll(5_000), Some(Err(SensorFault::Disconnected)));
//! ```

use crate::config::SensorConfig;
use crate::traits::{SensorFault, TemperatureProbe};

/// Raw reading at or below this is the 1-wire "no device" sentinel.
const DISCONNECTED_SENTINEL_C: f32 = -100.0;

/// DS18B20 power-on-reset value, reported when a conversion never ran.
const POWER_ON_RESET_C: f32 = 85.0;

/// Gated reader over a [`TemperatureProbe`].
///
/// Owns the probe and all sampling state; the control loop polls it every
/// pass and acts only when a sample comes back.
pub struct SensorReader<P: TemperatureProbe> {
    probe: P,
    config: SensorConfig,
    last_sample_at: Option<u64>,
}

impl<P: TemperatureProbe> SensorReader<P> {
    /// Create a reader over the given probe.
    pub fn new(probe: P, config: SensorConfig) -> Self {
        Self {
            probe,
            config,
            last_sample_at: None,
        }
    }

    /// Poll the reader; returns a sample only when one is due.
    ///
    /// - `None`: the sample interval has not elapsed, probe untouched
    /// - `Some(Ok(t))`: calibrated, plausibility-checked temperature
    /// - `Some(Err(fault))`: the probe or its reading failed screening
    ///
    /// The interval timer advances on faults too, so a dead probe is
    /// re-tried at the sampling cadence rather than hammered every pass.
    pub fn poll(&mut self, now_ms: u64) -> Option<Result<f32, SensorFault>> {
        if let Some(last) = self.last_sample_at {
            if now_ms.saturating_sub(last) < self.config.sample_interval_ms {
                return None;
            }
        }
        self.last_sample_at = Some(now_ms);
        Some(self.sample())
    }

    /// Take one reading immediately, bypassing the interval gate.
    ///
    /// Used at startup to seed the controller before the first interval
    /// elapses. Does not advance the interval timer.
    pub fn sample(&mut self) -> Result<f32, SensorFault> {
        let raw = self.probe.read_celsius()?;
        Self::screen(raw, &self.config)
    }

    fn screen(raw: f32, config: &SensorConfig) -> Result<f32, SensorFault> {
        // Sentinels are raw-bus values; screen before calibration.
        if raw <= DISCONNECTED_SENTINEL_C {
            return Err(SensorFault::Disconnected);
        }
        if raw == POWER_ON_RESET_C {
            return Err(SensorFault::ImplausibleReading);
        }

        let calibrated = raw + config.calibration_offset_c;
        if calibrated < config.plausible_min_c || calibrated > config.plausible_max_c {
            return Err(SensorFault::ImplausibleReading);
        }
        Ok(calibrated)
    }

    /// Get a reference to the probe.
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Get a mutable reference to the probe.
    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }
}
