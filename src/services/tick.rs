//! The tick loop service: one pass of input, sensing, control, and publish.
//!
//! [`TickLoop`] owns the feeders (sensor reader, button debouncer) and drives
//! the shared controller. Each pass runs strictly in order: debounce poll,
//! sensor poll, controller tick, snapshot publish. Nothing else writes
//! controller state.
//!
//! The loop runs at a short fixed period so button handling stays responsive;
//! the sensor reader gates itself down to its own sampling interval, and on
//! passes where no reading is due the controller ticks with `None`.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::controller::{BathSnapshot, ControllerState};
use crate::input::Debouncer;
use crate::sensor::SensorReader;
use crate::traits::{ButtonPins, Buzzer, HeaterSwitch, TemperatureProbe};

use super::SharedBathState;

// ============================================================================
// Tick Loop
// ============================================================================

/// Drives the controller from the probe and buttons at a fixed period.
pub struct TickLoop<P, B, H, Z>
where
    P: TemperatureProbe,
    B: ButtonPins,
    H: HeaterSwitch,
    Z: Buzzer,
{
    state: Arc<SharedBathState<H, Z>>,
    sensor: SensorReader<P>,
    debouncer: Debouncer<B>,
    tick_interval_ms: u32,
    last_logged_state: ControllerState,
}

impl<P, B, H, Z> TickLoop<P, B, H, Z>
where
    P: TemperatureProbe,
    B: ButtonPins,
    H: HeaterSwitch,
    H::Error: core::fmt::Debug,
    Z: Buzzer,
{
    /// Create a tick loop over the shared state and its feeders.
    pub fn new(
        state: Arc<SharedBathState<H, Z>>,
        sensor: SensorReader<P>,
        debouncer: Debouncer<B>,
        tick_interval_ms: u32,
    ) -> Self {
        Self {
            state,
            sensor,
            debouncer,
            tick_interval_ms,
            last_logged_state: ControllerState::Idle,
        }
    }

    /// Run exactly one tick pass and publish its snapshot.
    ///
    /// Order is the contract: debounce poll, sensor poll, controller tick,
    /// publish. A relay write failure aborts the pass before publish; the
    /// observers keep the previous tick's snapshot.
    pub fn run_once(&mut self) -> Result<BathSnapshot> {
        let now_ms = self.state.now_ms();

        let event = self.debouncer.poll(now_ms);
        let sample = self.sensor.poll(now_ms);

        if let Some(Err(fault)) = &sample {
            println!("[Tick] Sensor fault: {}", fault.as_str());
        }

        let snapshot = self
            .state
            .with_controller(|controller| controller.tick(event, sample))
            .map_err(|e| anyhow!("relay write failed: {:?}", e))?;

        self.state.publish_snapshot(snapshot);
        self.log_transition(&snapshot);

        Ok(snapshot)
    }

    /// Run the loop until a relay write fails.
    ///
    /// Blocks the calling thread, sleeping out the remainder of each tick
    /// period. Observers run on their own threads against the shared state.
    pub fn run(&mut self) -> Result<()> {
        println!(
            "[Tick] Control loop running at {}ms per pass",
            self.tick_interval_ms
        );
        loop {
            self.run_once()?;
            thread::sleep(Duration::from_millis(u64::from(self.tick_interval_ms)));
        }
    }

    fn log_transition(&mut self, snapshot: &BathSnapshot) {
        if snapshot.state != self.last_logged_state {
            println!(
                "[Tick] {} -> {} (measured: {}, target: {:.1})",
                self.last_logged_state.as_str(),
                snapshot.state.as_str(),
                snapshot
                    .measured_c
                    .map(|t| format!("{:.1}", t))
                    .unwrap_or_else(|| "none".into()),
                snapshot.target_c
            );
            self.last_logged_state = snapshot.state;
        }
    }

    /// Get a reference to the sensor reader.
    pub fn sensor(&self) -> &SensorReader<P> {
        &self.sensor
    }

    /// Get a mutable reference to the sensor reader.
    pub fn sensor_mut(&mut self) -> &mut SensorReader<P> {
        &mut self.sensor
    }

    /// Get a mutable reference to the debouncer.
    pub fn debouncer_mut(&mut self) -> &mut Debouncer<B> {
        &mut self.debouncer
    }

    /// Get the shared state handle.
    pub fn shared(&self) -> Arc<SharedBathState<H, Z>> {
        Arc::clone(&self.state)
    }
}
