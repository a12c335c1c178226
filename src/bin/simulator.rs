//! Desktop bath simulator.
//!
//! Runs the full control stack against a crude simulated water bath: a
//! probe that warms while the (simulated) relay is on and cools while it is
//! off. Useful for watching the state machine and relay policy behave
//! without any hardware attached.
//!
//! ```bash
//! cargo run --bin simulator
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rs_sousvide::config::Config;
use rs_sousvide::hal::MockButtons;
use rs_sousvide::input::Debouncer;
use rs_sousvide::sensor::SensorReader;
use rs_sousvide::services::{DisplayRunner, SharedBathState, TickLoop};
use rs_sousvide::traits::{
    BathDisplay, Buzzer, Frame, FrameRotation, HeaterSwitch, SensorFault, TemperatureProbe,
};
use rs_sousvide::{AlarmPattern, BathController, BathSnapshot};

/// Degrees gained per sample while the element is on.
const HEAT_RATE_C: f32 = 0.6;

/// Degrees lost per sample to the room.
const COOL_RATE_C: f32 = 0.05;

/// Simulated probe over a shared bath temperature.
struct SimProbe {
    bath_c: Arc<Mutex<f32>>,
    heat_on: Arc<AtomicBool>,
}

impl TemperatureProbe for SimProbe {
    fn read_celsius(&mut self) -> Result<f32, SensorFault> {
        let mut bath = self.bath_c.lock().unwrap();
        if self.heat_on.load(Ordering::Relaxed) {
            *bath += HEAT_RATE_C;
        } else {
            *bath = (*bath - COOL_RATE_C).max(20.0);
        }
        Ok(*bath)
    }
}

/// Simulated relay that just flips the shared flag the probe reads.
struct SimRelay {
    heat_on: Arc<AtomicBool>,
}

impl HeaterSwitch for SimRelay {
    type Error = std::convert::Infallible;

    fn set_heat(&mut self, on: bool) -> Result<(), Self::Error> {
        self.heat_on.store(on, Ordering::Relaxed);
        Ok(())
    }
}

/// Buzzer that beeps onto stdout.
struct ConsoleBuzzer;

impl Buzzer for ConsoleBuzzer {
    type Error = std::convert::Infallible;

    fn play(&mut self, pattern: AlarmPattern) -> Result<(), Self::Error> {
        println!("[Buzzer] {:?}", pattern);
        Ok(())
    }
}

/// Display that renders the carousel as terminal lines.
struct ConsoleDisplay;

impl BathDisplay for ConsoleDisplay {
    type Error = std::convert::Infallible;

    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn render(&mut self, frame: Frame, snapshot: &BathSnapshot) -> Result<(), Self::Error> {
        match frame {
            Frame::CurrentTemp => {
                let measured = snapshot
                    .measured_c
                    .map(|t| format!("{:.1}C", t))
                    .unwrap_or_else(|| "--.-".into());
                println!("[Display] now {} ({})", measured, snapshot.state.as_str());
            }
            Frame::TargetTemp => {
                println!("[Display] set {:.1}C", snapshot.target_c);
            }
            Frame::ErrorScreen => {
                println!("[Display] SENSOR ERROR - heater off");
            }
        }
        Ok(())
    }

    fn show_message(&mut self, line1: &str, line2: Option<&str>) -> Result<(), Self::Error> {
        println!("[Display] {} {}", line1, line2.unwrap_or(""));
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    println!();
    println!("================================");
    println!("  rs-sousvide bath simulator");
    println!("================================");
    println!();

    let config = Config::default();

    let heat_on = Arc::new(AtomicBool::new(false));
    let bath_c = Arc::new(Mutex::new(20.0));

    let probe = SimProbe {
        bath_c: Arc::clone(&bath_c),
        heat_on: Arc::clone(&heat_on),
    };
    let relay = SimRelay {
        heat_on: Arc::clone(&heat_on),
    };

    // Fast sampling so the simulated cook fits in a coffee break.
    let sensor_config = config.sensor.with_sample_interval_ms(200);
    let sensor = SensorReader::new(probe, sensor_config);
    let debouncer = Debouncer::new(MockButtons::new(), config.input);

    let controller = BathController::new(relay, ConsoleBuzzer, config.control);
    let state = Arc::new(SharedBathState::new(controller));

    let mut display = DisplayRunner::new(
        Arc::clone(&state),
        ConsoleDisplay,
        FrameRotation::new(2_000),
    )?;
    let display_handle = thread::spawn(move || loop {
        display.render_once();
        thread::sleep(Duration::from_millis(2_000));
    });

    let mut tick = TickLoop::new(
        Arc::clone(&state),
        sensor,
        debouncer,
        config.control.tick_interval_ms,
    );
    tick.run()?;

    let _ = display_handle.join();
    Ok(())
}
