//! Display service: renders the frame carousel from published snapshots.
//!
//! [`DisplayRunner`] is the presentation adapter: a read-only observer that
//! polls the shared snapshot on its own cadence and renders whichever frame
//! the [`FrameRotation`] selects. Like telemetry, a render failure is logged
//! and dropped; the control loop never notices a dead display.

use std::sync::Arc;

use crate::traits::{BathDisplay, Buzzer, Frame, FrameRotation, HeaterSwitch};

use super::SharedBathState;

/// Drives a [`BathDisplay`] from the shared snapshot.
pub struct DisplayRunner<H, Z, D>
where
    H: HeaterSwitch,
    Z: Buzzer,
    D: BathDisplay,
{
    state: Arc<SharedBathState<H, Z>>,
    display: D,
    rotation: FrameRotation,
}

impl<H, Z, D> DisplayRunner<H, Z, D>
where
    H: HeaterSwitch,
    Z: Buzzer,
    D: BathDisplay,
    D::Error: core::fmt::Debug,
{
    /// Create a runner and initialize the display.
    pub fn new(
        state: Arc<SharedBathState<H, Z>>,
        mut display: D,
        rotation: FrameRotation,
    ) -> Result<Self, D::Error> {
        display.init()?;
        Ok(Self {
            state,
            display,
            rotation,
        })
    }

    /// Render one frame for the current time and snapshot.
    ///
    /// Returns the frame that was selected. Render errors are swallowed
    /// after logging; the adapter must tolerate unchanged values between
    /// polls, so a dropped frame costs nothing.
    pub fn render_once(&mut self) -> Frame {
        let snapshot = self.state.snapshot();
        let frame = self.rotation.select(self.state.now_ms(), &snapshot);
        if let Err(e) = self.display.render(frame, &snapshot) {
            println!("[Display] Render failed: {:?}", e);
        }
        frame
    }

    /// Get a reference to the display.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Get a mutable reference to the display.
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }
}
