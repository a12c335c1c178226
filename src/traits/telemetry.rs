//! Telemetry abstraction for publishing bath state to a remote store.
//!
//! The telemetry adapter is a read-only observer of the controller: on its
//! own cadence it takes the shared `(measured, target, state)` snapshot and
//! pushes it to a time-series backend. Publishing is fire-and-forget; a
//! failed publish must never feed back into the control loop.
//!
//! # Topics
//!
//! The bundled MQTT sink publishes:
//!
//! ```text
//! sousvide/measured  - Measured bath temperature (retained)
//! sousvide/target    - Current setpoint (retained)
//! sousvide/state     - Controller state name (retained)
//! sousvide/snapshot  - Full snapshot JSON (on change + heartbeat)
//! ```

/// Telemetry sink trait for publishing state samples.
///
/// This trait uses a **sync-first design** that works on embedded targets
/// (blocking or queue-backed I/O) and on desktop (wrapped in async). The
/// sink should queue or transmit without blocking the caller for longer
/// than a bounded, short time.
///
/// # Implementation Notes
///
/// - `publish` is best-effort; the caller discards errors after logging
/// - `is_connected` lets runners skip publish attempts while offline
/// - Reconnection is the implementation's concern, not the caller's
///
/// # Example
///
/// ```rust,ignore
/// use rs_sousvide::traits::TelemetrySink;
///
/// fn push_measured<S: TelemetrySink>(sink: &mut S, degrees: f32) {
///     let payload = format!("{:.1}", degrees);
///     let _ = sink.publish("sousvide/measured", payload.as_bytes(), true);
/// }
/// ```
pub trait TelemetrySink {
    /// Error type for publish operations.
    type Error;

    /// Publish a payload to a topic.
    ///
    /// # Arguments
    /// - `topic`: destination path in the remote store
    /// - `payload`: sample bytes
    /// - `retain`: if true, the store keeps the value for late readers
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), Self::Error>;

    /// Check if the sink currently has a working connection.
    fn is_connected(&self) -> bool;
}

/// Async extension trait for telemetry sinks (desktop/tokio usage).
///
/// Desktop implementations can implement both traits while embedded
/// targets only need the sync [`TelemetrySink`].
#[cfg(feature = "std")]
pub trait TelemetrySinkAsync: TelemetrySink {
    /// Publish a payload asynchronously.
    fn publish_async(
        &mut self,
        topic: &str,
        payload: &[u8],
        retain: bool,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}
