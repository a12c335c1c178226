//! Telemetry service: publishes bath state to a remote store.
//!
//! Two layers:
//!
//! - [`TelemetryRunner`] is sink-agnostic: it watches the shared snapshot
//!   through change detection and pushes values into any [`TelemetrySink`].
//! - [`MqttTelemetryService`] (behind the `telemetry` feature) wires the
//!   runner to a `rumqttc` client with reconnect handling and a heartbeat.
//!
//! **Publish Topics:**
//! - `sousvide/measured` - Measured bath temperature (retained)
//! - `sousvide/target` - Current setpoint (retained)
//! - `sousvide/state` - Controller state name (retained)
//! - `sousvide/snapshot` - Full snapshot JSON (on change + heartbeat)
//!
//! Publishing is strictly fire-and-forget: the runner is a read-only
//! observer, and a failed or skipped publish never reaches the control loop.

use std::sync::Arc;

use crate::config::TelemetryConfig;
use crate::controller::BathSnapshot;
use crate::traits::{Buzzer, HeaterSwitch, TelemetrySink};

use super::SharedBathState;

// ============================================================================
// JSON encoding
// ============================================================================

/// Encode a snapshot as the `snapshot` topic payload.
pub fn snapshot_to_json(snapshot: &BathSnapshot) -> String {
    let measured = snapshot
        .measured_c
        .map(|t| format!("{:.1}", t))
        .unwrap_or_else(|| "null".into());

    format!(
        r#"{{"measured":{},"measurement_fresh":{},"target":{:.1},"state":"{}"}}"#,
        measured, snapshot.measurement_fresh, snapshot.target_c, snapshot.state.as_str()
    )
}

// ============================================================================
// Telemetry Runner
// ============================================================================

/// Sink-agnostic telemetry publisher.
///
/// Poll [`publish_if_changed`](Self::publish_if_changed) on the service's own
/// cadence and call [`publish_snapshot`](Self::publish_snapshot) for forced
/// heartbeats. The runner never touches the controller, only the published
/// snapshot.
pub struct TelemetryRunner<H, Z, C>
where
    H: HeaterSwitch,
    Z: Buzzer,
    C: TelemetrySink,
{
    state: Arc<SharedBathState<H, Z>>,
    sink: C,
    config: TelemetryConfig,
}

impl<H, Z, C> TelemetryRunner<H, Z, C>
where
    H: HeaterSwitch,
    Z: Buzzer,
    C: TelemetrySink,
{
    /// Create a new telemetry runner.
    pub fn new(state: Arc<SharedBathState<H, Z>>, sink: C, config: TelemetryConfig) -> Self {
        Self {
            state,
            sink,
            config,
        }
    }

    /// Get a reference to the sink.
    pub fn sink(&self) -> &C {
        &self.sink
    }

    /// Get a mutable reference to the sink.
    pub fn sink_mut(&mut self) -> &mut C {
        &mut self.sink
    }

    /// Publish the current snapshot if it changed since the last publish.
    ///
    /// Returns `true` if something went out. Skips silently while the sink
    /// is offline; the change stays pending in the detection state until a
    /// publish actually succeeds... which is the next connected call.
    pub fn publish_if_changed(&mut self) -> Result<bool, C::Error> {
        if !self.sink.is_connected() {
            return Ok(false);
        }
        let Some(snapshot) = self.state.check_changes() else {
            return Ok(false);
        };
        self.publish(&snapshot)?;
        Ok(true)
    }

    /// Force publish the current snapshot (heartbeat).
    pub fn publish_snapshot(&mut self) -> Result<(), C::Error> {
        let snapshot = self.state.snapshot();
        self.publish(&snapshot)?;
        self.state.sync_change_detection();
        Ok(())
    }

    fn publish(&mut self, snapshot: &BathSnapshot) -> Result<(), C::Error> {
        // Full snapshot JSON, not retained
        let json = snapshot_to_json(snapshot);
        let topic = self.topic("snapshot");
        self.sink.publish(&topic, json.as_bytes(), false)?;

        // Individual values as retained for late-joining dashboards
        if let Some(measured) = snapshot.measured_c {
            let value = format!("{:.1}", measured);
            let topic = self.topic("measured");
            self.sink.publish(&topic, value.as_bytes(), true)?;
        }

        let value = format!("{:.1}", snapshot.target_c);
        let topic = self.topic("target");
        self.sink.publish(&topic, value.as_bytes(), true)?;

        let topic = self.topic("state");
        self.sink
            .publish(&topic, snapshot.state.as_str().as_bytes(), true)?;

        Ok(())
    }

    /// Build a full topic path.
    fn topic(&self, suffix: &str) -> String {
        format!("{}/{}", self.config.topic_prefix, suffix)
    }
}

// ============================================================================
// MQTT service (rumqttc)
// ============================================================================

#[cfg(feature = "telemetry")]
pub use mqtt::{MqttSink, MqttTelemetryService, TelemetryRuntimeConfig};

#[cfg(feature = "telemetry")]
mod mqtt {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use anyhow::Result;
    use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};

    use crate::config::TelemetryConfig;
    use crate::traits::{Buzzer, HeaterSwitch, TelemetrySink, TelemetrySinkAsync};

    use super::super::SharedBathState;
    use super::TelemetryRunner;

    /// Runtime MQTT configuration for `rumqttc`.
    ///
    /// Uses `String` for runtime compatibility with the library; convert
    /// from the fixed-size [`TelemetryConfig`] with
    /// [`TelemetryRuntimeConfig::from_config`].
    #[derive(Debug, Clone)]
    pub struct TelemetryRuntimeConfig {
        /// MQTT broker hostname
        pub host: String,
        /// MQTT broker port
        pub port: u16,
        /// Client ID
        pub client_id: String,
        /// Heartbeat interval in milliseconds
        pub heartbeat_ms: u64,
        /// Keep-alive interval in seconds
        pub keep_alive_secs: u16,
        /// Optional username/password
        pub credentials: Option<(String, String)>,
    }

    impl Default for TelemetryRuntimeConfig {
        fn default() -> Self {
            Self {
                host: "localhost".to_string(),
                port: 1883,
                client_id: "rs-sousvide".to_string(),
                heartbeat_ms: 5000,
                keep_alive_secs: 30,
                credentials: None,
            }
        }
    }

    impl TelemetryRuntimeConfig {
        /// Create a new config with the given broker address
        pub fn new(host: impl Into<String>, port: u16) -> Self {
            Self {
                host: host.into(),
                port,
                ..Default::default()
            }
        }

        /// Create from the shared TelemetryConfig
        pub fn from_config(config: &TelemetryConfig) -> Self {
            let credentials = config
                .has_auth()
                .then(|| (config.username.as_str().into(), config.password.as_str().into()));
            Self {
                host: config.host.as_str().to_string(),
                port: config.port,
                client_id: config.client_id.as_str().to_string(),
                heartbeat_ms: u64::from(config.heartbeat_ms),
                keep_alive_secs: config.keep_alive_secs,
                credentials,
            }
        }

        /// Set the client ID
        pub fn client_id(mut self, id: impl Into<String>) -> Self {
            self.client_id = id.into();
            self
        }

        /// Set the heartbeat interval
        pub fn heartbeat_ms(mut self, ms: u64) -> Self {
            self.heartbeat_ms = ms;
            self
        }
    }

    /// [`TelemetrySink`] over a `rumqttc` async client.
    ///
    /// The sync `publish` path uses `try_publish`, which only queues into
    /// the client's channel and never blocks the caller.
    pub struct MqttSink {
        client: AsyncClient,
        connected: Arc<AtomicBool>,
    }

    impl MqttSink {
        /// Wrap a client with a connection flag owned by the event loop task.
        pub fn new(client: AsyncClient, connected: Arc<AtomicBool>) -> Self {
            Self { client, connected }
        }
    }

    impl TelemetrySink for MqttSink {
        type Error = rumqttc::ClientError;

        fn publish(
            &mut self,
            topic: &str,
            payload: &[u8],
            retain: bool,
        ) -> Result<(), Self::Error> {
            self.client
                .try_publish(topic, QoS::AtLeastOnce, retain, payload)
        }

        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::Relaxed)
        }
    }

    impl TelemetrySinkAsync for MqttSink {
        async fn publish_async(
            &mut self,
            topic: &str,
            payload: &[u8],
            retain: bool,
        ) -> Result<(), Self::Error> {
            self.client
                .publish(topic, QoS::AtLeastOnce, retain, payload)
                .await
        }
    }

    /// MQTT telemetry service for the bath controller.
    ///
    /// Owns the broker connection and drives a [`TelemetryRunner`] against
    /// the shared state: publish on change, heartbeat on the configured
    /// interval, reconnect with backoff when the broker drops.
    pub struct MqttTelemetryService<H, Z>
    where
        H: HeaterSwitch + Send + 'static,
        Z: Buzzer + Send + 'static,
    {
        state: Arc<SharedBathState<H, Z>>,
        config: TelemetryConfig,
    }

    impl<H, Z> MqttTelemetryService<H, Z>
    where
        H: HeaterSwitch + Send + 'static,
        Z: Buzzer + Send + 'static,
    {
        /// Create a service over the shared state.
        pub fn new(state: Arc<SharedBathState<H, Z>>, config: TelemetryConfig) -> Self {
            Self { state, config }
        }

        /// Run the telemetry service.
        ///
        /// Blocks (asynchronously) until the tokio runtime shuts down. All
        /// publish failures are logged and dropped; nothing here can stall
        /// the tick loop.
        pub async fn run(self) -> Result<()> {
            let runtime = TelemetryRuntimeConfig::from_config(&self.config);

            let mut options =
                MqttOptions::new(&runtime.client_id, &runtime.host, runtime.port);
            options.set_keep_alive(Duration::from_secs(u64::from(runtime.keep_alive_secs)));
            if let Some((user, pass)) = &runtime.credentials {
                options.set_credentials(user.clone(), pass.clone());
            }

            let (client, mut eventloop) = AsyncClient::new(options, 10);
            let connected = Arc::new(AtomicBool::new(false));

            println!(
                "[Telemetry] Connecting to {}:{} as {}",
                runtime.host, runtime.port, runtime.client_id
            );

            // Event loop driver: tracks connection state, backs off on error.
            let connected_for_loop = Arc::clone(&connected);
            tokio::spawn(async move {
                loop {
                    match eventloop.poll().await {
                        Ok(Event::Incoming(Packet::ConnAck(_))) => {
                            connected_for_loop.store(true, Ordering::Relaxed);
                            println!("[Telemetry] Connected");
                        }
                        Ok(_) => {}
                        Err(e) => {
                            if connected_for_loop.swap(false, Ordering::Relaxed) {
                                println!("[Telemetry] Connection lost: {}", e);
                            }
                            tokio::time::sleep(Duration::from_secs(5)).await;
                        }
                    }
                }
            });

            let sink = MqttSink::new(client, connected);
            let mut runner = TelemetryRunner::new(self.state, sink, self.config.clone());

            let poll_period = Duration::from_millis(250);
            let heartbeat_every = (runtime.heartbeat_ms.max(250) / 250).max(1);
            let mut interval = tokio::time::interval(poll_period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut polls: u64 = 0;

            loop {
                interval.tick().await;
                polls = polls.wrapping_add(1);

                if polls % heartbeat_every == 0 {
                    if runner.sink().is_connected() {
                        if let Err(e) = runner.publish_snapshot() {
                            println!("[Telemetry] Heartbeat publish failed: {}", e);
                        }
                    }
                } else if let Err(e) = runner.publish_if_changed() {
                    println!("[Telemetry] Publish failed: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlConfig;
    use crate::controller::ControllerState;
    use crate::hal::{MockBuzzer, MockRelay, MockTelemetry};
    use crate::input::ButtonEvent;
    use crate::BathController;

    fn setup() -> (
        Arc<SharedBathState<MockRelay, MockBuzzer>>,
        TelemetryRunner<MockRelay, MockBuzzer, MockTelemetry>,
    ) {
        let controller =
            BathController::new(MockRelay::new(), MockBuzzer::new(), ControlConfig::default());
        let state = Arc::new(SharedBathState::new(controller));
        // Baseline the detection so only real ticks count as changes.
        state.sync_change_detection();
        let runner = TelemetryRunner::new(
            Arc::clone(&state),
            MockTelemetry::new(),
            TelemetryConfig::default(),
        );
        (state, runner)
    }

    fn tick(state: &SharedBathState<MockRelay, MockBuzzer>, measured: f32) {
        let snap = state
            .with_controller(|c| c.tick(ButtonEvent::None, Some(Ok(measured))))
            .unwrap();
        state.publish_snapshot(snap);
    }

    #[test]
    fn publishes_on_change_only() {
        let (state, mut runner) = setup();

        assert!(!runner.publish_if_changed().unwrap());

        tick(&state, 41.5);
        assert!(runner.publish_if_changed().unwrap());
        assert!(!runner.publish_if_changed().unwrap());

        let sink = runner.sink();
        assert_eq!(sink.published_to("sousvide/measured").len(), 1);
        assert_eq!(sink.published_to("sousvide/state").len(), 1);
    }

    #[test]
    fn retained_values_and_snapshot_payloads() {
        let (state, mut runner) = setup();
        tick(&state, 41.5);
        runner.publish_if_changed().unwrap();

        let sink = runner.sink();
        let measured = sink.published_to("sousvide/measured");
        assert_eq!(measured[0].1, b"41.5");
        assert!(measured[0].2); // retained

        let snapshot = sink.published_to("sousvide/snapshot");
        let json = String::from_utf8(snapshot[0].1.clone()).unwrap();
        assert_eq!(
            json,
            r#"{"measured":41.5,"measurement_fresh":true,"target":60.0,"state":"heating"}"#
        );
        assert!(!snapshot[0].2); // not retained
    }

    #[test]
    fn heartbeat_publishes_unchanged_state() {
        let (_state, mut runner) = setup();

        runner.publish_snapshot().unwrap();
        runner.publish_snapshot().unwrap();
        assert_eq!(runner.sink().published_to("sousvide/snapshot").len(), 2);

        // Heartbeat synced detection: no change event follows.
        assert!(!runner.publish_if_changed().unwrap());
    }

    #[test]
    fn offline_sink_skips_without_consuming_the_change() {
        let (state, mut runner) = setup();
        tick(&state, 41.5);

        runner.sink_mut().connected = false;
        assert!(!runner.publish_if_changed().unwrap());
        assert!(runner.sink().published.is_empty());

        // Back online: the pending change goes out.
        runner.sink_mut().connected = true;
        assert!(runner.publish_if_changed().unwrap());
    }

    #[test]
    fn missing_measurement_serializes_as_null() {
        let (state, _runner) = setup();
        let json = snapshot_to_json(&state.snapshot());
        assert_eq!(
            json,
            r#"{"measured":null,"measurement_fresh":false,"target":60.0,"state":"idle"}"#
        );
    }

    #[test]
    fn publish_failure_does_not_touch_controller_state() {
        let (state, mut runner) = setup();
        tick(&state, 41.5);

        runner.sink_mut().fail_next = true;
        assert!(runner.publish_if_changed().is_err());

        // The control side is untouched by the failed publish.
        assert_eq!(state.snapshot().state, ControllerState::Heating);
        assert_eq!(state.snapshot().measured_c, Some(41.5));
    }
}
