//! Shared configuration system for desktop and ESP-class targets.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! # Example
//!
//! ```rust
//! use rs_sousvide::config::{Config, ControlConfig, TelemetryConfig};
//!
//! // Use defaults
//! let config = Config::default();
//!
//! // Or customize
//! let config = Config::default()
//!     .with_control(ControlConfig::default().with_default_target_c(58.0))
//!     .with_telemetry(TelemetryConfig::default().with_host("192.168.1.100"));
//! ```

use heapless::String as HString;

/// Maximum length for short config strings (hostnames, client IDs)
pub const MAX_SHORT_STRING: usize = 64;

/// Maximum length for longer config strings (topic prefixes, paths)
pub const MAX_LONG_STRING: usize = 128;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for longer config strings
pub type LongString = HString<MAX_LONG_STRING>;

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    // Take only what fits
    let take = s.len().min(MAX_SHORT_STRING);
    // Find valid UTF-8 boundary
    let valid_end = s
        .char_indices()
        .take_while(|(i, _)| *i < take)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

/// Create a LongString from a &str, truncating if too long
pub fn long_string(s: &str) -> LongString {
    let mut hs = LongString::new();
    let take = s.len().min(MAX_LONG_STRING);
    let valid_end = s
        .char_indices()
        .take_while(|(i, _)| *i < take)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// WiFi connection configuration
    pub wifi: WifiConfig,
    /// Telemetry (MQTT) configuration
    pub telemetry: TelemetryConfig,
    /// Control loop configuration
    pub control: ControlConfig,
    /// Sensor sampling configuration
    pub sensor: SensorConfig,
    /// Button input configuration
    pub input: InputConfig,
    /// Display frame rotation configuration
    pub display: DisplayConfig,
    /// Device identification
    pub device: DeviceConfig,
}

impl Config {
    /// Set WiFi configuration
    pub fn with_wifi(mut self, wifi: WifiConfig) -> Self {
        self.wifi = wifi;
        self
    }

    /// Set telemetry configuration
    pub fn with_telemetry(mut self, telemetry: TelemetryConfig) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Set control loop configuration
    pub fn with_control(mut self, control: ControlConfig) -> Self {
        self.control = control;
        self
    }

    /// Set sensor configuration
    pub fn with_sensor(mut self, sensor: SensorConfig) -> Self {
        self.sensor = sensor;
        self
    }

    /// Set input configuration
    pub fn with_input(mut self, input: InputConfig) -> Self {
        self.input = input;
        self
    }

    /// Set display configuration
    pub fn with_display(mut self, display: DisplayConfig) -> Self {
        self.display = display;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }
}

// ============================================================================
// Control Config
// ============================================================================

/// Control loop configuration.
///
/// Band widths and the fault threshold are deployment calibration; the
/// defaults trade overshoot against relay switching frequency on a typical
/// immersion heater.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlConfig {
    /// Setpoint change per button event, in degrees
    pub setpoint_step_c: f32,
    /// Lower bound of the safe setpoint range, in degrees
    pub setpoint_min_c: f32,
    /// Upper bound of the safe setpoint range, in degrees
    pub setpoint_max_c: f32,
    /// Setpoint at startup, in degrees
    pub default_target_c: f32,
    /// Switching margin below target while heating, in degrees
    pub hysteresis_low_c: f32,
    /// Cool-off distance below target that restarts heat-up, in degrees
    pub hysteresis_high_c: f32,
    /// Consecutive sensor faults before the controller enters Error
    /// (and consecutive valid readings required to leave it)
    pub fault_threshold: u8,
    /// Tick loop pass interval in milliseconds
    pub tick_interval_ms: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            setpoint_step_c: 0.5,
            setpoint_min_c: 20.0,
            setpoint_max_c: 95.0,
            default_target_c: 60.0,
            hysteresis_low_c: 0.5,
            hysteresis_high_c: 2.0,
            fault_threshold: 3,
            tick_interval_ms: 50,
        }
    }
}

impl ControlConfig {
    /// Set the setpoint step
    pub fn with_setpoint_step_c(mut self, step: f32) -> Self {
        self.setpoint_step_c = step.max(0.0);
        self
    }

    /// Set the safe setpoint range
    pub fn with_setpoint_range_c(mut self, min: f32, max: f32) -> Self {
        self.setpoint_min_c = min;
        self.setpoint_max_c = max.max(min);
        self
    }

    /// Set the startup setpoint
    pub fn with_default_target_c(mut self, target: f32) -> Self {
        self.default_target_c = target;
        self
    }

    /// Set the hysteresis band widths
    pub fn with_hysteresis_c(mut self, low: f32, high: f32) -> Self {
        self.hysteresis_low_c = low;
        self.hysteresis_high_c = high;
        self
    }

    /// Set the fault streak threshold (minimum 1)
    pub fn with_fault_threshold(mut self, threshold: u8) -> Self {
        self.fault_threshold = threshold.max(1);
        self
    }

    /// Set the tick interval
    pub fn with_tick_interval_ms(mut self, ms: u32) -> Self {
        self.tick_interval_ms = ms;
        self
    }
}

// ============================================================================
// Sensor Config
// ============================================================================

/// Sensor sampling configuration
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorConfig {
    /// Milliseconds between probe conversions; must exceed the probe's
    /// worst-case conversion time
    pub sample_interval_ms: u64,
    /// Per-probe calibration offset added to each raw reading, in degrees
    pub calibration_offset_c: f32,
    /// Lowest calibrated reading considered plausible for a bath, in degrees
    pub plausible_min_c: f32,
    /// Highest calibrated reading considered plausible for a bath, in degrees
    pub plausible_max_c: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 5000,
            calibration_offset_c: 0.0,
            plausible_min_c: 0.0,
            plausible_max_c: 110.0,
        }
    }
}

impl SensorConfig {
    /// Set the sampling interval
    pub fn with_sample_interval_ms(mut self, ms: u64) -> Self {
        self.sample_interval_ms = ms;
        self
    }

    /// Set the calibration offset
    pub fn with_calibration_offset_c(mut self, offset: f32) -> Self {
        self.calibration_offset_c = offset;
        self
    }

    /// Set the plausible reading range
    pub fn with_plausible_range_c(mut self, min: f32, max: f32) -> Self {
        self.plausible_min_c = min;
        self.plausible_max_c = max.max(min);
        self
    }
}

// ============================================================================
// Input Config
// ============================================================================

/// Button debounce and auto-repeat configuration
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputConfig {
    /// Milliseconds a level must hold stable before it counts
    pub debounce_ms: u64,
    /// Milliseconds a press must hold before auto-repeat starts
    pub hold_ms: u64,
    /// Milliseconds between auto-repeat events
    pub repeat_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 30,
            hold_ms: 600,
            repeat_ms: 150,
        }
    }
}

impl InputConfig {
    /// Set the debounce window
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Set the hold threshold
    pub fn with_hold_ms(mut self, ms: u64) -> Self {
        self.hold_ms = ms;
        self
    }

    /// Set the repeat rate (minimum 1ms)
    pub fn with_repeat_ms(mut self, ms: u64) -> Self {
        self.repeat_ms = ms.max(1);
        self
    }
}

// ============================================================================
// Telemetry Config
// ============================================================================

/// Telemetry (MQTT) configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TelemetryConfig {
    /// Broker hostname or IP
    pub host: ShortString,
    /// Broker port
    pub port: u16,
    /// Client ID (should be unique per device)
    pub client_id: ShortString,
    /// Topic prefix for all publishes (e.g., "sousvide" -> "sousvide/measured")
    pub topic_prefix: ShortString,
    /// Username for authentication (empty = no auth)
    pub username: ShortString,
    /// Password for authentication
    pub password: ShortString,
    /// Heartbeat/snapshot publish interval in milliseconds
    pub heartbeat_ms: u32,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u16,
    /// Whether telemetry is enabled
    pub enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            host: short_string("localhost"),
            port: 1883,
            client_id: short_string("rs-sousvide"),
            topic_prefix: short_string("sousvide"),
            username: ShortString::new(),
            password: ShortString::new(),
            heartbeat_ms: 5000,
            keep_alive_secs: 30,
            enabled: true,
        }
    }
}

impl TelemetryConfig {
    /// Set the broker host
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = short_string(host);
        self
    }

    /// Set the broker port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the client ID
    pub fn with_client_id(mut self, id: &str) -> Self {
        self.client_id = short_string(id);
        self
    }

    /// Set the topic prefix
    pub fn with_topic_prefix(mut self, prefix: &str) -> Self {
        self.topic_prefix = short_string(prefix);
        self
    }

    /// Set authentication credentials
    pub fn with_auth(mut self, username: &str, password: &str) -> Self {
        self.username = short_string(username);
        self.password = short_string(password);
        self
    }

    /// Set the heartbeat interval
    pub fn with_heartbeat_ms(mut self, ms: u32) -> Self {
        self.heartbeat_ms = ms;
        self
    }

    /// Enable or disable telemetry
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Build a topic string with the configured prefix
    pub fn topic(&self, suffix: &str) -> LongString {
        let mut topic = LongString::new();
        let _ = topic.push_str(self.topic_prefix.as_str());
        let _ = topic.push('/');
        let _ = topic.push_str(suffix);
        topic
    }

    /// Check if authentication is configured
    pub fn has_auth(&self) -> bool {
        !self.username.is_empty()
    }
}

// ============================================================================
// Display Config
// ============================================================================

/// Display frame rotation configuration
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayConfig {
    /// Milliseconds each carousel frame stays on screen
    pub frame_period_ms: u64,
    /// Whether a display is attached
    pub enabled: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            frame_period_ms: 7000,
            enabled: true,
        }
    }
}

impl DisplayConfig {
    /// Set the frame period
    pub fn with_frame_period_ms(mut self, ms: u64) -> Self {
        self.frame_period_ms = ms.max(1);
        self
    }

    /// Enable or disable the display
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

// ============================================================================
// WiFi Config
// ============================================================================

/// WiFi connection configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WifiConfig {
    /// Network SSID
    pub ssid: ShortString,
    /// Network password
    pub password: ShortString,
    /// Whether WiFi is enabled (false = offline operation)
    pub enabled: bool,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: ShortString::new(),
            password: ShortString::new(),
            enabled: false,
        }
    }
}

impl WifiConfig {
    /// Set network credentials
    pub fn with_credentials(mut self, ssid: &str, password: &str) -> Self {
        self.ssid = short_string(ssid);
        self.password = short_string(password);
        self
    }

    /// Enable or disable WiFi
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Human-readable device name
    pub name: ShortString,
    /// Where this cooker lives (kitchen, workshop...)
    pub location: ShortString,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("sousvide"),
            location: ShortString::new(),
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }

    /// Set the device location
    pub fn with_location(mut self, location: &str) -> Self {
        self.location = short_string(location);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let config = Config::default();
        assert!(config.control.setpoint_min_c < config.control.setpoint_max_c);
        assert!(config.control.default_target_c >= config.control.setpoint_min_c);
        assert!(config.control.default_target_c <= config.control.setpoint_max_c);
        assert!(config.control.hysteresis_low_c <= config.control.hysteresis_high_c);
        assert!(config.sensor.plausible_min_c < config.sensor.plausible_max_c);
        assert!(!config.wifi.enabled);
    }

    #[test]
    fn builder_chains() {
        let config = Config::default()
            .with_control(
                ControlConfig::default()
                    .with_default_target_c(58.0)
                    .with_hysteresis_c(0.3, 1.5),
            )
            .with_telemetry(
                TelemetryConfig::default()
                    .with_host("broker.local")
                    .with_topic_prefix("kitchen/sousvide"),
            );

        assert_eq!(config.control.default_target_c, 58.0);
        assert_eq!(config.telemetry.host.as_str(), "broker.local");
        assert_eq!(
            config.telemetry.topic("measured").as_str(),
            "kitchen/sousvide/measured"
        );
    }

    #[test]
    fn short_string_truncates_at_char_boundary() {
        let long = "x".repeat(100);
        let s = short_string(&long);
        assert_eq!(s.len(), MAX_SHORT_STRING);

        // Multi-byte char straddling the limit is dropped, not split.
        let tricky = format!("{}é", "x".repeat(63));
        let s = short_string(&tricky);
        assert_eq!(s.len(), 63);
    }

    #[test]
    fn fault_threshold_floor_is_one() {
        let config = ControlConfig::default().with_fault_threshold(0);
        assert_eq!(config.fault_threshold, 1);
    }
}
