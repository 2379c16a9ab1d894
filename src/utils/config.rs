//! Tracker configuration
//!
//! All tunables of one end of the link live in [`TrackerConfig`]. Role
//! presets reproduce the paired firmware defaults; any field can be
//! overridden from a JSON document.

use crate::connection::RetryPolicy;
use crate::core::{PeerAddress, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bluetooth name the client end advertises
pub const CLIENT_DEVICE_NAME: &str = "ESP32-BT-Slave";
/// Bluetooth name the master end advertises
pub const MASTER_DEVICE_NAME: &str = "ESP32-BT-Master";
/// Hardware address of the client's radio
pub const DEFAULT_PEER_ADDRESS: PeerAddress = PeerAddress::new([0x1C, 0x69, 0x20, 0xC6, 0x5E, 0x32]);

/// Smallest display the two status lines fit on
pub const MIN_DISPLAY_COLUMNS: u8 = 8;
pub const MIN_DISPLAY_ROWS: u8 = 2;

/// Character display geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub columns: u8,
    pub rows: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { columns: 16, rows: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Which end of the link this device is
    pub role: Role,
    /// Name the transport advertises at start-up
    pub device_name: String,
    /// Name of the device at the other end (informational)
    pub peer_name: String,
    /// Address the initiator connects to
    pub peer_address: PeerAddress,
    /// Period of the tracking tick (milliseconds)
    pub tick_interval_ms: u64,
    /// Transport bring-up attempts at boot
    pub startup_retry: RetryPolicy,
    /// Listen attempts per acceptor reconnection burst
    pub acceptor_burst: RetryPolicy,
    /// Minimum time between acceptor link checks (milliseconds)
    pub acceptor_check_interval_ms: u64,
    /// Initiator reconnection pacing and give-up ceiling
    pub initiator_retry: RetryPolicy,
    pub display: DisplayConfig,
    /// Enable debug logging
    pub debug_logging: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {parameter}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    #[error("configuration serialization failed: {message}")]
    SerializationError { message: String },
}

impl TrackerConfig {
    /// Initiator preset: connects out to the client every 10 s, at most 5 times
    pub fn master() -> Self {
        Self {
            role: Role::Initiator,
            device_name: MASTER_DEVICE_NAME.to_string(),
            peer_name: CLIENT_DEVICE_NAME.to_string(),
            peer_address: DEFAULT_PEER_ADDRESS,
            tick_interval_ms: 1000,
            startup_retry: RetryPolicy::new(5, 1000),
            acceptor_burst: RetryPolicy::new(3, 1000),
            acceptor_check_interval_ms: 1000,
            initiator_retry: RetryPolicy::new(5, 10_000),
            display: DisplayConfig::default(),
            debug_logging: false,
        }
    }

    /// Acceptor preset: waits for the master, listening in bursts of 3
    pub fn client() -> Self {
        Self {
            role: Role::Acceptor,
            device_name: CLIENT_DEVICE_NAME.to_string(),
            peer_name: MASTER_DEVICE_NAME.to_string(),
            ..Self::master()
        }
    }

    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Initiator => Self::master(),
            Role::Acceptor => Self::client(),
        }
    }

    /// Parse and validate a JSON document; missing fields take preset values
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TrackerConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to parse config: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializationError {
            message: format!("Failed to serialize config: {}", e),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_name.trim().is_empty() {
            return Err(invalid("device_name", &self.device_name, "must not be empty"));
        }
        if self.tick_interval_ms == 0 {
            return Err(invalid("tick_interval_ms", 0, "must be positive"));
        }
        if self.acceptor_check_interval_ms == 0 {
            return Err(invalid("acceptor_check_interval_ms", 0, "must be positive"));
        }

        for (name, policy) in [
            ("startup_retry", &self.startup_retry),
            ("acceptor_burst", &self.acceptor_burst),
            ("initiator_retry", &self.initiator_retry),
        ] {
            if policy.max_attempts == 0 {
                return Err(invalid(
                    &format!("{}.max_attempts", name),
                    0,
                    "at least one attempt is required",
                ));
            }
            if policy.interval_ms == 0 {
                return Err(invalid(&format!("{}.interval_ms", name), 0, "must be positive"));
            }
        }

        if self.display.columns < MIN_DISPLAY_COLUMNS {
            return Err(invalid(
                "display.columns",
                self.display.columns,
                "display is too narrow for the status lines",
            ));
        }
        if self.display.rows < MIN_DISPLAY_ROWS {
            return Err(invalid(
                "display.rows",
                self.display.rows,
                "distance and bearing need two rows",
            ));
        }
        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::client()
    }
}

fn invalid(parameter: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
