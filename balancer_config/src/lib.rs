#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Operator-facing configuration for the balancer client.
//!
//! Deserialized from TOML and validated before the session is built. These
//! are the on-disk schema types; the runtime knobs live in
//! `balancer_core::config` and are mapped via `From` conversions there.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Broker endpoint and topics the transport adapter connects to. The core
/// never opens the connection itself; these are handed to whatever
/// transport implementation delivers events and commands.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TransportCfg {
    pub host: String,
    pub port: u16,
    pub status_topic: String,
    pub command_topic: String,
}

impl Default for TransportCfg {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            status_topic: "ballbalancer/status".to_string(),
            command_topic: "ballbalancer/cmd".to_string(),
        }
    }
}

/// Trajectory generator knobs.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct TrajectoryCfg {
    /// Fixed tick period in milliseconds.
    pub tick_ms: u64,
    /// Substituted for non-finite/negative operator frequency input.
    pub default_frequency_hz: f64,
    /// Subtracted from the horizontal half-extent when capping the radius.
    pub radius_margin: f64,
}

impl Default for TrajectoryCfg {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            default_frequency_hz: 0.5,
            radius_margin: 5.0,
        }
    }
}

/// Operator-control knobs.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct UiCfg {
    /// Arrow-pad nudge distance per press, in field units.
    pub target_step: f64,
}

impl Default for UiCfg {
    fn default() -> Self {
        Self { target_step: 5.0 }
    }
}

/// Error time-series retention.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct SeriesCfg {
    /// Most-recent samples kept (FIFO).
    pub capacity: usize,
}

impl Default for SeriesCfg {
    fn default() -> Self {
        Self { capacity: 200 }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    /// Path to a .log file (JSON lines); console-only when absent.
    pub file: Option<String>,
    /// "error" | "warn" | "info" | "debug" | "trace"
    pub level: Option<String>,
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub transport: TransportCfg,
    pub trajectory: TrajectoryCfg,
    pub ui: UiCfg,
    pub series: SeriesCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transport.host.trim().is_empty() {
            return Err(ConfigError::Invalid("transport.host must not be empty"));
        }
        if self.transport.port == 0 {
            return Err(ConfigError::Invalid("transport.port must be > 0"));
        }
        if self.transport.status_topic.trim().is_empty()
            || self.transport.command_topic.trim().is_empty()
        {
            return Err(ConfigError::Invalid("transport topics must not be empty"));
        }
        if self.trajectory.tick_ms == 0 {
            return Err(ConfigError::Invalid("trajectory.tick_ms must be > 0"));
        }
        if !(self.trajectory.default_frequency_hz.is_finite()
            && self.trajectory.default_frequency_hz > 0.0)
        {
            return Err(ConfigError::Invalid(
                "trajectory.default_frequency_hz must be finite and > 0",
            ));
        }
        if !(self.trajectory.radius_margin.is_finite() && self.trajectory.radius_margin >= 0.0) {
            return Err(ConfigError::Invalid(
                "trajectory.radius_margin must be finite and >= 0",
            ));
        }
        if !(self.ui.target_step.is_finite() && self.ui.target_step > 0.0) {
            return Err(ConfigError::Invalid(
                "ui.target_step must be finite and > 0",
            ));
        }
        if self.series.capacity == 0 {
            return Err(ConfigError::Invalid("series.capacity must be > 0"));
        }
        if let Some(rotation) = self.logging.rotation.as_deref() {
            if !matches!(rotation, "never" | "daily" | "hourly") {
                return Err(ConfigError::Invalid(
                    "logging.rotation must be one of: never, daily, hourly",
                ));
            }
        }
        if let Some(level) = self.logging.level.as_deref() {
            if !matches!(level, "error" | "warn" | "info" | "debug" | "trace") {
                return Err(ConfigError::Invalid(
                    "logging.level must be one of: error, warn, info, debug, trace",
                ));
            }
        }
        Ok(())
    }
}
