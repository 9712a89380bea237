//! Timing and capacity configuration.
//!
//! Defaults reproduce the classroom pacing: 1.2 s per transmission, a
//! 1.35 s auto-advance interval, an 18% dwell at the switch, and a
//! 200-entry event log.

use crate::animation::{DeliveryMode, Timeline, TRANSMIT_DURATION_MS};
use crate::error::{SimError, SimResult};
use crate::eventlog::DEFAULT_LOG_CAPACITY;
use crate::mapper::{BROADCAST_SPLIT, PAUSE_FRACTION, UNICAST_SPLIT};
use crate::topology::Topology;

/// Interval between automatic cursor advances.
pub const AUTO_ADVANCE_INTERVAL_MS: u64 = 1350;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct SimConfig {
    pub transmit_duration_ms: u64,
    pub auto_advance_interval_ms: u64,
    pub pause_fraction: f64,
    pub broadcast_split: f64,
    pub unicast_split: f64,
    pub log_capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            transmit_duration_ms: TRANSMIT_DURATION_MS,
            auto_advance_interval_ms: AUTO_ADVANCE_INTERVAL_MS,
            pause_fraction: PAUSE_FRACTION,
            broadcast_split: BROADCAST_SPLIT,
            unicast_split: UNICAST_SPLIT,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

impl SimConfig {
    /// Reject values the animation model cannot honour.
    pub fn validate(&self) -> SimResult<()> {
        if self.transmit_duration_ms == 0 {
            return Err(SimError::InvalidConfig("transmit_duration_ms must be positive".into()));
        }
        if self.auto_advance_interval_ms == 0 {
            return Err(SimError::InvalidConfig("auto_advance_interval_ms must be positive".into()));
        }
        if self.log_capacity == 0 {
            return Err(SimError::InvalidConfig("log_capacity must be positive".into()));
        }
        for (name, value) in [
            ("pause_fraction", self.pause_fraction),
            ("broadcast_split", self.broadcast_split),
            ("unicast_split", self.unicast_split),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::InvalidConfig(format!("{} must be in [0, 1], got {}", name, value)));
            }
        }
        for (name, split) in [
            ("broadcast_split", self.broadcast_split),
            ("unicast_split", self.unicast_split),
        ] {
            if split + self.pause_fraction > 1.0 {
                return Err(SimError::InvalidConfig(format!(
                    "{} + pause_fraction exceeds 1 ({} + {})",
                    name, split, self.pause_fraction
                )));
            }
        }
        Ok(())
    }

    /// Timeline for a transmission in `mode`.
    pub fn timeline(&self, mode: DeliveryMode) -> Timeline {
        let split = match mode {
            DeliveryMode::Broadcast => self.broadcast_split,
            DeliveryMode::Unicast => self.unicast_split,
        };
        Timeline {
            duration_ms: self.transmit_duration_ms,
            split,
            pause: self.pause_fraction,
        }
    }

    /// Parse and validate a config from JSON. Missing fields take defaults.
    #[cfg(feature = "serialize")]
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: SimConfig =
            serde_json::from_str(json).map_err(|e| SimError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// A topology plus its config, as loaded from a scenario file.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ScenarioFile {
    pub topology: Topology,
    #[cfg_attr(feature = "serialize", serde(default))]
    pub config: SimConfig,
}

impl ScenarioFile {
    pub fn classroom() -> Self {
        ScenarioFile {
            topology: Topology::classroom(),
            config: SimConfig::default(),
        }
    }

    #[cfg(feature = "serialize")]
    pub fn from_json(json: &str) -> SimResult<Self> {
        let file: ScenarioFile =
            serde_json::from_str(json).map_err(|e| SimError::Serialization(e.to_string()))?;
        file.config.validate()?;
        file.topology.participants()?;
        Ok(file)
    }
}
