//! Configuration structures for the readout controller.
//!
//! Supports TOML deserialization with sensible bench defaults and
//! explicit values for deployment. Every physical quantity is given in
//! microseconds, matching how timing is discussed at the instrument.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level controller configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Timing-board parameter set.
    pub timing: TimingConfig,

    /// Command transport configuration.
    pub transport: TransportConfig,
}

/// Timing-board parameters, all in microseconds unless noted.
///
/// These are the quantities uploaded to the sequencer on `apply`: the
/// dual-slope integration window and gain, the two settling waits before
/// the pedestal and signal integrations, and the four gate/well pulse
/// widths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Dual-slope integration time.
    pub integral_time: f64,

    /// Dual-slope integrator gain. One of 1, 2, 5 or 10; validated
    /// against the hardware's discrete gain set when applied.
    pub gain: u32,

    /// Settling wait before the pedestal integration.
    pub pedestal_wait: f64,

    /// Settling wait before the signal integration.
    pub signal_wait: f64,

    /// Dump gate pulse width.
    pub dump_gate_width: f64,

    /// Output gate pulse width.
    pub output_gate_width: f64,

    /// Reset gate pulse width used during skipping readout.
    pub reset_gate_width: f64,

    /// Summing well pulse width.
    pub summing_well_width: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            integral_time: 10.0,
            gain: 2,
            pedestal_wait: 0.5,
            signal_wait: 0.5,
            dump_gate_width: 1.0,
            output_gate_width: 1.0,
            reset_gate_width: 0.52,
            summing_well_width: 1.0,
        }
    }
}

/// Which command transport to attach to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// In-memory transport that acknowledges every command. Safe default
    /// for bench work without the instrument.
    #[default]
    Simulated,
    /// Site-provided hardware transport (PCI/PCIe interface board).
    /// Accepted by the schema; constructing it is the site integration's
    /// job, not this workspace's.
    Hardware,
}

/// Command transport configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Transport implementation to use.
    pub kind: TransportKind,

    /// Round-trip timeout handed to transport implementations.
    #[serde(with = "humantime_serde")]
    pub command_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::Simulated,
            command_timeout: Duration::from_secs(2),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Serialize configuration to a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Stable fingerprint of the configuration, computed over its
    /// canonical TOML serialization.
    ///
    /// Used to detect whether the on-disk settings differ from what was
    /// last uploaded to the controller. Stability is only needed within
    /// one installation; the hash is not a persistence format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn fingerprint(&self) -> Result<u64, ConfigError> {
        let canonical = self.to_toml()?;
        let mut hasher = DefaultHasher::new();
        canonical.hash(&mut hasher);
        Ok(hasher.finish())
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Sidecar cache recording the fingerprint of the configuration last
/// applied to the hardware.
///
/// The upload tool refuses to assume controller state matches the config
/// file unless the fingerprints agree, mirroring the settings-change
/// check the instrument procedures run before touching the device.
#[derive(Debug, Clone)]
pub struct AppliedStateCache {
    path: PathBuf,
}

impl AppliedStateCache {
    /// Cache stored at an explicit path.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Conventional cache location for a given config file: the same
    /// path with an `applied` extension.
    #[must_use]
    pub fn for_config(config_path: &Path) -> Self {
        Self {
            path: config_path.with_extension("applied"),
        }
    }

    /// Path of the cache file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the last-applied fingerprint, if one was recorded.
    ///
    /// A missing or unparsable cache file reads as `None`; the caller
    /// treats that as "state unknown, apply required".
    #[must_use]
    pub fn load(&self) -> Option<u64> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        let parsed = u64::from_str_radix(content.trim(), 16);
        if parsed.is_err() {
            tracing::warn!(
                path = %self.path.display(),
                "applied-state cache is unreadable, treating state as unknown"
            );
        }
        parsed.ok()
    }

    /// Record `fingerprint` as the last-applied configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache file cannot be written.
    pub fn store(&self, fingerprint: u64) -> Result<(), ConfigError> {
        std::fs::write(&self.path, format!("{fingerprint:016x}\n")).map_err(|e| ConfigError::Io {
            path: self.path.clone(),
            source: e,
        })
    }

    /// True when the recorded fingerprint matches `fingerprint`.
    #[must_use]
    pub fn matches(&self, fingerprint: u64) -> bool {
        self.load() == Some(fingerprint)
    }
}

/// Serde helper module for `Duration` using humantime format.
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
