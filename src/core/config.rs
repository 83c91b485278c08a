//! Configuration for the pulse controller

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::advice::Advice;

/// Main pulse controller configuration
///
/// Every field has a default; a missing key in the config file is not an
/// error. Floors for buffer size and interval are applied on use, not on
/// load, so the saved file round-trips unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Master switch; when false both triggers are no-ops
    pub enabled: bool,

    /// Baseline logical buffer size in bytes (floor 1024)
    pub buffer_size: usize,

    /// Baseline optimization interval in seconds (floor 10)
    pub interval_secs: u64,

    /// Memory pressure threshold in MB for strategy selection
    pub memory_threshold_mb: f64,

    /// Packet rate threshold in events/sec for strategy selection
    pub packet_threshold: f64,

    /// Strategy applied when no threshold rule matches
    pub default_advice: Advice,

    /// Emit per-event and per-tick informational logs
    pub logger_enabled: bool,

    /// Recognized for config compatibility; the opcode-cache reset only
    /// existed in the original host runtime and does nothing here
    pub opcache_reset_enabled: bool,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            buffer_size: 1_048_576,
            interval_secs: 60,
            memory_threshold_mb: 100.0,
            packet_threshold: 50.0,
            default_advice: Advice::DontNeed,
            logger_enabled: false,
            opcache_reset_enabled: true,
        }
    }
}

impl PulseConfig {
    /// Load config from TOML file
    pub fn load(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save(&self, path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config file location (`<config dir>/memory-pulse/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("memory-pulse").join("config.toml"))
    }

    /// Buffer size with the 1024-byte floor applied
    pub fn effective_buffer_size(&self) -> usize {
        self.buffer_size.max(1024)
    }

    /// Interval with the 10-second floor applied
    pub fn effective_interval(&self) -> u64 {
        self.interval_secs.max(10)
    }
}
