//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! The library defaults to the fixed kernel-convention paths; a config file is
//! only needed to point the HAL at a non-standard tree (test rigs, containers
//! with a remapped `/dev`).

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub devices: DevicesConfig,

    #[serde(default)]
    pub flush: FlushConfig,
}

/// Device discovery paths
#[derive(Debug, Deserialize, Clone)]
pub struct DevicesConfig {
    /// Per-class symlink tree, one subdirectory per logical sensor name
    #[serde(default = "default_symlink_root")]
    pub symlink_root: String,

    /// Raw input-device directory holding the event nodes
    #[serde(default = "default_input_dir")]
    pub input_dir: String,
}

/// Flush control endpoint
#[derive(Debug, Deserialize, Clone)]
pub struct FlushConfig {
    /// Control file accepting ASCII-decimal handle ids. One endpoint is
    /// shared by every sensor instance.
    #[serde(default = "default_flush_control_path")]
    pub control_path: String,
}

// Default value functions
fn default_symlink_root() -> String { "/sys/class/sensor_event/symlink".to_string() }
fn default_input_dir() -> String { "/dev/input".to_string() }
fn default_flush_control_path() -> String { "/sys/class/sensors/sensor_dev/flush".to_string() }

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            symlink_root: default_symlink_root(),
            input_dir: default_input_dir(),
        }
    }
}

impl Default for FlushConfig {
    fn default() -> Self {
        Self {
            control_path: default_flush_control_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            devices: DevicesConfig::default(),
            flush: FlushConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sensor_hal::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configured path is empty or relative
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("devices.symlink_root", &self.devices.symlink_root),
            ("devices.input_dir", &self.devices.input_dir),
            ("flush.control_path", &self.flush.control_path),
        ] {
            if value.is_empty() {
                return Err(crate::error::SensorHalError::Config(
                    toml::de::Error::custom(format!("{} cannot be empty", name))
                ));
            }
            if !value.starts_with('/') {
                return Err(crate::error::SensorHalError::Config(
                    toml::de::Error::custom(format!("{} must be an absolute path", name))
                ));
            }
        }

        Ok(())
    }
}
