//! # sensor-hal
//!
//! Diagnostic tool for the sensor HAL: resolves logical sensor names against
//! the platform's input subsystem and reports the matched device nodes.
//!
//! Resolution follows the stack's two-phase protocol (per-class symlink tree
//! first, raw input-directory scan second), so the tool answers the question
//! "which `/dev/input/event*` node would this sensor bind to?" exactly the
//! way the HAL itself would.

use std::path::PathBuf;

use anyhow::{bail, Result};
use sensor_hal::config::Config;
use sensor_hal::device::SensorDevice;
use sensor_hal::resolver::DeviceResolver;
use tracing::{info, warn};

/// Parsed command line: optional config path and the sensor names to resolve
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<(Option<PathBuf>, Vec<String>)> {
    let mut config_path = None;
    let mut names = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => match args.next() {
                Some(path) => config_path = Some(PathBuf::from(path)),
                None => bail!("--config requires a path argument"),
            },
            _ => names.push(arg),
        }
    }

    Ok((config_path, names))
}

/// Main entry point for the sensor-hal diagnostic tool
///
/// # Errors
///
/// Returns error if the configuration file cannot be loaded or no sensor
/// names were given. A sensor that fails to resolve is reported but is not an
/// error: a missing device is a normal condition on platforms that do not
/// ship that sensor.
///
/// # Examples
///
/// ```bash
/// sensor-hal accelerometer_sensor gyro_sensor
/// sensor-hal --config /etc/sensor-hal.toml proximity_sensor
/// ```
fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("sensor-hal v{} starting...", env!("CARGO_PKG_VERSION"));

    let (config_path, names) = parse_args(std::env::args().skip(1))?;
    if names.is_empty() {
        bail!("usage: sensor-hal [--config <path>] <sensor-name>...");
    }

    let config = match config_path {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            Config::load(path)?
        }
        None => Config::default(),
    };

    let resolver = DeviceResolver::from_config(&config.devices);

    let mut resolved = 0usize;
    for name in &names {
        let device = SensorDevice::new(&resolver, None, Some(name.as_str()));
        match (device.input_name(), device.fd()) {
            (Some(input_name), Some(fd)) => {
                info!("'{}' -> {}/{} (fd {})", name, config.devices.input_dir, input_name, fd);
                resolved += 1;
            }
            _ => warn!("'{}' did not resolve to any input device", name),
        }
    }

    info!("resolved {}/{} sensors", resolved, names.len());
    Ok(())
}
