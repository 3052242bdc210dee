//! # Device Resolver Module
//!
//! Resolves a logical sensor name to an open input-device node.
//!
//! Resolution is a two-phase scan, first match wins, phase order fixed:
//!
//! 1. **Symlink phase**: the per-class symlink tree is preferred because its
//!    naming is stable under device hot-plug. `<symlink_root>/<name>/` is
//!    scanned for entries prefixed `event`, each opened from the input-device
//!    directory and its kernel-reported name compared against the logical
//!    name. A missing class directory is normal on platforms without the
//!    symlink tree and silently falls through.
//! 2. **Raw phase**: every node in the input-device directory is probed the
//!    same way. Entry names here carry no stability guarantee across reboots.
//!
//! Matching is exact string equality — a prefix or substring match could
//! resolve to an unrelated device sharing a name prefix. Candidates whose
//! name query fails read as the empty name and simply cannot match.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::DevicesConfig;
use crate::error::{Result, SensorHalError};

pub mod probe;

use probe::{DeviceProbe, EvdevProbe, InputNode};

/// Default per-class symlink tree root
pub const DEFAULT_SYMLINK_ROOT: &str = "/sys/class/sensor_event/symlink";

/// Default input-device directory
pub const DEFAULT_INPUT_DIR: &str = "/dev/input";

/// Prefix of event-device entries in the symlink tree
const EVENT_PREFIX: &str = "event";

/// A successfully resolved input-device node
pub struct ResolvedDevice {
    /// The open device node
    pub node: Box<dyn InputNode>,
    /// Relative filename of the matched entry (e.g. "event3"), retained for
    /// diagnostics
    pub input_name: String,
}

/// Resolves logical sensor names to open device nodes
///
/// # Examples
///
/// ```no_run
/// use sensor_hal::resolver::DeviceResolver;
///
/// let resolver = DeviceResolver::new();
/// let device = resolver.resolve("lsm6dsl_accel")?;
/// println!("resolved to {}", device.input_name);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct DeviceResolver {
    symlink_root: PathBuf,
    input_dir: PathBuf,
    probe: Box<dyn DeviceProbe>,
}

impl std::fmt::Debug for DeviceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceResolver")
            .field("symlink_root", &self.symlink_root)
            .field("input_dir", &self.input_dir)
            .finish_non_exhaustive()
    }
}

impl Default for DeviceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceResolver {
    /// Create a resolver using the standard kernel paths and the evdev probe
    pub fn new() -> Self {
        Self::with_probe(
            PathBuf::from(DEFAULT_SYMLINK_ROOT),
            PathBuf::from(DEFAULT_INPUT_DIR),
            Box::new(EvdevProbe),
        )
    }

    /// Create a resolver using paths from configuration
    pub fn from_config(config: &DevicesConfig) -> Self {
        Self::with_probe(
            PathBuf::from(&config.symlink_root),
            PathBuf::from(&config.input_dir),
            Box::new(EvdevProbe),
        )
    }

    /// Create a resolver with explicit paths and probe (test seam)
    pub fn with_probe(
        symlink_root: PathBuf,
        input_dir: PathBuf,
        probe: Box<dyn DeviceProbe>,
    ) -> Self {
        Self {
            symlink_root,
            input_dir,
            probe,
        }
    }

    /// Resolve a logical sensor name to an open device node
    ///
    /// # Arguments
    ///
    /// * `logical_name` - The device name the kernel driver registered
    ///
    /// # Errors
    ///
    /// Returns `DeviceNotFound` if neither phase yields a node whose
    /// kernel-reported name equals `logical_name`. This is a local condition:
    /// only this sensor's data path is unavailable.
    pub fn resolve(&self, logical_name: &str) -> Result<ResolvedDevice> {
        if let Some(found) = self.scan_symlink_dir(logical_name) {
            return Ok(found);
        }
        if let Some(found) = self.scan_input_dir(logical_name) {
            return Ok(found);
        }

        warn!("couldn't find '{}' input device", logical_name);
        Err(SensorHalError::DeviceNotFound(logical_name.to_string()))
    }

    /// Symlink phase: scan the class directory for `event*` entries
    fn scan_symlink_dir(&self, logical_name: &str) -> Option<ResolvedDevice> {
        let class_dir = self.symlink_root.join(logical_name);

        // A missing or unreadable class directory is not an error: platforms
        // without the symlink tree are served by the raw phase.
        let entries = match fs::read_dir(&class_dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("no symlink directory {}: {}", class_dir.display(), e);
                return None;
            }
        };

        // Entries are taken in directory order (filesystem-defined, not
        // sorted); the first exact name match wins.
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if !file_name.starts_with(EVENT_PREFIX) {
                continue;
            }

            // Symlink entries mirror nodes in the input-device directory
            let node_path = self.input_dir.join(file_name.as_ref());
            if let Some(found) = self.try_candidate(&node_path, &file_name, logical_name) {
                return Some(found);
            }
        }

        None
    }

    /// Raw phase: probe every node in the input-device directory
    fn scan_input_dir(&self, logical_name: &str) -> Option<ResolvedDevice> {
        let entries = match fs::read_dir(&self.input_dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("failed to read {}: {}", self.input_dir.display(), e);
                return None;
            }
        };

        // Dot entries are already excluded by read_dir; every other entry is
        // a candidate, no name-prefix filter in this phase.
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();

            if let Some(found) = self.try_candidate(&entry.path(), &file_name, logical_name) {
                return Some(found);
            }
        }

        None
    }

    /// Open one candidate and test it for an exact name match.
    ///
    /// Returns `None` for any candidate that fails to open or does not match;
    /// the opened node is dropped (and its descriptor closed) on rejection.
    fn try_candidate(
        &self,
        node_path: &Path,
        file_name: &str,
        logical_name: &str,
    ) -> Option<ResolvedDevice> {
        let node = match self.probe.open(node_path) {
            Ok(node) => node,
            Err(e) => {
                // Permission denied, missing node: skip and keep scanning
                debug!("could not open {}: {}", node_path.display(), e);
                return None;
            }
        };

        // A failed name query reads as the empty name
        let reported = node.device_name().unwrap_or_default();
        if reported == logical_name {
            debug!("matched '{}' at {}", logical_name, node_path.display());
            Some(ResolvedDevice {
                node,
                input_name: file_name.to_string(),
            })
        } else {
            None
        }
    }
}
