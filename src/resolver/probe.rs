//! Trait abstraction for input-device probing to enable testing

use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;

/// An opened input-device node that can report its kernel device name
///
/// Dropping the node closes the underlying descriptor, so every
/// opened-but-rejected candidate during a scan is released immediately.
pub trait InputNode: AsRawFd + Send {
    /// Kernel-reported device name, or `None` if the query failed.
    ///
    /// Callers treat a failed query as an empty name: such a candidate can
    /// never match a logical name and the scan continues.
    fn device_name(&self) -> Option<String>;
}

/// Trait for opening candidate device nodes during resolution
pub trait DeviceProbe: Send + Sync {
    /// Open the node at `path` read-only
    fn open(&self, path: &Path) -> io::Result<Box<dyn InputNode>>;
}

/// Probe backed by the Linux evdev interface
///
/// Opens the node via `evdev::Device`, which issues the bounded
/// `EVIOCGNAME` name query on open.
pub struct EvdevProbe;

impl InputNode for evdev::Device {
    fn device_name(&self) -> Option<String> {
        self.name().map(str::to_owned)
    }
}

impl DeviceProbe for EvdevProbe {
    fn open(&self, path: &Path) -> io::Result<Box<dyn InputNode>> {
        let device = evdev::Device::open(path)?;
        Ok(Box::new(device))
    }
}
