//! # Device Handle Module
//!
//! Uniform handle over a resolved sensor input node plus an optional
//! control-path device.
//!
//! Construction resolves the logical device name exactly once; the resolved
//! node is cached for the handle's lifetime. The control-path descriptor is
//! opened on demand and only if not already open. Both descriptors are owned
//! exclusively by the handle and released exactly once when it is dropped,
//! data node first, then the control descriptor (field order below).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::error::{Result, SensorHalError};
use crate::resolver::probe::InputNode;
use crate::resolver::DeviceResolver;

/// Flush control file shared by all sensor instances.
///
/// Every handle writes its flush requests to this one endpoint regardless of
/// which device it resolved; the kernel side demultiplexes on the handle id.
pub const DEFAULT_FLUSH_CONTROL_PATH: &str = "/sys/class/sensors/sensor_dev/flush";

/// Handle over a sensor's data node and optional control device
///
/// # Examples
///
/// ```no_run
/// use sensor_hal::device::SensorDevice;
/// use sensor_hal::resolver::DeviceResolver;
///
/// let resolver = DeviceResolver::new();
/// let device = SensorDevice::new(&resolver, None, Some("lsm6dsl_accel"));
/// if let Some(fd) = device.fd() {
///     println!("polling fd {}", fd);
/// }
/// ```
pub struct SensorDevice {
    /// Resolved data node; dropped (closed) before the control descriptor
    data: Option<Box<dyn InputNode>>,
    /// Control-path descriptor, opened on demand
    dev: Option<File>,
    dev_path: Option<PathBuf>,
    data_name: Option<String>,
    /// Filename of the resolved node (e.g. "event3"), for diagnostics
    input_name: Option<String>,
    flush_path: PathBuf,
    /// Bitmask of outstanding flush requests, keyed by handle id.
    /// Bookkeeping only; not synchronized across threads.
    flush_state: u32,
}

impl std::fmt::Debug for SensorDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorDevice")
            .field("dev_path", &self.dev_path)
            .field("data_name", &self.data_name)
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl SensorDevice {
    /// Create a handle, resolving `data_name` to its input node if supplied
    ///
    /// Resolution failure is not fatal: the handle is still constructed, the
    /// data path is simply absent and `fd()` reports `None`. This mirrors the
    /// stack's expectation that one missing sensor never takes down the rest.
    ///
    /// # Arguments
    ///
    /// * `resolver` - Resolver used for the one-time name lookup
    /// * `dev_path` - Optional control-device path, opened later by
    ///   [`open_device`](Self::open_device)
    /// * `data_name` - Optional logical input-device name to resolve
    pub fn new(
        resolver: &DeviceResolver,
        dev_path: Option<PathBuf>,
        data_name: Option<&str>,
    ) -> Self {
        let mut data = None;
        let mut input_name = None;

        if let Some(name) = data_name {
            match resolver.resolve(name) {
                Ok(resolved) => {
                    info!("resolved '{}' to {}", name, resolved.input_name);
                    input_name = Some(resolved.input_name);
                    data = Some(resolved.node);
                }
                Err(e) => {
                    error!("Couldn't open {}: {}", name, e);
                }
            }
        }

        Self {
            data,
            dev: None,
            dev_path,
            data_name: data_name.map(str::to_owned),
            input_name,
            flush_path: PathBuf::from(DEFAULT_FLUSH_CONTROL_PATH),
            flush_state: 0,
        }
    }

    /// Override the flush control file (test rigs, non-standard sysfs layout)
    pub fn with_flush_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.flush_path = path.into();
        self
    }

    /// Open the control-path device if configured and not already open
    ///
    /// Idempotent. A failed open is logged and swallowed; the call still
    /// reports success, matching the contract that control-path absence is a
    /// local condition.
    pub fn open_device(&mut self) -> Result<()> {
        if self.dev.is_none() {
            if let Some(path) = &self.dev_path {
                match File::open(path) {
                    Ok(file) => self.dev = Some(file),
                    Err(e) => error!("Couldn't open {} ({})", path.display(), e),
                }
            }
        }
        Ok(())
    }

    /// Close the control-path device if open
    ///
    /// Idempotent; never double-closes.
    pub fn close_device(&mut self) -> Result<()> {
        // Dropping the File closes the descriptor
        self.dev = None;
        Ok(())
    }

    /// Descriptor for generic I/O
    ///
    /// Returns the data descriptor when a logical device name was configured
    /// at construction (even if resolution failed, in which case `None`), and
    /// the control descriptor otherwise. Pure accessor.
    pub fn fd(&self) -> Option<RawFd> {
        if self.data_name.is_none() {
            self.dev.as_ref().map(|f| f.as_raw_fd())
        } else {
            self.data.as_ref().map(|n| n.as_raw_fd())
        }
    }

    /// Filename of the resolved input node, if resolution succeeded
    pub fn input_name(&self) -> Option<&str> {
        self.input_name.as_deref()
    }

    /// Whether the data node was resolved and is held open
    pub fn has_data_device(&self) -> bool {
        self.data.is_some()
    }

    /// Whether the control-path descriptor is currently open
    pub fn is_control_open(&self) -> bool {
        self.dev.is_some()
    }

    /// Outstanding flush requests, one bit per handle id
    pub fn flush_state(&self) -> u32 {
        self.flush_state
    }

    /// Request a flush of queued events for `handle`
    ///
    /// Writes the handle id as decimal ASCII with a trailing NUL to the flush
    /// control file, which is opened and closed per call, never cached. On
    /// success the handle's bit in the flush-state mask is set; on failure it
    /// is cleared and the failure returned.
    ///
    /// Callers must not invoke this concurrently on the same handle: the
    /// flush-state update is not synchronized.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHalError::Flush`] if the control file cannot be opened
    /// or the write fails.
    pub fn flush(&mut self, handle: i32) -> Result<()> {
        debug!("flush handle({})", handle);

        self.flush_state |= 1 << handle;
        match write_flush_request(&self.flush_path, handle) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.flush_state &= !(1 << handle);
                error!("failed flush write, handle({}): {}", handle, e);
                Err(SensorHalError::Flush {
                    handle,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Nanoseconds since an arbitrary epoch on the monotonic clock
    ///
    /// Unaffected by wall-clock adjustments; suitable for ordering sensor
    /// events.
    pub fn timestamp() -> i64 {
        static EPOCH: OnceLock<Instant> = OnceLock::new();
        let epoch = *EPOCH.get_or_init(Instant::now);
        epoch.elapsed().as_nanos() as i64
    }
}

/// One open-write-close cycle against the flush control file
fn write_flush_request(path: &Path, handle: i32) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).open(path)?;
    let mut request = handle.to_string().into_bytes();
    request.push(0); // the kernel interface expects a trailing NUL
    file.write_all(&request)
}
