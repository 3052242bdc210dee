//! # Sensor Module
//!
//! Polymorphic surface concrete sensor types implement on top of
//! [`SensorDevice`].
//!
//! The control operations (`set_delay`, `batch`, `flush`,
//! `has_pending_events`) carry default implementations — no-op success,
//! delegation, or `false` — so a sensor type only overrides what its hardware
//! supports. Resolution and descriptor bookkeeping stay fixed inside
//! [`SensorDevice`] and are reached through the two required accessors.

use std::os::unix::io::RawFd;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::device::SensorDevice;
use crate::error::Result;

/// Shared lock serializing enable/disable sequencing across sensor instances
///
/// Enable and disable writes from different sensors must not interleave, but
/// which sensors share a sequence is a property of the platform, not of any
/// single sensor. The lock is therefore passed explicitly through
/// [`Sensor::enable`] so the serialization contract is visible at the call
/// site instead of hiding behind a process-wide global.
#[derive(Clone, Default)]
pub struct EnableLock(Arc<Mutex<()>>);

impl EnableLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for the duration of an enable/disable sequence
    pub fn acquire(&self) -> MutexGuard<'_, ()> {
        // A poisoned lock only means another sensor panicked mid-sequence;
        // the guard itself is still usable.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Contract between the sensor stack and a concrete sensor type
///
/// # Examples
///
/// ```no_run
/// use sensor_hal::device::SensorDevice;
/// use sensor_hal::resolver::DeviceResolver;
/// use sensor_hal::sensor::{EnableLock, Sensor};
///
/// struct Accelerometer {
///     device: SensorDevice,
///     enabled: bool,
/// }
///
/// impl Sensor for Accelerometer {
///     fn device(&self) -> &SensorDevice {
///         &self.device
///     }
///
///     fn device_mut(&mut self) -> &mut SensorDevice {
///         &mut self.device
///     }
///
///     fn enable(&mut self, lock: &EnableLock, _handle: i32, enabled: bool)
///         -> sensor_hal::error::Result<()>
///     {
///         let _guard = lock.acquire();
///         self.enabled = enabled;
///         Ok(())
///     }
/// }
///
/// let resolver = DeviceResolver::new();
/// let mut accel = Accelerometer {
///     device: SensorDevice::new(&resolver, None, Some("lsm6dsl_accel")),
///     enabled: false,
/// };
/// let lock = EnableLock::new();
/// accel.enable(&lock, 0, true)?;
/// # Ok::<(), sensor_hal::error::SensorHalError>(())
/// ```
pub trait Sensor {
    /// The underlying device handle
    fn device(&self) -> &SensorDevice;

    /// Mutable access to the underlying device handle
    fn device_mut(&mut self) -> &mut SensorDevice;

    /// Turn the sensor's data stream on or off
    ///
    /// Implementations hold `lock` for the whole sequence so enable writes
    /// from different sensor instances never interleave.
    fn enable(&mut self, lock: &EnableLock, handle: i32, enabled: bool) -> Result<()>;

    /// Configure the sampling period. Default: accepted and ignored.
    fn set_delay(&mut self, _handle: i32, _period_ns: i64) -> Result<()> {
        Ok(())
    }

    /// Configure batched sampling. Default: accepted and ignored.
    fn batch(
        &mut self,
        _handle: i32,
        _flags: u32,
        _period_ns: i64,
        _max_latency_ns: i64,
    ) -> Result<()> {
        Ok(())
    }

    /// Request a flush of queued events for `handle`
    ///
    /// Default: delegates to [`SensorDevice::flush`].
    fn flush(&mut self, handle: i32) -> Result<()> {
        self.device_mut().flush(handle)
    }

    /// Whether the sensor buffers events internally. Default: `false`.
    fn has_pending_events(&self) -> bool {
        false
    }

    /// Descriptor to poll for this sensor's events
    fn fd(&self) -> Option<RawFd> {
        self.device().fd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::probe::mocks::MockProbe;
    use crate::resolver::DeviceResolver;
    use tempfile::TempDir;

    struct PlainSensor {
        device: SensorDevice,
        enabled: bool,
    }

    impl Sensor for PlainSensor {
        fn device(&self) -> &SensorDevice {
            &self.device
        }

        fn device_mut(&mut self) -> &mut SensorDevice {
            &mut self.device
        }

        fn enable(&mut self, lock: &EnableLock, _handle: i32, enabled: bool) -> Result<()> {
            let _guard = lock.acquire();
            self.enabled = enabled;
            Ok(())
        }
    }

    /// Sensor overriding the batching override points
    struct BatchingSensor {
        device: SensorDevice,
        period_ns: i64,
        pending: bool,
    }

    impl Sensor for BatchingSensor {
        fn device(&self) -> &SensorDevice {
            &self.device
        }

        fn device_mut(&mut self) -> &mut SensorDevice {
            &mut self.device
        }

        fn enable(&mut self, lock: &EnableLock, _handle: i32, _enabled: bool) -> Result<()> {
            let _guard = lock.acquire();
            Ok(())
        }

        fn set_delay(&mut self, _handle: i32, period_ns: i64) -> Result<()> {
            self.period_ns = period_ns;
            Ok(())
        }

        fn has_pending_events(&self) -> bool {
            self.pending
        }
    }

    fn detached_device() -> (SensorDevice, TempDir, TempDir) {
        let symlink_root = TempDir::new().unwrap();
        let input_dir = TempDir::new().unwrap();
        let resolver = DeviceResolver::with_probe(
            symlink_root.path().to_path_buf(),
            input_dir.path().to_path_buf(),
            Box::new(MockProbe::new()),
        );
        (
            SensorDevice::new(&resolver, None, None),
            symlink_root,
            input_dir,
        )
    }

    #[test]
    fn test_default_set_delay_is_noop_success() {
        let (device, _s, _i) = detached_device();
        let mut sensor = PlainSensor { device, enabled: false };
        assert!(sensor.set_delay(0, 20_000_000).is_ok());
    }

    #[test]
    fn test_default_batch_is_noop_success() {
        let (device, _s, _i) = detached_device();
        let mut sensor = PlainSensor { device, enabled: false };
        assert!(sensor.batch(0, 0, 20_000_000, 1_000_000_000).is_ok());
    }

    #[test]
    fn test_default_has_pending_events_is_false() {
        let (device, _s, _i) = detached_device();
        let sensor = PlainSensor { device, enabled: false };
        assert!(!sensor.has_pending_events());
    }

    #[test]
    fn test_default_flush_delegates_to_device() {
        let (device, _s, _i) = detached_device();
        let control = tempfile::NamedTempFile::new().unwrap();
        let mut sensor = PlainSensor {
            device: device.with_flush_path(control.path()),
            enabled: false,
        };

        sensor.flush(2).unwrap();
        assert_eq!(std::fs::read(control.path()).unwrap(), b"2\0");
        assert_ne!(sensor.device().flush_state() & (1 << 2), 0);
    }

    #[test]
    fn test_overridden_operations_take_effect() {
        let (device, _s, _i) = detached_device();
        let mut sensor = BatchingSensor {
            device,
            period_ns: 0,
            pending: true,
        };

        sensor.set_delay(0, 66_667_000).unwrap();
        assert_eq!(sensor.period_ns, 66_667_000);
        assert!(sensor.has_pending_events());
    }

    #[test]
    fn test_enable_serializes_through_shared_lock() {
        let (first_dev, _s1, _i1) = detached_device();
        let (second_dev, _s2, _i2) = detached_device();
        let lock = EnableLock::new();

        let mut first = PlainSensor { device: first_dev, enabled: false };
        let mut second = PlainSensor { device: second_dev, enabled: false };

        first.enable(&lock, 0, true).unwrap();
        second.enable(&lock, 1, true).unwrap();
        assert!(first.enabled);
        assert!(second.enabled);

        // The lock is free again after both sequences
        drop(lock.acquire());
    }

    #[test]
    fn test_enable_lock_clones_share_one_mutex() {
        let lock = EnableLock::new();
        let clone = lock.clone();

        let guard = lock.acquire();
        // A try_lock through the clone must observe the held mutex
        assert!(clone.0.try_lock().is_err());
        drop(guard);
        assert!(clone.0.try_lock().is_ok());
    }
}
