//! Software capture backend for tests and hosts without audio hardware.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use super::software_ring::{ring_capacity, SoftwareRing};
use crate::models::audio_models::CaptureDevice;
use crate::models::error::CaptureError;
use crate::traits::capture_backend::{CaptureBackend, CaptureRing};

#[derive(Debug, Default)]
struct Inner {
    devices: Vec<CaptureDevice>,
    open: HashMap<String, Arc<SoftwareRing>>,
    unavailable: HashSet<String>,
    fail_close: bool,
    close_calls: usize,
    ring_capacity: Option<usize>,
}

/// In-memory [`CaptureBackend`].
///
/// Clones share state, so a test can keep a handle to feed samples while a
/// session owns another.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBackend {
    inner: Arc<Mutex<Inner>>,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device accepting any sample rate.
    pub fn with_device(self, name: &str) -> Self {
        self.with_device_caps(CaptureDevice::new(name, 0, 0))
    }

    pub fn with_device_caps(self, device: CaptureDevice) -> Self {
        {
            let mut inner = self.inner.lock();
            let is_first = inner.devices.is_empty();
            inner.devices.push(CaptureDevice {
                is_default: device.is_default || is_first,
                ..device
            });
        }
        self
    }

    /// Make `open_ring_capture` fail for `device`, as if permission were denied.
    pub fn set_unavailable(&self, device: &str, unavailable: bool) {
        let mut inner = self.inner.lock();
        if unavailable {
            inner.unavailable.insert(device.to_string());
        } else {
            inner.unavailable.remove(device);
        }
    }

    /// Make `close_capture` report an error (the device is still released).
    pub fn set_fail_close(&self, fail: bool) {
        self.inner.lock().fail_close = fail;
    }

    /// Size future rings to `capacity` instead of `sample_rate * max_duration_secs`,
    /// like a driver that loops over a shorter buffer than the capture cap.
    pub fn set_ring_capacity(&self, capacity: Option<usize>) {
        self.inner.lock().ring_capacity = capacity;
    }

    /// The live ring for an open device.
    pub fn ring(&self, device: &str) -> Option<Arc<SoftwareRing>> {
        self.inner.lock().open.get(device).cloned()
    }

    /// Feed samples into an open device. Returns false if it is not open.
    pub fn write(&self, device: &str, samples: &[f32]) -> bool {
        match self.ring(device) {
            Some(ring) => {
                ring.write(samples);
                true
            }
            None => false,
        }
    }

    pub fn close_calls(&self) -> usize {
        self.inner.lock().close_calls
    }
}

impl CaptureBackend for SimulatedBackend {
    fn devices(&self) -> Result<Vec<CaptureDevice>, CaptureError> {
        Ok(self.inner.lock().devices.clone())
    }

    fn open_ring_capture(
        &mut self,
        device: &str,
        looping: bool,
        max_duration_secs: u32,
        sample_rate: u32,
    ) -> Result<Arc<dyn CaptureRing>, CaptureError> {
        let mut inner = self.inner.lock();
        let Some(caps) = inner.devices.iter().find(|d| d.name == device) else {
            return Err(CaptureError::DeviceUnavailable(format!("no device named '{}'", device)));
        };
        if !caps.supports_rate(sample_rate) {
            log::warn!(
                "'{}' reports {}-{}Hz, opening at {}Hz anyway",
                device,
                caps.min_sample_rate,
                caps.max_sample_rate,
                sample_rate
            );
        }
        if inner.unavailable.contains(device) {
            return Err(CaptureError::DeviceUnavailable(format!("'{}' refused to open", device)));
        }

        let capacity = match inner.ring_capacity {
            Some(capacity) => capacity,
            None => ring_capacity(sample_rate, max_duration_secs)?,
        };
        let ring = Arc::new(SoftwareRing::new(capacity, looping));
        if let Some(previous) = inner.open.insert(device.to_string(), Arc::clone(&ring)) {
            previous.halt();
        }
        Ok(ring)
    }

    fn close_capture(&mut self, device: &str) -> Result<(), CaptureError> {
        let mut inner = self.inner.lock();
        inner.close_calls += 1;
        if let Some(ring) = inner.open.remove(device) {
            ring.halt();
        }
        if inner.fail_close {
            return Err(CaptureError::DeviceUnavailable(format!("'{}' failed to close", device)));
        }
        Ok(())
    }

    fn cursor(&self, device: &str) -> usize {
        self.inner.lock().open.get(device).map(|ring| ring.cursor()).unwrap_or(0)
    }

    fn is_capturing(&self, device: &str) -> bool {
        self.inner
            .lock()
            .open
            .get(device)
            .map(|ring| ring.is_running())
            .unwrap_or(false)
    }
}
