//! [`CaptureBackend`] over the cpal default host.

use std::collections::HashMap;
use std::sync::Arc;

use ring_recorder_core::backend::software_ring::ring_capacity;
use ring_recorder_core::{CaptureBackend, CaptureDevice, CaptureError, CaptureRing, SoftwareRing};

use crate::cpal_mic::MicCapture;
use crate::device_enumerator::DeviceEnumerator;

/// Real microphone backend. One capture thread per open device.
#[derive(Default)]
pub struct CpalBackend {
    open: HashMap<String, MicCapture>,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CaptureBackend for CpalBackend {
    fn devices(&self) -> Result<Vec<CaptureDevice>, CaptureError> {
        Ok(DeviceEnumerator::new().list_capture_devices()?)
    }

    fn open_ring_capture(
        &mut self,
        device: &str,
        looping: bool,
        max_duration_secs: u32,
        sample_rate: u32,
    ) -> Result<Arc<dyn CaptureRing>, CaptureError> {
        if let Some(mut previous) = self.open.remove(device) {
            log::debug!("reopening '{}', stopping previous capture", device);
            if let Err(e) = previous.stop() {
                log::warn!("{}", e);
            }
        }

        let capacity = ring_capacity(sample_rate, max_duration_secs)?;
        let ring = Arc::new(SoftwareRing::new(capacity, looping));
        let capture = MicCapture::start(device, sample_rate, Arc::clone(&ring))?;
        self.open.insert(device.to_string(), capture);
        Ok(ring)
    }

    fn close_capture(&mut self, device: &str) -> Result<(), CaptureError> {
        match self.open.remove(device) {
            Some(mut capture) => Ok(capture.stop()?),
            None => Ok(()),
        }
    }

    fn cursor(&self, device: &str) -> usize {
        self.open.get(device).map(|c| c.ring().cursor()).unwrap_or(0)
    }

    fn is_capturing(&self, device: &str) -> bool {
        self.open.get(device).map(MicCapture::is_running).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_capture_is_rejected_before_opening() {
        let mut backend = CpalBackend::new();
        let err = backend.open_ring_capture("any", true, 10, 300_000_000).err();
        assert!(matches!(err, Some(CaptureError::ConfigurationFailed(_))));
        assert!(!backend.is_capturing("any"));
    }

    #[test]
    fn unopened_device_reports_idle() {
        let backend = CpalBackend::new();
        assert_eq!(backend.cursor("nothing"), 0);
        assert!(!backend.is_capturing("nothing"));
    }

    #[test]
    fn closing_unopened_device_is_ok() {
        let mut backend = CpalBackend::new();
        assert!(backend.close_capture("nothing").is_ok());
    }
}
