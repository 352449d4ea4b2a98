use std::sync::Arc;

use crate::models::audio_models::CapturedAudio;
use crate::models::error::CaptureError;
use crate::models::state::{CaptureState, CaptureStatus, StopReason};
use crate::processing::accumulator::{AppendOutcome, SampleAccumulator};
use crate::processing::ring_reader::RingReader;
use crate::traits::capture_backend::{CaptureBackend, CaptureRing};
use crate::traits::capture_delegate::CaptureDelegate;

/// Drains a device's looping capture ring into a capped in-memory buffer.
///
/// The driver writes the ring on its own clock; the host calls [`poll`] on
/// whatever timer it has. Data flow:
/// ```text
/// [driver] → [CaptureRing] → poll() → [RingReader] → [SampleAccumulator]
///                                                          ↓ stop()
///                                                    captured_audio()
/// ```
/// `start`, `poll` and `stop` must not run concurrently on one session.
/// Polls must come often enough that the driver never laps the reader.
///
/// [`poll`]: CaptureSession::poll
pub struct CaptureSession<B: CaptureBackend> {
    backend: B,
    state: CaptureState,
    device_name: Option<String>,
    sample_rate: u32,
    ring: Option<Arc<dyn CaptureRing>>,
    reader: RingReader,
    accumulator: SampleAccumulator,
    stop_reason: Option<StopReason>,
    delegate: Option<Arc<dyn CaptureDelegate>>,
}

impl<B: CaptureBackend> CaptureSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: CaptureState::Idle,
            device_name: None,
            sample_rate: 0,
            ring: None,
            reader: RingReader::new(),
            accumulator: SampleAccumulator::default(),
            stop_reason: None,
            delegate: None,
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn CaptureDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples captured in the current or most recent session.
    pub fn samples(&self) -> &[f32] {
        self.accumulator.samples()
    }

    pub fn captured_duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.accumulator.len() as f64 / self.sample_rate as f64
    }

    pub fn status(&self) -> CaptureStatus {
        let captured_samples = self.accumulator.len();
        let duration_secs = self.captured_duration_secs();
        match self.state {
            CaptureState::Idle => CaptureStatus::Idle,
            CaptureState::Capturing => CaptureStatus::Capturing {
                captured_samples,
                duration_secs,
            },
            CaptureState::Stopped => CaptureStatus::Stopped {
                reason: self.stop_reason.unwrap_or(StopReason::Requested),
                captured_samples,
                duration_secs,
            },
        }
    }

    /// The finished capture, once stopped with at least one sample.
    pub fn captured_audio(&self) -> Option<CapturedAudio> {
        if !self.state.is_stopped() || self.accumulator.is_empty() {
            return None;
        }
        Some(CapturedAudio {
            samples: self.accumulator.to_vec(),
            sample_rate: self.sample_rate,
            device_name: self.device_name.clone(),
        })
    }

    /// Open `device` and begin capturing. Transitions: idle/stopped → capturing.
    ///
    /// Arguments are validated before the device is touched, so a rejected
    /// start leaves the previous session's samples intact.
    pub fn start(&mut self, device: &str, sample_rate: u32, max_duration_secs: u32) -> Result<CaptureStatus, CaptureError> {
        if sample_rate == 0 {
            return Err(CaptureError::InvalidSampleRate(sample_rate));
        }
        if max_duration_secs == 0 {
            return Err(CaptureError::ConfigurationFailed("max duration must be at least one second".into()));
        }
        if self.state.is_capturing() {
            return Err(CaptureError::AlreadyCapturing);
        }
        if device.is_empty() {
            return Err(CaptureError::DeviceUnavailable("no capture device selected".into()));
        }

        let ring = self
            .backend
            .open_ring_capture(device, true, max_duration_secs, sample_rate)
            .map_err(|e| match e {
                CaptureError::DeviceUnavailable(_) => e,
                other => CaptureError::DeviceUnavailable(other.to_string()),
            })?;

        log::info!(
            "capturing '{}' at {}Hz for at most {}s (ring of {} samples)",
            device,
            sample_rate,
            max_duration_secs,
            ring.capacity()
        );

        self.ring = Some(ring);
        self.reader.reset();
        self.accumulator.reset((sample_rate as usize).saturating_mul(max_duration_secs as usize));
        self.device_name = Some(device.to_string());
        self.sample_rate = sample_rate;
        self.stop_reason = None;
        self.set_state(CaptureState::Capturing);

        Ok(self.status())
    }

    /// Drain samples written since the last poll.
    ///
    /// Outside `Capturing` this does nothing; a stale timer tick is not an
    /// error. Reaching the duration cap stops the session.
    pub fn poll(&mut self) -> CaptureStatus {
        if self.state.is_capturing() {
            self.drain();
        }
        self.status()
    }

    /// Drain what is left, release the device and keep the samples.
    /// Transitions: capturing → stopped. Idempotent.
    pub fn stop(&mut self) -> CaptureStatus {
        if !self.state.is_capturing() {
            return self.status();
        }

        self.drain();
        if self.state.is_capturing() {
            self.finish(StopReason::Requested);
        }
        self.status()
    }

    // --- Internal helpers ---

    fn drain(&mut self) {
        let (Some(ring), Some(device)) = (self.ring.clone(), self.device_name.clone()) else {
            return;
        };
        if !self.backend.is_capturing(&device) {
            log::debug!("'{}' is no longer capturing, nothing to drain", device);
            return;
        }

        let cursor = self.backend.cursor(&device);
        let chunk = self.reader.extract(ring.as_ref(), cursor);
        if chunk.is_empty() {
            return;
        }
        log::debug!("drained {} samples, cursor now {}", chunk.len(), self.reader.position());

        // append drops everything past the cap, so Full means exactly at the cap.
        if self.accumulator.append(&chunk) == AppendOutcome::Full {
            log::info!("reached {} sample cap, stopping '{}'", self.accumulator.max_samples(), device);
            self.finish(StopReason::DurationLimit);
        }
    }

    fn finish(&mut self, reason: StopReason) {
        self.release_device();
        self.stop_reason = Some(reason);
        log::info!(
            "capture stopped ({:?}): {} samples, {:.2}s",
            reason,
            self.accumulator.len(),
            self.captured_duration_secs()
        );
        self.set_state(CaptureState::Stopped);
    }

    fn release_device(&mut self) {
        self.ring = None;
        if let Some(device) = self.device_name.as_deref() {
            if let Err(e) = self.backend.close_capture(device) {
                log::warn!("failed to close '{}': {}", device, e);
            }
        }
    }

    fn set_state(&mut self, new_state: CaptureState) {
        self.state = new_state;
        if let Some(ref delegate) = self.delegate {
            delegate.on_status_changed(&self.status());
        }
    }
}

impl<B: CaptureBackend> Drop for CaptureSession<B> {
    fn drop(&mut self) {
        if self.state.is_capturing() {
            self.release_device();
        }
    }
}
