use std::sync::Arc;

use crate::models::audio_models::CaptureDevice;
use crate::models::error::CaptureError;

/// A fixed-capacity circular buffer that a driver writes into on its own clock.
///
/// The core only reads from it. Implementations must tolerate reads that race
/// with driver writes elsewhere in the buffer.
pub trait CaptureRing: Send + Sync {
    /// Number of samples the ring holds before wrapping to index 0.
    fn capacity(&self) -> usize;

    /// Copy `dst.len()` samples starting at `offset` into `dst`.
    ///
    /// Callers guarantee `offset + dst.len() <= capacity()`.
    fn read_into(&self, offset: usize, dst: &mut [f32]);
}

/// Platform audio API the capture session drives.
///
/// Implemented by:
/// - `SimulatedBackend` (this crate)
/// - `CpalBackend` (`ring-recorder-cpal`)
pub trait CaptureBackend: Send {
    /// Capture devices currently known to the platform.
    fn devices(&self) -> Result<Vec<CaptureDevice>, CaptureError>;

    /// Start capturing `device` into a ring sized `sample_rate * max_duration_secs`.
    ///
    /// With `looping` set the driver wraps to index 0 when the ring is full.
    fn open_ring_capture(
        &mut self,
        device: &str,
        looping: bool,
        max_duration_secs: u32,
        sample_rate: u32,
    ) -> Result<Arc<dyn CaptureRing>, CaptureError>;

    /// Stop capturing and release the device.
    fn close_capture(&mut self, device: &str) -> Result<(), CaptureError>;

    /// Index of the next driver write in the ring.
    fn cursor(&self, device: &str) -> usize;

    fn is_capturing(&self, device: &str) -> bool;
}
