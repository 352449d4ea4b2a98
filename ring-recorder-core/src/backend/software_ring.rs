use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::traits::capture_backend::CaptureRing;

/// Largest ring a backend will allocate (1 GiB of `f32`).
pub const MAX_RING_SAMPLES: usize = 1 << 28;

/// Ring size for a capture of `max_duration_secs` at `sample_rate`.
///
/// Fails with `ConfigurationFailed` when the product is zero, overflows, or
/// exceeds [`MAX_RING_SAMPLES`].
pub fn ring_capacity(sample_rate: u32, max_duration_secs: u32) -> Result<usize, CaptureError> {
    (sample_rate as usize)
        .checked_mul(max_duration_secs as usize)
        .filter(|&n| n > 0 && n <= MAX_RING_SAMPLES)
        .ok_or_else(|| {
            CaptureError::ConfigurationFailed(format!(
                "cannot size a ring for {} Hz x {} s",
                sample_rate, max_duration_secs
            ))
        })
}

/// A looping capture ring living in process memory.
///
/// Whatever produces audio (a driver callback, a test) calls
/// [`SoftwareRing::write`]; the session reads it through [`CaptureRing`].
#[derive(Debug)]
pub struct SoftwareRing {
    buffer: Mutex<Vec<f32>>,
    cursor: AtomicUsize,
    looping: bool,
    running: AtomicBool,
}

impl SoftwareRing {
    pub fn new(capacity: usize, looping: bool) -> Self {
        Self {
            buffer: Mutex::new(vec![0.0; capacity]),
            cursor: AtomicUsize::new(0),
            looping,
            running: AtomicBool::new(true),
        }
    }

    /// Write samples at the cursor the way a driver would, wrapping at capacity.
    ///
    /// A non-looping ring stops capturing once it is full and reports cursor 0.
    pub fn write(&self, samples: &[f32]) {
        if !self.running.load(Ordering::SeqCst) {
            return;
        }
        let mut buffer = self.buffer.lock();
        let capacity = buffer.len();
        if capacity == 0 {
            return;
        }

        let mut cursor = self.cursor.load(Ordering::SeqCst);
        for &sample in samples {
            buffer[cursor] = sample;
            cursor += 1;
            if cursor == capacity {
                cursor = 0;
                if !self.looping {
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
        self.cursor.store(cursor, Ordering::SeqCst);
    }

    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop accepting writes; `is_running` turns false.
    pub fn halt(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

impl CaptureRing for SoftwareRing {
    fn capacity(&self) -> usize {
        self.buffer.lock().len()
    }

    fn read_into(&self, offset: usize, dst: &mut [f32]) {
        let buffer = self.buffer.lock();
        dst.copy_from_slice(&buffer[offset..offset + dst.len()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_capacity_is_rate_times_duration() {
        assert_eq!(ring_capacity(16000, 10).unwrap(), 160_000);
    }

    #[test]
    fn unreasonable_ring_sizes_are_rejected() {
        assert!(matches!(ring_capacity(0, 10), Err(CaptureError::ConfigurationFailed(_))));
        assert!(matches!(ring_capacity(16000, 0), Err(CaptureError::ConfigurationFailed(_))));
        assert!(matches!(ring_capacity(300_000_000, 10), Err(CaptureError::ConfigurationFailed(_))));
        assert!(matches!(ring_capacity(u32::MAX, u32::MAX), Err(CaptureError::ConfigurationFailed(_))));
    }

    #[test]
    fn looping_write_wraps_cursor() {
        let ring = SoftwareRing::new(4, true);
        ring.write(&[1.0, 2.0, 3.0]);
        assert_eq!(ring.cursor(), 3);
        ring.write(&[4.0, 5.0]);
        assert_eq!(ring.cursor(), 1);

        let mut out = [0.0; 4];
        ring.read_into(0, &mut out);
        assert_eq!(out, [5.0, 2.0, 3.0, 4.0]);
        assert!(ring.is_running());
    }

    #[test]
    fn one_shot_ring_stops_when_full() {
        let ring = SoftwareRing::new(3, false);
        ring.write(&[1.0, 2.0, 3.0, 4.0]);
        assert!(!ring.is_running());
        assert_eq!(ring.cursor(), 0);
    }

    #[test]
    fn halted_ring_ignores_writes() {
        let ring = SoftwareRing::new(8, true);
        ring.write(&[1.0]);
        ring.halt();
        ring.write(&[2.0, 3.0]);
        assert_eq!(ring.cursor(), 1);
    }
}
