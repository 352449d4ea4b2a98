use std::ops::Range;

use crate::traits::capture_backend::CaptureRing;

/// The one or two index ranges holding samples written since the last poll.
///
/// `second` is non-empty only when the driver wrapped past the end of the ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingSegments {
    pub first: Range<usize>,
    pub second: Range<usize>,
}

impl RingSegments {
    fn empty() -> Self {
        Self {
            first: 0..0,
            second: 0..0,
        }
    }

    pub fn len(&self) -> usize {
        self.first.len() + self.second.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Plan which ring ranges hold new data between two cursor readings.
///
/// Assumes the driver wrapped at most once since `last`; a double wrap is
/// indistinguishable from a single one and the lapped samples are lost.
pub fn wrap_segments(last: usize, current: usize, capacity: usize) -> RingSegments {
    if capacity == 0 || current == last {
        return RingSegments::empty();
    }

    if current > last {
        RingSegments {
            first: last..current,
            second: 0..0,
        }
    } else {
        RingSegments {
            first: last..capacity,
            second: 0..current,
        }
    }
}

/// Copy the samples written between `last` and `current` out of `ring`.
///
/// Returns the samples in capture order and the position to resume from.
pub fn extract<R: CaptureRing + ?Sized>(ring: &R, last: usize, current: usize) -> (Vec<f32>, usize) {
    let capacity = ring.capacity();
    if capacity == 0 {
        return (Vec::new(), last);
    }

    let current = if current >= capacity {
        log::warn!("cursor {} outside ring of {} samples, wrapping", current, capacity);
        current % capacity
    } else {
        current
    };
    let last = last % capacity;

    let segments = wrap_segments(last, current, capacity);
    let mut samples = vec![0.0f32; segments.len()];
    let (head, tail) = samples.split_at_mut(segments.first.len());
    if !head.is_empty() {
        ring.read_into(segments.first.start, head);
    }
    if !tail.is_empty() {
        ring.read_into(segments.second.start, tail);
    }

    (samples, current)
}

/// Tracks the last-seen driver cursor and drains new samples on each poll.
#[derive(Debug, Default)]
pub struct RingReader {
    position: usize,
}

impl RingReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read everything written since the previous call and advance.
    pub fn extract<R: CaptureRing + ?Sized>(&mut self, ring: &R, cursor: usize) -> Vec<f32> {
        let (samples, position) = extract(ring, self.position, cursor);
        self.position = position;
        samples
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }
}
