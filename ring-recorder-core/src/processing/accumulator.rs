/// Outcome of appending a chunk to a [`SampleAccumulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The chunk fit and there is room left.
    Accepted,
    /// The cap has been reached; any excess in the chunk was dropped.
    Full,
}

/// Append-only store of captured mono samples with a hard length cap.
#[derive(Debug, Clone, Default)]
pub struct SampleAccumulator {
    samples: Vec<f32>,
    max_samples: usize,
}

impl SampleAccumulator {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: Vec::new(),
            max_samples,
        }
    }

    /// Append `chunk`, discarding whatever would push past the cap.
    pub fn append(&mut self, chunk: &[f32]) -> AppendOutcome {
        let room = self.max_samples.saturating_sub(self.samples.len());
        let take = chunk.len().min(room);
        if take < chunk.len() {
            log::debug!("dropping {} samples beyond cap of {}", chunk.len() - take, self.max_samples);
        }
        self.samples.extend_from_slice(&chunk[..take]);

        if self.is_full() {
            AppendOutcome::Full
        } else {
            AppendOutcome::Accepted
        }
    }

    /// Truncate from the tail to at most `max` samples.
    ///
    /// Returns true if anything was removed.
    pub fn cap_at(&mut self, max: usize) -> bool {
        if self.samples.len() <= max {
            return false;
        }
        self.samples.truncate(max);
        true
    }

    /// Drop all samples and install a new cap for the next session.
    pub fn reset(&mut self, max_samples: usize) {
        self.samples.clear();
        self.max_samples = max_samples;
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.max_samples
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.samples.clone()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn max_samples(&self) -> usize {
        self.max_samples
    }
}
