use super::error::CaptureError;

/// Capture session state machine.
///
/// State transitions:
/// ```text
/// idle → capturing → stopped
///            ↑          │
///            └─ start ──┘
/// ```
/// `Stopped` keeps the captured samples until the next `start` clears them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Capturing,
    Stopped,
}

impl CaptureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Capturing)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Why a capture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The caller asked for it.
    Requested,
    /// The accumulator reached `sample_rate * max_duration_secs`.
    DurationLimit,
}

/// Snapshot returned from `start` / `poll` / `stop` for presentation layers.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureStatus {
    Idle,
    Capturing {
        captured_samples: usize,
        duration_secs: f64,
    },
    Stopped {
        reason: StopReason,
        captured_samples: usize,
        duration_secs: f64,
    },
    Error(CaptureError),
}

impl CaptureStatus {
    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Capturing { .. })
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped { .. })
    }

    /// True when capture ended because the duration cap was hit.
    pub fn hit_duration_limit(&self) -> bool {
        matches!(
            self,
            Self::Stopped {
                reason: StopReason::DurationLimit,
                ..
            }
        )
    }

    /// Captured samples so far, if the status tracks them.
    pub fn captured_samples(&self) -> Option<usize> {
        match self {
            Self::Capturing { captured_samples, .. } | Self::Stopped { captured_samples, .. } => {
                Some(*captured_samples)
            }
            _ => None,
        }
    }

    pub fn duration(&self) -> Option<f64> {
        match self {
            Self::Capturing { duration_secs, .. } | Self::Stopped { duration_secs, .. } => Some(*duration_secs),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        assert!(CaptureState::default().is_idle());
    }

    #[test]
    fn status_accessors() {
        let status = CaptureStatus::Stopped {
            reason: StopReason::DurationLimit,
            captured_samples: 160,
            duration_secs: 0.01,
        };
        assert!(status.is_stopped());
        assert!(status.hit_duration_limit());
        assert_eq!(status.captured_samples(), Some(160));
        assert_eq!(status.duration(), Some(0.01));

        let err = CaptureStatus::Error(CaptureError::EmptyInput);
        assert_eq!(err.captured_samples(), None);
        assert!(!err.hit_duration_limit());
    }
}
