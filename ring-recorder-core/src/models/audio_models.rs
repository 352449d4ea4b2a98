/// A capture device as reported by the platform audio subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureDevice {
    pub name: String,
    /// Lowest supported rate in Hz. `0` together with `max_sample_rate == 0`
    /// means the device accepts any rate.
    pub min_sample_rate: u32,
    pub max_sample_rate: u32,
    pub is_default: bool,
}

impl CaptureDevice {
    pub fn new(name: impl Into<String>, min_sample_rate: u32, max_sample_rate: u32) -> Self {
        Self {
            name: name.into(),
            min_sample_rate,
            max_sample_rate,
            is_default: false,
        }
    }

    pub fn supports_rate(&self, sample_rate: u32) -> bool {
        if self.min_sample_rate == 0 && self.max_sample_rate == 0 {
            return true;
        }
        (self.min_sample_rate..=self.max_sample_rate).contains(&sample_rate)
    }
}

/// A finished mono capture, ready to be encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub device_name: Option<String>,
}

impl CapturedAudio {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
