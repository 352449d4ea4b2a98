use std::path::PathBuf;
use std::time::Duration;

/// Sample rates offered by the recorder, in the order they are cycled.
pub const SUPPORTED_SAMPLE_RATES: [u32; 5] = [8000, 16000, 22050, 44100, 48000];

/// Configuration for a recorder.
#[derive(Debug, Clone, PartialEq)]
pub struct RecorderConfig {
    /// Capture sample rate in Hz (default: 16000).
    pub sample_rate: u32,

    /// Hard cap on capture length; also sizes the device ring buffer (default: 10).
    pub max_duration_secs: u32,

    /// Directory where recordings are written.
    pub recordings_dir: PathBuf,

    /// Interval at which the polling driver drains the ring (default: 50ms).
    pub poll_interval: Duration,

    /// Write a `.metadata.json` sidecar next to each recording (default: false).
    pub write_metadata_sidecar: bool,

    /// Preferred capture device, or None for the backend's default.
    pub device_name: Option<String>,
}

impl RecorderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.max_duration_secs == 0 {
            return Err("max duration must be at least one second".into());
        }
        if self.poll_interval.is_zero() {
            return Err("poll interval must be non-zero".into());
        }
        Ok(())
    }

    /// Maximum number of mono samples a session may hold.
    pub fn max_samples(&self) -> usize {
        self.sample_rate as usize * self.max_duration_secs as usize
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            max_duration_secs: 10,
            recordings_dir: default_recordings_dir(),
            poll_interval: Duration::from_millis(50),
            write_metadata_sidecar: false,
            device_name: None,
        }
    }
}

/// `<data-local-dir>/ring-recorder/Recordings`, or `./Recordings` when the
/// platform has no data directory.
pub fn default_recordings_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("ring-recorder"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Recordings")
}
