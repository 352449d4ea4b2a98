use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Result returned when a capture has been written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub file_path: PathBuf,
    pub duration_secs: f64,
    pub sample_count: usize,
    pub sample_rate: u32,
    pub device_name: Option<String>,
    pub checksum: String,
    pub metadata: RecordingMetadata,
}

/// Metadata stored alongside a recording.
///
/// Serializable for the optional JSON sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub file_path: String,
    pub device_name: Option<String>,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub sample_count: usize,
    pub duration_secs: f64,
    pub checksum: String,
    pub created_at: String,
}

impl RecordingMetadata {
    /// Creates metadata for a mono 16-bit recording.
    pub fn new_mono(
        file_path: &str,
        device_name: Option<&str>,
        sample_rate: u32,
        sample_count: usize,
        checksum: &str,
    ) -> Self {
        let duration_secs = if sample_rate == 0 {
            0.0
        } else {
            sample_count as f64 / sample_rate as f64
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_path: file_path.to_string(),
            device_name: device_name.map(str::to_string),
            sample_rate,
            channels: 1,
            bits_per_sample: 16,
            sample_count,
            duration_secs,
            checksum: checksum.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_metadata_fields() {
        let meta = RecordingMetadata::new_mono("/tmp/a.wav", Some("mic0"), 16000, 8000, "abc");
        assert_eq!(meta.channels, 1);
        assert_eq!(meta.bits_per_sample, 16);
        assert!((meta.duration_secs - 0.5).abs() < 1e-9);
        assert_eq!(meta.device_name.as_deref(), Some("mic0"));
        assert!(uuid::Uuid::parse_str(&meta.id).is_ok());
    }
}
