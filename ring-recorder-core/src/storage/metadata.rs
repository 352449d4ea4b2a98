use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingMetadata;

/// Path of the JSON sidecar for a recording: `{recording}.metadata.json`.
pub fn metadata_path(recording_path: &Path) -> PathBuf {
    recording_path.with_extension("metadata.json")
}

/// Write recording metadata as a JSON sidecar file.
pub fn write_metadata(metadata: &RecordingMetadata, recording_path: &Path) -> Result<PathBuf, CaptureError> {
    let path = metadata_path(recording_path);
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| CaptureError::IoFailure(format!("failed to serialize metadata: {}", e)))?;
    fs::write(&path, json).map_err(|e| CaptureError::IoFailure(format!("failed to write metadata: {}", e)))?;
    Ok(path)
}

/// Read recording metadata from a JSON sidecar file.
pub fn read_metadata(recording_path: &Path) -> Result<RecordingMetadata, CaptureError> {
    let json = fs::read_to_string(metadata_path(recording_path))
        .map_err(|e| CaptureError::IoFailure(format!("failed to read metadata: {}", e)))?;
    serde_json::from_str(&json).map_err(|e| CaptureError::IoFailure(format!("failed to parse metadata: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_round_trip() {
        let dir = std::env::temp_dir().join(format!("ring_recorder_meta_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let recording = dir.join("Rec_20240101_000000_mic0_16k.wav");

        let metadata = RecordingMetadata::new_mono(&recording.to_string_lossy(), Some("mic0"), 16000, 160, "ff00");
        let written = write_metadata(&metadata, &recording).unwrap();
        assert_eq!(written, dir.join("Rec_20240101_000000_mic0_16k.metadata.json"));

        assert_eq!(read_metadata(&recording).unwrap(), metadata);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_sidecar_is_io_failure() {
        let err = read_metadata(Path::new("/nonexistent/recording.wav")).unwrap_err();
        assert!(matches!(err, CaptureError::IoFailure(_)));
    }
}
