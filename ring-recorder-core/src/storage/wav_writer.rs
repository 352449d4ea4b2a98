use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::audio_models::CapturedAudio;
use crate::models::error::CaptureError;
use crate::models::recording_result::{RecordingMetadata, RecordingResult};
use crate::processing::wav_format;
use crate::storage::recording_path;

/// Encode `audio` and write it to a timestamped file inside `dir`.
///
/// Empty captures are rejected with `EmptyInput` before anything touches the
/// disk. The captured samples are borrowed, so a failed write can be retried.
pub fn save_recording(dir: &Path, audio: &CapturedAudio) -> Result<RecordingResult, CaptureError> {
    let path = recording_path::recording_path(dir, audio.device_name.as_deref(), audio.sample_rate);
    save_recording_to(path, audio)
}

/// Encode `audio` and write it to exactly `path`.
pub fn save_recording_to(path: PathBuf, audio: &CapturedAudio) -> Result<RecordingResult, CaptureError> {
    let bytes = wav_format::encode_wav(&audio.samples, audio.sample_rate, wav_format::MONO)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| CaptureError::IoFailure(format!("failed to create directory: {}", e)))?;
    }

    log::info!("saving {} samples to {}", audio.samples.len(), path.display());
    write_file(&path, &bytes)?;

    let checksum = hex_encode(&Sha256::digest(&bytes));
    let metadata = RecordingMetadata::new_mono(
        &path.to_string_lossy(),
        audio.device_name.as_deref(),
        audio.sample_rate,
        audio.samples.len(),
        &checksum,
    );

    Ok(RecordingResult {
        file_path: path,
        duration_secs: audio.duration_secs(),
        sample_count: audio.samples.len(),
        sample_rate: audio.sample_rate,
        device_name: audio.device_name.clone(),
        checksum,
        metadata,
    })
}

/// SHA-256 hex digest of a file on disk.
pub fn file_checksum(path: &Path) -> Result<String, CaptureError> {
    let data = fs::read(path)
        .map_err(|e| CaptureError::IoFailure(format!("failed to read file for checksum: {}", e)))?;
    Ok(hex_encode(&Sha256::digest(&data)))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), CaptureError> {
    let mut file =
        File::create(path).map_err(|e| CaptureError::IoFailure(format!("failed to create file: {}", e)))?;
    file.write_all(bytes)
        .map_err(|e| CaptureError::IoFailure(format!("write failed: {}", e)))?;
    file.flush().map_err(|e| CaptureError::IoFailure(e.to_string()))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::wav_format::decode_wav;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ring_recorder_test_{}_{}", name, std::process::id()))
    }

    fn audio(samples: Vec<f32>) -> CapturedAudio {
        CapturedAudio {
            samples,
            sample_rate: 16000,
            device_name: Some("mic0".into()),
        }
    }

    #[test]
    fn writes_wav_file() {
        let dir = temp_dir("writes");
        let result = save_recording(&dir, &audio(vec![0.5; 8000])).unwrap();

        let data = fs::read(&result.file_path).unwrap();
        assert_eq!(data.len(), 44 + 16000);
        let decoded = decode_wav(&data).unwrap();
        assert_eq!(decoded.header.sample_rate, 16000);
        assert_eq!(decoded.header.data_size, 16000);
        assert!(decoded.samples.iter().all(|&s| s == 16383));

        assert_eq!(result.sample_count, 8000);
        assert!((result.duration_secs - 0.5).abs() < 1e-9);
        assert_eq!(result.checksum, file_checksum(&result.file_path).unwrap());
        assert_eq!(result.checksum.len(), 64);

        let name = result.file_path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("_mic0_16k.wav"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn empty_capture_writes_nothing() {
        let dir = temp_dir("empty");
        assert_eq!(save_recording(&dir, &audio(Vec::new())), Err(CaptureError::EmptyInput));
        assert!(!dir.exists());
    }

    #[test]
    fn unwritable_destination_is_io_failure() {
        let dir = temp_dir("blocked");
        fs::create_dir_all(&dir).unwrap();
        // A regular file where the directory should be.
        let blocker = dir.join("not_a_dir");
        fs::write(&blocker, b"x").unwrap();

        let err = save_recording(&blocker, &audio(vec![0.1; 10])).unwrap_err();
        assert!(matches!(err, CaptureError::IoFailure(_)));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn identical_audio_has_identical_checksum() {
        let dir = temp_dir("checksum");
        let a = save_recording_to(dir.join("a.wav"), &audio(vec![0.2, -0.2, 0.9])).unwrap();
        let b = save_recording_to(dir.join("b.wav"), &audio(vec![0.2, -0.2, 0.9])).unwrap();
        assert_eq!(a.checksum, b.checksum);
        fs::remove_dir_all(&dir).ok();
    }
}
