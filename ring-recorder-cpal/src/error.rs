use ring_recorder_core::CaptureError;
use thiserror::Error;

/// Failures talking to the cpal host, before they are folded into [`CaptureError`].
#[derive(Debug, Error)]
pub enum CpalError {
    #[error("no input device named '{0}'")]
    DeviceNotFound(String),

    #[error("'{device}' cannot capture at {sample_rate} Hz")]
    UnsupportedRate { device: String, sample_rate: u32 },

    #[error("failed to enumerate devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("failed to query configs: {0}")]
    Configs(#[from] cpal::SupportedStreamConfigsError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("capture thread: {0}")]
    Thread(String),
}

impl From<CpalError> for CaptureError {
    fn from(e: CpalError) -> Self {
        CaptureError::DeviceUnavailable(e.to_string())
    }
}
