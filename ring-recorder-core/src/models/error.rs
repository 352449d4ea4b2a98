use thiserror::Error;

/// Errors that can occur while capturing, encoding or saving audio.
///
/// Every variant is recoverable: the session is left in a consistent state
/// and the caller decides whether to retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// No device, permission denied, or the platform returned no ring handle.
    #[error("device not available: {0}")]
    DeviceUnavailable(String),

    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("capture already in progress")]
    AlreadyCapturing,

    /// Nothing was captured, so there is nothing to encode.
    #[error("no samples to encode")]
    EmptyInput,

    #[error("i/o failure: {0}")]
    IoFailure(String),

    #[error("malformed wav data: {0}")]
    MalformedWav(String),
}

impl CaptureError {
    /// Whether the error came from the platform device layer.
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceUnavailable(_))
    }
}
