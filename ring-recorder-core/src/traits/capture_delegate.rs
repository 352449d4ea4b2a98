use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingResult;
use crate::models::state::CaptureStatus;

/// Event delegate for recorder notifications.
///
/// Called from whichever thread drives the session (usually the polling
/// driver). Implementations should marshal to a UI thread if needed.
pub trait CaptureDelegate: Send + Sync {
    /// Called when the session changes state.
    fn on_status_changed(&self, status: &CaptureStatus);

    /// Called when a start or save fails.
    fn on_error(&self, error: &CaptureError);

    /// Called once a recording file has been written.
    fn on_recording_saved(&self, result: &RecordingResult);
}
