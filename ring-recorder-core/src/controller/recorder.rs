use std::sync::Arc;

use crate::models::audio_models::CaptureDevice;
use crate::models::config::{RecorderConfig, SUPPORTED_SAMPLE_RATES};
use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingResult;
use crate::models::state::CaptureStatus;
use crate::session::capture::CaptureSession;
use crate::storage::{metadata, wav_writer};
use crate::traits::capture_backend::CaptureBackend;
use crate::traits::capture_delegate::CaptureDelegate;

/// Turns UI intents (record, stop, pick device, pick rate) into session calls
/// and saves each finished capture to disk.
///
/// Holds no presentation state; anything a UI needs comes back as a
/// [`CaptureStatus`] or through the [`CaptureDelegate`].
pub struct RecorderController<B: CaptureBackend> {
    session: CaptureSession<B>,
    config: RecorderConfig,
    devices: Vec<CaptureDevice>,
    selected_device: Option<usize>,
    last_saved: Option<RecordingResult>,
    capture_saved: bool,
    last_error: Option<CaptureError>,
    delegate: Option<Arc<dyn CaptureDelegate>>,
}

impl<B: CaptureBackend> RecorderController<B> {
    pub fn new(backend: B, config: RecorderConfig) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;

        let mut controller = Self {
            session: CaptureSession::new(backend),
            config,
            devices: Vec::new(),
            selected_device: None,
            last_saved: None,
            capture_saved: false,
            last_error: None,
            delegate: None,
        };
        if let Err(e) = controller.refresh_devices() {
            log::warn!("device discovery failed: {}", e);
        }
        Ok(controller)
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn CaptureDelegate>) {
        self.session.set_delegate(Arc::clone(&delegate));
        self.delegate = Some(delegate);
    }

    pub fn session(&self) -> &CaptureSession<B> {
        &self.session
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Session status. Outside a capture, the error from the last failed
    /// start or save is reported until the next successful one.
    pub fn status(&self) -> CaptureStatus {
        match self.last_error {
            Some(ref e) if !self.is_capturing() => CaptureStatus::Error(e.clone()),
            _ => self.session.status(),
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.session.state().is_capturing()
    }

    pub fn last_saved(&self) -> Option<&RecordingResult> {
        self.last_saved.as_ref()
    }

    // --- Device and rate selection ---

    /// Re-query the backend. Keeps the current selection if it still exists.
    pub fn refresh_devices(&mut self) -> Result<&[CaptureDevice], CaptureError> {
        let previous = self.selected_device().map(|d| d.name.clone());
        self.devices = self.session.backend().devices()?;

        let wanted = previous.or_else(|| self.config.device_name.clone());
        self.selected_device = wanted
            .and_then(|name| self.devices.iter().position(|d| d.name == name))
            .or_else(|| self.devices.iter().position(|d| d.is_default))
            .or(if self.devices.is_empty() { None } else { Some(0) });

        log::info!(
            "{} capture device(s), selected: {}",
            self.devices.len(),
            self.selected_device().map(|d| d.name.as_str()).unwrap_or("none")
        );
        Ok(&self.devices)
    }

    pub fn devices(&self) -> &[CaptureDevice] {
        &self.devices
    }

    pub fn selected_device(&self) -> Option<&CaptureDevice> {
        self.selected_device.and_then(|i| self.devices.get(i))
    }

    pub fn select_device(&mut self, name: &str) -> Result<(), CaptureError> {
        if self.is_capturing() {
            return Err(CaptureError::AlreadyCapturing);
        }
        let index = self
            .devices
            .iter()
            .position(|d| d.name == name)
            .ok_or_else(|| CaptureError::DeviceUnavailable(format!("no device named '{}'", name)))?;
        self.selected_device = Some(index);
        Ok(())
    }

    /// Move to the next device. Ignored while capturing.
    pub fn cycle_device(&mut self) -> Option<&CaptureDevice> {
        if !self.is_capturing() && !self.devices.is_empty() {
            let next = self.selected_device.map(|i| (i + 1) % self.devices.len()).unwrap_or(0);
            self.selected_device = Some(next);
        }
        self.selected_device()
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Move to the next supported sample rate. Ignored while capturing.
    pub fn cycle_sample_rate(&mut self) -> u32 {
        if !self.is_capturing() {
            let next = SUPPORTED_SAMPLE_RATES
                .iter()
                .position(|&r| r == self.config.sample_rate)
                .map(|i| (i + 1) % SUPPORTED_SAMPLE_RATES.len())
                .unwrap_or(0);
            self.config.sample_rate = SUPPORTED_SAMPLE_RATES[next];
            log::info!("sample rate: {} Hz", self.config.sample_rate);
        }
        self.config.sample_rate
    }

    // --- Recording ---

    /// Start if idle, otherwise stop and save.
    pub fn toggle(&mut self) -> Result<CaptureStatus, CaptureError> {
        if self.is_capturing() {
            self.stop()?;
            Ok(self.status())
        } else {
            self.start()
        }
    }

    pub fn start(&mut self) -> Result<CaptureStatus, CaptureError> {
        let Some(device) = self.selected_device().cloned() else {
            let err = CaptureError::DeviceUnavailable("no capture device found".into());
            self.report_error(&err);
            return Err(err);
        };

        log::info!(
            "caps for '{}': {}-{}Hz",
            device.name,
            device.min_sample_rate,
            device.max_sample_rate
        );

        match self
            .session
            .start(&device.name, self.config.sample_rate, self.config.max_duration_secs)
        {
            Ok(status) => {
                self.capture_saved = false;
                self.last_error = None;
                Ok(status)
            }
            Err(e) => {
                log::error!("failed to start '{}' at {}Hz: {}", device.name, self.config.sample_rate, e);
                self.report_error(&e);
                if e.is_device_error() {
                    if let Err(refresh) = self.refresh_devices() {
                        log::warn!("device refresh failed: {}", refresh);
                    }
                }
                Err(e)
            }
        }
    }

    /// Stop capturing and save whatever was captured.
    ///
    /// Returns `Ok(None)` when nothing was captured.
    pub fn stop(&mut self) -> Result<Option<RecordingResult>, CaptureError> {
        self.session.stop();
        self.save_captured()
    }

    /// One scheduling tick: drain the ring and save if the duration cap was hit.
    pub fn tick(&mut self) -> CaptureStatus {
        if !self.is_capturing() {
            return self.status();
        }

        if self.session.poll().hit_duration_limit() {
            // Errors are already logged and forwarded to the delegate.
            let _ = self.save_captured();
        }
        self.status()
    }

    /// Redo whatever part of the last save failed, e.g. after an `IoFailure`.
    ///
    /// A WAV already on disk is never written twice; only a missing sidecar
    /// is retried for it.
    pub fn retry_save(&mut self) -> Result<Option<RecordingResult>, CaptureError> {
        if !self.capture_saved {
            return self.save_captured();
        }
        let Some(saved) = self.last_saved.clone() else {
            return Ok(None);
        };
        if self.config.write_metadata_sidecar && !metadata::metadata_path(&saved.file_path).is_file() {
            self.write_sidecar(&saved)?;
        }
        self.last_error = None;
        Ok(Some(saved))
    }

    /// Captured time as `MM:SS`.
    pub fn elapsed_label(&self) -> String {
        format_elapsed(self.session.samples().len(), self.session.sample_rate())
    }

    fn save_captured(&mut self) -> Result<Option<RecordingResult>, CaptureError> {
        if self.capture_saved {
            return Ok(self.last_saved.clone());
        }
        let Some(audio) = self.session.captured_audio() else {
            log::info!("nothing captured, no file written");
            return Ok(None);
        };

        let result = match wav_writer::save_recording(&self.config.recordings_dir, &audio) {
            Ok(result) => result,
            Err(e) => {
                log::error!("save failed: {}", e);
                self.report_error(&e);
                return Err(e);
            }
        };

        log::info!("saved {}", result.file_path.display());
        self.capture_saved = true;
        self.last_saved = Some(result.clone());
        self.last_error = None;
        if let Some(ref delegate) = self.delegate {
            delegate.on_recording_saved(&result);
        }

        if self.config.write_metadata_sidecar {
            self.write_sidecar(&result)?;
        }
        Ok(Some(result))
    }

    fn write_sidecar(&mut self, result: &RecordingResult) -> Result<(), CaptureError> {
        match metadata::write_metadata(&result.metadata, &result.file_path) {
            Ok(path) => {
                log::debug!("wrote {}", path.display());
                Ok(())
            }
            Err(e) => {
                log::error!("metadata for {} not written: {}", result.file_path.display(), e);
                self.report_error(&e);
                Err(e)
            }
        }
    }

    fn report_error(&mut self, error: &CaptureError) {
        self.last_error = Some(error.clone());
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(error);
            delegate.on_status_changed(&CaptureStatus::Error(error.clone()));
        }
    }
}

/// Format a sample count as `MM:SS` of audio at `sample_rate`.
pub fn format_elapsed(samples: usize, sample_rate: u32) -> String {
    let secs = if sample_rate == 0 { 0 } else { samples / sample_rate as usize };
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::simulated::SimulatedBackend;
    use crate::processing::wav_format::decode_wav;
    use crate::storage::recording_path::recording_file_name;
    use chrono::Local;
    use parking_lot::Mutex;
    use std::fs;
    use std::path::PathBuf;

    #[derive(Default)]
    struct EventLog {
        saved: Mutex<Vec<PathBuf>>,
        errors: Mutex<Vec<CaptureError>>,
    }

    impl CaptureDelegate for EventLog {
        fn on_status_changed(&self, _status: &CaptureStatus) {}

        fn on_error(&self, error: &CaptureError) {
            self.errors.lock().push(error.clone());
        }

        fn on_recording_saved(&self, result: &RecordingResult) {
            self.saved.lock().push(result.file_path.clone());
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ring_recorder_ctrl_{}_{}", name, std::process::id()))
    }

    fn controller(name: &str, backend: SimulatedBackend) -> RecorderController<SimulatedBackend> {
        let config = RecorderConfig {
            sample_rate: 8000,
            max_duration_secs: 1,
            recordings_dir: temp_dir(name),
            ..Default::default()
        };
        RecorderController::new(backend, config).unwrap()
    }

    #[test]
    fn selects_default_device() {
        let backend = SimulatedBackend::new().with_device("built-in").with_device("usb");
        let ctrl = controller("select", backend);
        assert_eq!(ctrl.selected_device().unwrap().name, "built-in");
    }

    #[test]
    fn preferred_device_from_config() {
        let backend = SimulatedBackend::new().with_device("built-in").with_device("usb");
        let config = RecorderConfig {
            device_name: Some("usb".into()),
            recordings_dir: temp_dir("preferred"),
            ..Default::default()
        };
        let ctrl = RecorderController::new(backend, config).unwrap();
        assert_eq!(ctrl.selected_device().unwrap().name, "usb");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = RecorderConfig {
            sample_rate: 0,
            ..Default::default()
        };
        assert!(matches!(
            RecorderController::new(SimulatedBackend::new(), config),
            Err(CaptureError::ConfigurationFailed(_))
        ));
    }

    #[test]
    fn cycling_wraps_and_is_locked_while_capturing() {
        let backend = SimulatedBackend::new().with_device("a").with_device("b");
        let mut ctrl = controller("cycle", backend);

        assert_eq!(ctrl.cycle_device().unwrap().name, "b");
        assert_eq!(ctrl.cycle_device().unwrap().name, "a");
        assert_eq!(ctrl.cycle_sample_rate(), 16000);

        ctrl.start().unwrap();
        assert_eq!(ctrl.cycle_device().unwrap().name, "a");
        assert_eq!(ctrl.cycle_sample_rate(), 16000);
        assert_eq!(ctrl.select_device("b"), Err(CaptureError::AlreadyCapturing));
        ctrl.stop().unwrap();

        assert_eq!(ctrl.cycle_sample_rate(), 22050);
        ctrl.config.sample_rate = 48000;
        assert_eq!(ctrl.cycle_sample_rate(), 8000);
    }

    #[test]
    fn toggle_records_and_saves() {
        let backend = SimulatedBackend::new().with_device("mic0");
        let mut ctrl = controller("toggle", backend.clone());
        let events = Arc::new(EventLog::default());
        ctrl.set_delegate(events.clone());

        assert!(ctrl.toggle().unwrap().is_capturing());
        backend.write("mic0", &vec![0.5; 4000]);
        assert_eq!(ctrl.tick().captured_samples(), Some(4000));
        assert_eq!(ctrl.elapsed_label(), "00:00");

        assert!(ctrl.toggle().unwrap().is_stopped());
        let saved = ctrl.last_saved().unwrap().clone();
        assert_eq!(saved.sample_count, 4000);
        assert_eq!(events.saved.lock().as_slice(), &[saved.file_path.clone()]);

        let decoded = decode_wav(&fs::read(&saved.file_path).unwrap()).unwrap();
        assert_eq!(decoded.header.sample_rate, 8000);
        assert_eq!(decoded.samples.len(), 4000);

        fs::remove_dir_all(&ctrl.config.recordings_dir).ok();
    }

    #[test]
    fn cap_auto_saves_once() {
        let backend = SimulatedBackend::new().with_device("mic0");
        let mut ctrl = controller("cap", backend.clone());
        let events = Arc::new(EventLog::default());
        ctrl.set_delegate(events.clone());

        ctrl.start().unwrap();
        backend.write("mic0", &vec![0.1; 5000]);
        ctrl.tick();
        backend.write("mic0", &vec![0.1; 5000]);
        let status = ctrl.tick();

        assert!(status.hit_duration_limit());
        assert_eq!(ctrl.last_saved().unwrap().sample_count, 8000);
        assert_eq!(ctrl.elapsed_label(), "00:01");

        // The UI's stop after an auto-stop must not write a second file.
        let again = ctrl.stop().unwrap().unwrap();
        assert_eq!(again.file_path, ctrl.last_saved().unwrap().file_path);
        assert_eq!(events.saved.lock().len(), 1);

        fs::remove_dir_all(&ctrl.config.recordings_dir).ok();
    }

    #[test]
    fn empty_capture_saves_nothing() {
        let backend = SimulatedBackend::new().with_device("mic0");
        let mut ctrl = controller("empty", backend);
        ctrl.start().unwrap();
        assert_eq!(ctrl.stop(), Ok(None));
        assert!(ctrl.last_saved().is_none());
    }

    #[test]
    fn failed_save_can_be_retried() {
        let backend = SimulatedBackend::new().with_device("mic0");
        let mut ctrl = controller("retry", backend.clone());
        let events = Arc::new(EventLog::default());
        ctrl.set_delegate(events.clone());

        // Block the recordings directory with a plain file.
        let dir = ctrl.config.recordings_dir.clone();
        fs::create_dir_all(dir.parent().unwrap()).unwrap();
        fs::write(&dir, b"blocker").unwrap();

        ctrl.start().unwrap();
        backend.write("mic0", &vec![0.3; 100]);
        assert!(matches!(ctrl.stop(), Err(CaptureError::IoFailure(_))));
        assert_eq!(events.errors.lock().len(), 1);
        assert_eq!(ctrl.session().samples().len(), 100);
        assert!(matches!(ctrl.status(), CaptureStatus::Error(CaptureError::IoFailure(_))));

        fs::remove_file(&dir).unwrap();
        let result = ctrl.retry_save().unwrap().unwrap();
        assert_eq!(result.sample_count, 100);
        assert!(result.file_path.exists());
        assert!(ctrl.status().is_stopped());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn sidecar_written_when_enabled() {
        let backend = SimulatedBackend::new().with_device("mic0");
        let mut ctrl = controller("sidecar", backend.clone());
        ctrl.config.write_metadata_sidecar = true;

        ctrl.start().unwrap();
        backend.write("mic0", &vec![0.3; 10]);
        let result = ctrl.stop().unwrap().unwrap();
        let read = metadata::read_metadata(&result.file_path).unwrap();
        assert_eq!(read, result.metadata);

        fs::remove_dir_all(&ctrl.config.recordings_dir).ok();
    }

    #[test]
    fn failed_sidecar_retries_without_a_second_wav() {
        let backend = SimulatedBackend::new().with_device("mic0");
        let mut ctrl = controller("sidecar_fail", backend.clone());
        ctrl.config.write_metadata_sidecar = true;
        let dir = ctrl.config.recordings_dir.clone();
        fs::remove_dir_all(&dir).ok();

        // Occupy the sidecar names for the seconds around the save with directories.
        let now = Local::now();
        let blockers: Vec<PathBuf> = (-1..=3)
            .map(|offset| {
                let name = recording_file_name(&(now + chrono::Duration::seconds(offset)), Some("mic0"), 8000);
                metadata::metadata_path(&dir.join(name))
            })
            .collect();
        for blocker in &blockers {
            fs::create_dir_all(blocker).unwrap();
        }

        ctrl.start().unwrap();
        backend.write("mic0", &vec![0.3; 100]);
        assert!(matches!(ctrl.stop(), Err(CaptureError::IoFailure(_))));
        let saved = ctrl.last_saved().unwrap().clone();
        assert!(saved.file_path.is_file());
        assert!(matches!(ctrl.status(), CaptureStatus::Error(_)));

        for blocker in &blockers {
            fs::remove_dir(blocker).unwrap();
        }
        let retried = ctrl.retry_save().unwrap().unwrap();
        assert_eq!(retried.file_path, saved.file_path);
        assert_eq!(metadata::read_metadata(&saved.file_path).unwrap(), saved.metadata);

        let wavs = fs::read_dir(&dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "wav"))
            .count();
        assert_eq!(wavs, 1);
        assert!(ctrl.status().is_stopped());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn second_start_error_does_not_hide_capture() {
        let backend = SimulatedBackend::new().with_device("mic0");
        let mut ctrl = controller("second_start", backend);
        ctrl.start().unwrap();
        assert_eq!(ctrl.start(), Err(CaptureError::AlreadyCapturing));
        assert!(ctrl.status().is_capturing());
        ctrl.stop().unwrap();
    }

    #[test]
    fn start_without_devices_reports_error() {
        let mut ctrl = controller("nodevice", SimulatedBackend::new());
        let events = Arc::new(EventLog::default());
        ctrl.set_delegate(events.clone());

        assert!(matches!(ctrl.start(), Err(CaptureError::DeviceUnavailable(_))));
        assert_eq!(events.errors.lock().len(), 1);
        assert!(matches!(ctrl.status(), CaptureStatus::Error(CaptureError::DeviceUnavailable(_))));
        assert!(ctrl.session().state().is_idle());
    }

    #[test]
    fn unavailable_device_keeps_controller_idle() {
        let backend = SimulatedBackend::new().with_device("mic0");
        backend.set_unavailable("mic0", true);
        let mut ctrl = controller("unavailable", backend.clone());
        assert!(ctrl.start().is_err());
        assert!(!ctrl.is_capturing());

        backend.set_unavailable("mic0", false);
        assert!(ctrl.start().unwrap().is_capturing());
    }

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(0, 16000), "00:00");
        assert_eq!(format_elapsed(16000 * 75, 16000), "01:15");
        assert_eq!(format_elapsed(100, 0), "00:00");
    }
}
