use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::controller::recorder::RecorderController;
use crate::models::error::CaptureError;
use crate::traits::capture_backend::CaptureBackend;

/// Background thread that ticks a shared [`RecorderController`] at a fixed interval.
///
/// The controller mutex serializes ticks with UI calls, so the session never
/// sees concurrent `start` / `poll` / `stop`.
pub struct PollingDriver {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PollingDriver {
    pub fn spawn<B>(controller: Arc<Mutex<RecorderController<B>>>, interval: Duration) -> Result<Self, CaptureError>
    where
        B: CaptureBackend + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("ring-recorder-poll".into())
            .spawn(move || {
                while flag.load(Ordering::SeqCst) {
                    thread::sleep(interval);
                    controller.lock().tick();
                }
            })
            .map_err(|e| CaptureError::ConfigurationFailed(format!("failed to spawn polling thread: {}", e)))?;

        log::debug!("polling every {:?}", interval);
        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Spawn with the controller's configured `poll_interval`.
    pub fn spawn_configured<B>(controller: Arc<Mutex<RecorderController<B>>>) -> Result<Self, CaptureError>
    where
        B: CaptureBackend + 'static,
    {
        let interval = controller.lock().config().poll_interval;
        Self::spawn(controller, interval)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop ticking and wait for the thread to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("polling thread panicked");
            }
        }
    }
}

impl Drop for PollingDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
