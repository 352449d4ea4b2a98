//! cpal microphone capture into a looping ring.
//!
//! The `cpal::Stream` lives on a dedicated thread for its whole life; the
//! driver callback downmixes to mono and writes into a shared `SoftwareRing`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Sample, SampleFormat, SizedSample, StreamConfig};

use ring_recorder_core::processing::wav_format::downmix_into;
use ring_recorder_core::SoftwareRing;

use crate::device_enumerator::DeviceEnumerator;
use crate::error::CpalError;

/// How often the capture thread checks whether it should shut down.
const SHUTDOWN_CHECK_INTERVAL: Duration = Duration::from_millis(10);

/// Initial size of the callback's scratch buffers; they grow if a driver
/// delivers larger blocks and are then reused.
const CALLBACK_SCRATCH_SAMPLES: usize = 8192;

/// A running capture thread feeding one ring.
pub struct MicCapture {
    ring: Arc<SoftwareRing>,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MicCapture {
    /// Open `device_name` at `sample_rate` and start writing into `ring`.
    ///
    /// Blocks until the stream is playing or has failed to open.
    pub fn start(device_name: &str, sample_rate: u32, ring: Arc<SoftwareRing>) -> Result<Self, CpalError> {
        let running = Arc::new(AtomicBool::new(true));
        let (ready_tx, ready_rx) = mpsc::channel();

        let thread_running = Arc::clone(&running);
        let thread_ring = Arc::clone(&ring);
        let name = device_name.to_string();

        let handle = thread::Builder::new()
            .name("ring-recorder-cpal-capture".into())
            .spawn(move || capture_loop(&name, sample_rate, thread_ring, thread_running, ready_tx))
            .map_err(|e| CpalError::Thread(format!("failed to spawn capture thread: {}", e)))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                ring,
                running,
                handle: Some(handle),
            }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(CpalError::Thread("capture thread exited during startup".into()))
            }
        }
    }

    pub fn ring(&self) -> &Arc<SoftwareRing> {
        &self.ring
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst) && self.ring.is_running()
    }

    /// Stop the stream and join the capture thread.
    pub fn stop(&mut self) -> Result<(), CpalError> {
        self.running.store(false, Ordering::SeqCst);
        self.ring.halt();
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| CpalError::Thread("capture thread panicked".into()))?;
        }
        Ok(())
    }
}

impl Drop for MicCapture {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("{}", e);
        }
    }
}

fn capture_loop(
    device_name: &str,
    sample_rate: u32,
    ring: Arc<SoftwareRing>,
    running: Arc<AtomicBool>,
    ready: mpsc::Sender<Result<(), CpalError>>,
) {
    let stream = match open_stream(device_name, sample_rate, Arc::clone(&ring)) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    while running.load(Ordering::SeqCst) && ring.is_running() {
        thread::sleep(SHUTDOWN_CHECK_INTERVAL);
    }

    drop(stream);
    ring.halt();
    log::debug!("capture thread for '{}' finished", device_name);
}

/// Find the device, pick a config at `sample_rate` and start the stream.
fn open_stream(device_name: &str, sample_rate: u32, ring: Arc<SoftwareRing>) -> Result<cpal::Stream, CpalError> {
    let device = DeviceEnumerator::new().find_device(device_name)?;
    let (config, sample_format) = select_config(&device, sample_rate).ok_or_else(|| CpalError::UnsupportedRate {
        device: device_name.to_string(),
        sample_rate,
    })?;

    log::info!(
        "opening '{}': {} Hz, {} channel(s), {:?}",
        device_name,
        config.sample_rate.0,
        config.channels,
        sample_format
    );

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, ring)?,
        SampleFormat::I16 => build_stream::<i16>(&device, &config, ring)?,
        SampleFormat::U16 => build_stream::<u16>(&device, &config, ring)?,
        other => {
            log::warn!("'{}' only offers {:?} at {} Hz", device_name, other, sample_rate);
            return Err(CpalError::UnsupportedRate {
                device: device_name.to_string(),
                sample_rate,
            });
        }
    };
    stream.play()?;
    Ok(stream)
}

/// Prefer a mono f32 config covering `sample_rate`, then any channel layout.
fn select_config(device: &cpal::Device, sample_rate: u32) -> Option<(StreamConfig, SampleFormat)> {
    let ranges: Vec<_> = device
        .supported_input_configs()
        .ok()?
        .filter(|r| r.min_sample_rate().0 <= sample_rate && sample_rate <= r.max_sample_rate().0)
        .collect();

    let score = |r: &cpal::SupportedStreamConfigRange| {
        let mono = if r.channels() == 1 { 0 } else { 2 };
        let float = if r.sample_format() == SampleFormat::F32 { 0 } else { 1 };
        mono + float
    };

    ranges.into_iter().min_by_key(score).map(|range| {
        let supported = range.with_sample_rate(cpal::SampleRate(sample_rate));
        (supported.config(), supported.sample_format())
    })
}

fn build_stream<T>(device: &cpal::Device, config: &StreamConfig, ring: Arc<SoftwareRing>) -> Result<cpal::Stream, CpalError>
where
    T: SizedSample,
    f32: cpal::FromSample<T>,
{
    let channels = config.channels as usize;
    let error_ring = Arc::clone(&ring);
    let mut converted = Vec::with_capacity(CALLBACK_SCRATCH_SAMPLES);
    let mut mono = Vec::with_capacity(CALLBACK_SCRATCH_SAMPLES);

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            ring.write(to_mono(data, channels, &mut converted, &mut mono));
        },
        move |err| {
            log::error!("audio stream error: {}", err);
            if matches!(err, cpal::StreamError::DeviceNotAvailable) {
                error_ring.halt();
            }
        },
        None,
    )?;
    Ok(stream)
}

/// Convert a driver block to mono f32 in the given scratch buffers.
fn to_mono<'a, T>(data: &[T], channels: usize, converted: &'a mut Vec<f32>, mono: &'a mut Vec<f32>) -> &'a [f32]
where
    T: SizedSample,
    f32: cpal::FromSample<T>,
{
    converted.clear();
    converted.extend(data.iter().map(|&s| f32::from_sample(s)));
    if channels > 1 {
        downmix_into(converted, channels, mono);
        mono
    } else {
        converted
    }
}
