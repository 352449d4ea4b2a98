//! # ring-recorder-core
//!
//! Platform-agnostic ring-buffer audio capture core.
//!
//! A platform driver writes microphone samples into a looping ring buffer on
//! its own clock. This crate drains that ring on whatever schedule the host
//! provides, accumulates a capped mono capture without loss or duplication,
//! and writes it out as 16-bit PCM WAV. Platform backends implement the
//! `CaptureBackend` trait and plug into the generic `CaptureSession`.
//!
//! ## Architecture
//!
//! ```text
//! ring-recorder-core (this crate)
//! ├── traits/       ← CaptureBackend, CaptureRing, CaptureDelegate, PermissionGate
//! ├── models/       ← CaptureError, CaptureState, CaptureStatus, RecorderConfig, CaptureDevice, etc.
//! ├── processing/   ← RingReader, SampleAccumulator, WAV encode/decode
//! ├── session/      ← CaptureSession (start / poll / stop state machine)
//! ├── storage/      ← file naming, WAV writer, metadata sidecar
//! ├── controller/   ← RecorderController, PollingDriver
//! └── backend/      ← SoftwareRing, SimulatedBackend
//! ```

pub mod backend;
pub mod controller;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use backend::simulated::SimulatedBackend;
pub use backend::software_ring::SoftwareRing;
pub use controller::driver::PollingDriver;
pub use controller::recorder::RecorderController;
pub use models::audio_models::{CaptureDevice, CapturedAudio};
pub use models::config::{RecorderConfig, SUPPORTED_SAMPLE_RATES};
pub use models::error::CaptureError;
pub use models::recording_result::{RecordingMetadata, RecordingResult};
pub use models::state::{CaptureState, CaptureStatus, StopReason};
pub use processing::accumulator::{AppendOutcome, SampleAccumulator};
pub use processing::ring_reader::RingReader;
pub use processing::wav_format::{decode_wav, encode_wav};
pub use session::capture::CaptureSession;
pub use traits::capture_backend::{CaptureBackend, CaptureRing};
pub use traits::capture_delegate::CaptureDelegate;
pub use traits::permission::{wait_for_permission, PermissionGate};
