//! # ring-recorder-cpal
//!
//! Microphone backend for ring-recorder built on cpal.
//!
//! Provides:
//! - `CpalBackend`: `CaptureBackend` driving one capture thread per device
//! - `DeviceEnumerator`: input devices and their sample-rate ranges
//! - `CpalPermissionGate`: desktop microphone access check
//!
//! ## Usage
//! ```ignore
//! use ring_recorder_core::{RecorderConfig, RecorderController};
//! use ring_recorder_cpal::CpalBackend;
//!
//! let mut recorder = RecorderController::new(CpalBackend::new(), RecorderConfig::default())?;
//! recorder.toggle();
//! ```

pub mod cpal_backend;
pub mod cpal_mic;
pub mod device_enumerator;
pub mod error;
pub mod permissions;

pub use cpal_backend::CpalBackend;
pub use device_enumerator::DeviceEnumerator;
pub use error::CpalError;
pub use permissions::CpalPermissionGate;
