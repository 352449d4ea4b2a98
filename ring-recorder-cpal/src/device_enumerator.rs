//! Input device enumeration via the cpal default host.
//!
//! Reports each capture device with the sample-rate range its configs cover.

use cpal::traits::{DeviceTrait, HostTrait};

use ring_recorder_core::CaptureDevice;

use crate::error::CpalError;

/// Audio device enumerator over the cpal default host.
pub struct DeviceEnumerator {
    host: cpal::Host,
}

impl DeviceEnumerator {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    /// List input devices with their supported rate ranges.
    ///
    /// Devices whose configs cannot be queried are listed with `0-0 Hz`.
    pub fn list_capture_devices(&self) -> Result<Vec<CaptureDevice>, CpalError> {
        let default_name = self.host.default_input_device().and_then(|d| d.name().ok());

        let devices = self
            .host
            .input_devices()?
            .filter_map(|device| {
                let name = device.name().ok()?;
                let (min, max) = rate_range(&device).unwrap_or_else(|e| {
                    log::warn!("could not query rates for '{}': {}", name, e);
                    (0, 0)
                });
                Some(CaptureDevice {
                    is_default: default_name.as_deref() == Some(name.as_str()),
                    name,
                    min_sample_rate: min,
                    max_sample_rate: max,
                })
            })
            .collect();

        Ok(devices)
    }

    /// Look up an input device by its cpal name.
    pub fn find_device(&self, name: &str) -> Result<cpal::Device, CpalError> {
        self.host
            .input_devices()?
            .find(|d| d.name().ok().as_deref() == Some(name))
            .ok_or_else(|| CpalError::DeviceNotFound(name.to_string()))
    }

    pub fn default_device_name(&self) -> Option<String> {
        self.host.default_input_device().and_then(|d| d.name().ok())
    }
}

impl Default for DeviceEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowest and highest rate across all of a device's input configs.
fn rate_range(device: &cpal::Device) -> Result<(u32, u32), CpalError> {
    let mut range: Option<(u32, u32)> = None;
    for config in device.supported_input_configs()? {
        let (lo, hi) = (config.min_sample_rate().0, config.max_sample_rate().0);
        range = Some(match range {
            Some((min, max)) => (min.min(lo), max.max(hi)),
            None => (lo, hi),
        });
    }
    Ok(range.unwrap_or((0, 0)))
}
