//! Microphone permission for desktop hosts.
//!
//! Desktop platforms have no per-app consent prompt that cpal can trigger;
//! access counts as granted when an input device can be enumerated.

use ring_recorder_core::PermissionGate;

use crate::device_enumerator::DeviceEnumerator;

/// [`PermissionGate`] that checks for a usable default input device.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalPermissionGate;

impl PermissionGate for CpalPermissionGate {
    fn is_granted(&self) -> bool {
        check_microphone_permission()
    }

    fn request(&self) {
        // No consent dialog to raise; OS privacy settings are changed by the user.
        log::info!("microphone access is controlled by system privacy settings");
    }
}

/// Whether a default input device is visible to this process.
pub fn check_microphone_permission() -> bool {
    let granted = DeviceEnumerator::new().default_device_name().is_some();
    if !granted {
        log::warn!("no default input device; microphone may be disabled in privacy settings");
    }
    granted
}
