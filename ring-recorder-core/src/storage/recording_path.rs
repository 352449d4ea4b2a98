//! Recording file naming.
//!
//! Files are named `Rec_<yyyyMMdd_HHmmss>_<device>_<rate/1000>k.wav`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};

/// Longest device-name segment kept in a file name, in characters.
pub const MAX_DEVICE_SEGMENT_CHARS: usize = 10;

const INVALID_FILE_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Reduce a device name to a file-name-safe segment.
///
/// Drops characters that are illegal in file names on common hosts, keeps at
/// most ten characters, and falls back to `"Mic"` when nothing printable is
/// left or `"UnknownMic"` when no device is known.
pub fn sanitize_device_segment(device_name: Option<&str>) -> String {
    let Some(name) = device_name.filter(|n| !n.is_empty()) else {
        return "UnknownMic".to_string();
    };

    let segment: String = name
        .chars()
        .filter(|c| !c.is_control() && !INVALID_FILE_NAME_CHARS.contains(c))
        .take(MAX_DEVICE_SEGMENT_CHARS)
        .collect();

    if segment.trim().is_empty() {
        "Mic".to_string()
    } else {
        segment
    }
}

/// File name for a recording started at `timestamp`.
pub fn recording_file_name<Tz: TimeZone>(timestamp: &DateTime<Tz>, device_name: Option<&str>, sample_rate: u32) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "Rec_{}_{}_{}k.wav",
        timestamp.format("%Y%m%d_%H%M%S"),
        sanitize_device_segment(device_name),
        sample_rate / 1000
    )
}

/// Full path for a recording saved now, in local time.
pub fn recording_path(dir: &Path, device_name: Option<&str>, sample_rate: u32) -> PathBuf {
    dir.join(recording_file_name(&Local::now(), device_name, sample_rate))
}
