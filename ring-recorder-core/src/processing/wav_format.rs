//! WAV file format utilities.
//!
//! Generates standard 44-byte RIFF WAV headers, encodes float captures to
//! 16-bit PCM, and parses files produced this way back into samples.

use crate::models::error::CaptureError;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Bits per encoded sample. Only 16-bit PCM is produced.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Channel count of everything this crate records.
pub const MONO: u16 = 1;

const PCM_FORMAT: u16 = 1;

/// Generate a 44-byte WAV RIFF header.
///
/// Format: PCM (format code 1), little-endian.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    36 + data_size
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * channels * bit_depth / 8
/// [32-33]  block_align = channels * bit_depth / 8
/// [34-35]  bit_depth
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
///
/// Fields that do not fit their width saturate; [`encode_wav`] rejects such
/// formats before building a header.
pub fn generate_wav_header(sample_rate: u32, bit_depth: u16, channels: u16, data_size: u32) -> [u8; WAV_HEADER_SIZE] {
    let byte_rate = byte_rate(sample_rate, channels, bit_depth).unwrap_or(u32::MAX);
    let block_align = (channels as u32 * bit_depth as u32 / 8).min(u16::MAX as u32) as u16;
    let chunk_size = data_size.saturating_add(36);

    let mut header = [0u8; WAV_HEADER_SIZE];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&PCM_FORMAT.to_le_bytes());
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&bit_depth.to_le_bytes());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

fn byte_rate(sample_rate: u32, channels: u16, bit_depth: u16) -> Option<u32> {
    sample_rate.checked_mul(channels as u32 * bit_depth as u32 / 8)
}

/// Quantize one float sample to 16-bit PCM.
///
/// Clamps to `[-1.0, 1.0]`, scales by 32767 and truncates toward zero. Existing
/// recordings were produced with truncation, so this must not round.
pub fn quantize_sample(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Encode interleaved float samples as a complete 16-bit PCM WAV file.
///
/// Returns `EmptyInput` when there is nothing to encode.
pub fn encode_wav(samples: &[f32], sample_rate: u32, channels: u16) -> Result<Vec<u8>, CaptureError> {
    if samples.is_empty() {
        return Err(CaptureError::EmptyInput);
    }
    if channels == 0 {
        return Err(CaptureError::ConfigurationFailed("channel count must be positive".into()));
    }
    if channels as u32 * BITS_PER_SAMPLE as u32 / 8 > u16::MAX as u32 {
        return Err(CaptureError::ConfigurationFailed(format!("{} channels exceed the WAV block size", channels)));
    }
    if byte_rate(sample_rate, channels, BITS_PER_SAMPLE).is_none() {
        return Err(CaptureError::ConfigurationFailed(format!(
            "{} Hz x {} channels exceeds the WAV byte rate limit",
            sample_rate, channels
        )));
    }

    let data_size = samples.len() * (BITS_PER_SAMPLE as usize / 8);
    let data_size_u32 = u32::try_from(data_size)
        .ok()
        .filter(|size| size.checked_add(36).is_some())
        .ok_or_else(|| CaptureError::ConfigurationFailed(format!("{} samples exceed the WAV size limit", samples.len())))?;

    let mut bytes = Vec::with_capacity(WAV_HEADER_SIZE + data_size);
    bytes.extend_from_slice(&generate_wav_header(sample_rate, BITS_PER_SAMPLE, channels, data_size_u32));
    for &sample in samples {
        bytes.extend_from_slice(&quantize_sample(sample).to_le_bytes());
    }
    Ok(bytes)
}

/// Header fields read back from a PCM WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

/// Parse the canonical 44-byte header written by [`generate_wav_header`].
pub fn parse_wav_header(bytes: &[u8]) -> Result<WavHeader, CaptureError> {
    if bytes.len() < WAV_HEADER_SIZE {
        return Err(CaptureError::MalformedWav(format!("{} bytes is shorter than a header", bytes.len())));
    }
    if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(CaptureError::MalformedWav("missing RIFF/WAVE magic".into()));
    }
    if &bytes[12..16] != b"fmt " || &bytes[36..40] != b"data" {
        return Err(CaptureError::MalformedWav("unexpected chunk layout".into()));
    }

    let u16_at = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);
    let u32_at = |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);

    let format = u16_at(20);
    if format != PCM_FORMAT {
        return Err(CaptureError::MalformedWav(format!("unsupported format code {}", format)));
    }
    let bits_per_sample = u16_at(34);
    if bits_per_sample != BITS_PER_SAMPLE {
        return Err(CaptureError::MalformedWav(format!("unsupported bit depth {}", bits_per_sample)));
    }

    Ok(WavHeader {
        channels: u16_at(22),
        sample_rate: u32_at(24),
        byte_rate: u32_at(28),
        block_align: u16_at(32),
        bits_per_sample,
        data_size: u32_at(40),
    })
}

/// A decoded 16-bit PCM WAV file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedWav {
    pub header: WavHeader,
    pub samples: Vec<i16>,
}

impl DecodedWav {
    /// Samples scaled back to floats by dividing by 32767.
    pub fn to_f32(&self) -> Vec<f32> {
        self.samples.iter().map(|&s| s as f32 / i16::MAX as f32).collect()
    }
}

/// Decode a WAV file produced by [`encode_wav`].
pub fn decode_wav(bytes: &[u8]) -> Result<DecodedWav, CaptureError> {
    let header = parse_wav_header(bytes)?;
    let payload = &bytes[WAV_HEADER_SIZE..];
    let data_size = header.data_size as usize;
    if payload.len() < data_size {
        return Err(CaptureError::MalformedWav(format!(
            "data chunk declares {} bytes but only {} present",
            data_size,
            payload.len()
        )));
    }

    let samples = payload[..data_size]
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    Ok(DecodedWav { header, samples })
}

/// Downmix interleaved multi-channel audio to mono by averaging channels per frame.
pub fn downmix_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    let mut mono = Vec::with_capacity(samples.len() / channels.max(1));
    downmix_into(samples, channels, &mut mono);
    mono
}

/// Like [`downmix_to_mono`], reusing `out`'s allocation. `out` is cleared first.
pub fn downmix_into(samples: &[f32], channels: usize, out: &mut Vec<f32>) {
    out.clear();
    if channels <= 1 {
        out.extend_from_slice(samples);
        return;
    }
    let scale = 1.0 / channels as f32;
    out.extend(samples.chunks_exact(channels).map(|frame| frame.iter().sum::<f32>() * scale));
}
