//! WAV loading and writing for the mixer.
//!
//! Separated stems arrive as 16-bit or 32-bit float WAV depending on the
//! engine version, so reads normalize everything to interleaved f32.

use crate::error::{Result, StemixError};
use std::path::Path;

/// Interleaved f32 audio with its source format.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    /// Length of the buffer in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.channels as f64 / self.sample_rate as f64
    }
}

fn read_error(path: &Path, e: impl std::fmt::Display) -> StemixError {
    StemixError::AudioRead {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

fn write_error(path: &Path, e: impl std::fmt::Display) -> StemixError {
    StemixError::AudioWrite {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Read a whole WAV file into an interleaved f32 buffer.
pub fn read(path: &Path) -> Result<AudioBuffer> {
    let reader = hound::WavReader::open(path).map_err(|e| read_error(path, e))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| read_error(path, e))?,
        hound::SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| read_error(path, e))?
        }
    };

    Ok(AudioBuffer {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Write an interleaved f32 buffer as 16-bit PCM.
///
/// Samples are expected in [-1.0, 1.0]; anything outside is clamped.
pub fn write(path: &Path, buffer: &AudioBuffer) -> Result<()> {
    let spec = hound::WavSpec {
        channels: buffer.channels,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| write_error(path, e))?;
    for &sample in &buffer.samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(value)
            .map_err(|e| write_error(path, e))?;
    }
    writer.finalize().map_err(|e| write_error(path, e))?;
    Ok(())
}

/// Probe a WAV header without decoding samples.
///
/// Returns (sample rate, duration in seconds).
pub fn probe(path: &Path) -> Result<(u32, f64)> {
    let reader = hound::WavReader::open(path).map_err(|e| read_error(path, e))?;
    let spec = reader.spec();
    let frames = reader.duration();
    Ok((spec.sample_rate, frames as f64 / spec.sample_rate as f64))
}
