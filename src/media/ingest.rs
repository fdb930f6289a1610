//! PCM extraction from arbitrary input media.

use crate::defaults;
use crate::error::Result;
use crate::exec::ToolRunner;
use std::path::Path;

/// Extract a normalized PCM audio stream from any container/codec ffmpeg
/// understands: 44.1 kHz, stereo, 16-bit little-endian.
pub fn extract_audio(runner: &dyn ToolRunner, input: &Path, out_wav: &Path) -> Result<()> {
    let input = input.to_string_lossy();
    let out = out_wav.to_string_lossy();
    let rate = defaults::SAMPLE_RATE.to_string();
    let channels = defaults::CHANNELS.to_string();

    runner.run(
        "ffmpeg",
        &[
            "-y", "-i", &input, "-vn", "-acodec", "pcm_s16le", "-ar", &rate, "-ac", &channels,
            &out,
        ],
    )?;
    Ok(())
}
