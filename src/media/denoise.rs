//! Spectral denoising of the background stem.

use crate::defaults;
use crate::error::Result;
use crate::exec::ToolRunner;
use std::path::{Path, PathBuf};

/// Run the external spectral denoiser on a stem.
///
/// `strength_percent` is 0-100. Zero is an exact passthrough: the original
/// path is returned and no subprocess runs. Otherwise the percentage maps
/// linearly to the denoiser's nr unit, capped at 97.0.
pub fn denoise(
    runner: &dyn ToolRunner,
    layer: &Path,
    strength_percent: f32,
    work_dir: &Path,
) -> Result<PathBuf> {
    let strength = strength_percent.clamp(0.0, 100.0);
    if strength <= 0.0 {
        return Ok(layer.to_path_buf());
    }

    let nr = (strength * defaults::DENOISE_SCALE).min(defaults::DENOISE_MAX);
    let out = work_dir.join("background_clean.wav");
    let filter = format!(
        "afftdn=nr={:.1}:nf={}",
        nr,
        defaults::DENOISE_NOISE_FLOOR_DB
    );

    let layer = layer.to_string_lossy();
    let out_arg = out.to_string_lossy().to_string();
    runner.run("ffmpeg", &["-y", "-i", &layer, "-af", &filter, &out_arg])?;
    Ok(out)
}
