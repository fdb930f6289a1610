//! Separation adapter: drives the engine subprocess and validates its output.
//!
//! The engine is a black box that writes four stems under a fixed directory
//! layout and reports progress as tqdm-style lines on stderr. Lines without
//! a parseable percentage are ignored; that is engine chatter, not an error.

use crate::config::EngineConfig;
use crate::defaults;
use crate::error::{Result, StemixError};
use crate::exec::ToolRunner;
use crate::media::wav;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Locations of the four separated stems.
#[derive(Debug, Clone, PartialEq)]
pub struct StemPaths {
    pub vocals: PathBuf,
    pub drums: PathBuf,
    pub bass: PathBuf,
    pub other: PathBuf,
}

impl StemPaths {
    /// Stem locations under the engine's fixed output convention:
    /// `<out_dir>/<model>/<track-stem>/<name>.wav`.
    pub fn engine_layout(out_dir: &Path, model: &str, track: &Path) -> Self {
        let track_stem = track
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "input".to_string());
        let base = out_dir.join(model).join(track_stem);
        let [vocals, drums, bass, other] =
            defaults::STEM_NAMES.map(|name| base.join(format!("{}.wav", name)));
        Self {
            vocals,
            drums,
            bass,
            other,
        }
    }

    /// (name, path) pairs in mixing order.
    pub fn iter(&self) -> [(&'static str, &Path); 4] {
        [
            ("vocals", self.vocals.as_path()),
            ("drums", self.drums.as_path()),
            ("bass", self.bass.as_path()),
            ("other", self.other.as_path()),
        ]
    }

    /// Verify every stem exists and all share one sample rate.
    pub fn verify(&self) -> Result<()> {
        let mut reference: Option<u32> = None;
        for (name, path) in self.iter() {
            if !path.is_file() {
                return Err(StemixError::IncompleteSeparation {
                    stem: name.to_string(),
                    path: path.display().to_string(),
                });
            }
            let (rate, _) = wav::probe(path)?;
            match reference {
                None => reference = Some(rate),
                Some(expected) if expected != rate => {
                    return Err(StemixError::AudioFormat {
                        expected: format!("{} Hz across all stems", expected),
                        actual: format!("{} Hz for {}", rate, name),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// Extract a percentage token from an engine output line.
///
/// Engine progress looks like ` 42%|████▌     | ...`; the token directly
/// before the first `%` is tried as a float. Anything else yields None.
pub fn parse_percent(line: &str) -> Option<f32> {
    if !line.contains('%') {
        return None;
    }
    line.split('%')
        .next()?
        .split_whitespace()
        .last()?
        .parse::<f32>()
        .ok()
}

/// Drives one separation run per call.
#[derive(Clone)]
pub struct Separator {
    runner: Arc<dyn ToolRunner>,
    program: String,
    model: String,
}

impl Separator {
    pub fn new(runner: Arc<dyn ToolRunner>, engine: &EngineConfig) -> Self {
        Self {
            runner,
            program: engine.program.clone(),
            model: engine.model.clone(),
        }
    }

    /// Separate `audio` into four stems under `out_dir`.
    ///
    /// `device` is an opaque hardware selector passed through verbatim.
    /// `on_progress` receives the stage-local percentage (0-100) and a
    /// display message for every parseable progress line.
    pub fn separate(
        &self,
        audio: &Path,
        out_dir: &Path,
        device: &str,
        on_progress: &mut dyn FnMut(f32, &str),
    ) -> Result<StemPaths> {
        on_progress(0.0, "Starting separation...");

        let audio_arg = audio.to_string_lossy();
        let out_arg = out_dir.to_string_lossy();
        let args = [
            "--name",
            self.model.as_str(),
            "--out",
            &out_arg,
            "--device",
            device,
            &audio_arg,
        ];

        let mut forward = |line: &str| {
            if let Some(pct) = parse_percent(line) {
                on_progress(pct, &format!("Separating... {:.0}%", pct));
            }
        };
        self.runner
            .run_streamed(&self.program, &args, &mut forward)?;

        let stems = StemPaths::engine_layout(out_dir, &self.model, audio);
        stems.verify()?;

        on_progress(100.0, "Separation complete");
        Ok(stems)
    }
}
