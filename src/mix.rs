//! Stem mixer: per-layer gain, summation, peak-safety normalization.

use crate::engine::StemPaths;
use crate::error::{Result, StemixError};
use crate::media::wav::{self, AudioBuffer};
use std::path::Path;

/// Linear gain multipliers applied before summation. Unity is 1.0; no
/// upper bound is enforced here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gains {
    pub voice: f32,
    pub music: f32,
    pub background: f32,
}

impl Default for Gains {
    fn default() -> Self {
        Self {
            voice: 1.0,
            music: 1.0,
            background: 1.0,
        }
    }
}

/// Sum four stems into one buffer.
///
/// All inputs are truncated to the shortest stem — never padded — because
/// the separation engine occasionally drifts a few samples between stems.
/// Drums and bass share the music gain. If the summed peak exceeds 1.0 the
/// whole buffer is divided by that absolute peak so the output never
/// clips; this is the only automatic gain adjustment.
pub fn mix_buffers(
    voice: &[f32],
    drums: &[f32],
    bass: &[f32],
    background: &[f32],
    gains: Gains,
) -> Vec<f32> {
    let n = voice
        .len()
        .min(drums.len())
        .min(bass.len())
        .min(background.len());

    let mut mixed = Vec::with_capacity(n);
    for i in 0..n {
        mixed.push(
            voice[i] * gains.voice
                + drums[i] * gains.music
                + bass[i] * gains.music
                + background[i] * gains.background,
        );
    }

    let peak = mixed.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
    if peak > 1.0 {
        for sample in &mut mixed {
            *sample /= peak;
        }
    }

    mixed
}

fn load_checked(path: &Path, reference: Option<&AudioBuffer>) -> Result<AudioBuffer> {
    let buffer = wav::read(path)?;
    if let Some(reference) = reference {
        if buffer.sample_rate != reference.sample_rate {
            return Err(StemixError::AudioFormat {
                expected: format!("{} Hz", reference.sample_rate),
                actual: format!("{} Hz in {}", buffer.sample_rate, path.display()),
            });
        }
        if buffer.channels != reference.channels {
            return Err(StemixError::AudioFormat {
                expected: format!("{} channels", reference.channels),
                actual: format!("{} channels in {}", buffer.channels, path.display()),
            });
        }
    }
    Ok(buffer)
}

/// Load the four stems, mix them, and write a 16-bit PCM WAV.
///
/// `background` may point at a denoised variant instead of `stems.other`.
pub fn mix_stems(
    stems: &StemPaths,
    background: &Path,
    gains: Gains,
    out: &Path,
) -> Result<()> {
    let voice = load_checked(&stems.vocals, None)?;
    let drums = load_checked(&stems.drums, Some(&voice))?;
    let bass = load_checked(&stems.bass, Some(&voice))?;
    let other = load_checked(background, Some(&voice))?;

    let mixed = mix_buffers(
        &voice.samples,
        &drums.samples,
        &bass.samples,
        &other.samples,
        gains,
    );

    wav::write(
        out,
        &AudioBuffer {
            samples: mixed,
            sample_rate: voice.sample_rate,
            channels: voice.channels,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn gains(voice: f32, music: f32, background: f32) -> Gains {
        Gains {
            voice,
            music,
            background,
        }
    }

    #[test]
    fn zero_background_gain_excludes_the_background_layer() {
        let voice = vec![0.1, 0.2, 0.3];
        let drums = vec![0.05, 0.05, 0.05];
        let bass = vec![0.02, 0.02, 0.02];
        let background = vec![0.9, -0.9, 0.9];

        let with_bg_muted = mix_buffers(&voice, &drums, &bass, &background, gains(1.0, 1.0, 0.0));
        let without_bg = mix_buffers(&voice, &drums, &bass, &[0.0; 3], gains(1.0, 1.0, 1.0));

        for (a, b) in with_bg_muted.iter().zip(&without_bg) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn drums_and_bass_share_the_music_gain() {
        let out = mix_buffers(&[0.0], &[0.1], &[0.2], &[0.0], gains(1.0, 2.0, 1.0));
        assert!((out[0] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn peak_above_one_is_normalized_to_exactly_one() {
        let out = mix_buffers(
            &[0.9, -0.9],
            &[0.9, -0.9],
            &[0.9, -0.9],
            &[0.9, -0.9],
            gains(1.0, 1.0, 1.0),
        );
        let peak = out.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
        assert!((peak - 1.0).abs() < 1e-6);
    }

    #[test]
    fn peak_at_or_below_one_is_untouched() {
        let out = mix_buffers(&[0.25], &[0.25], &[0.25], &[0.25], gains(1.0, 1.0, 1.0));
        assert!((out[0] - 1.0).abs() < 1e-6, "sum of 4×0.25 stays exact");

        let quiet = mix_buffers(&[0.1], &[0.1], &[0.1], &[0.1], gains(1.0, 1.0, 1.0));
        assert!((quiet[0] - 0.4).abs() < 1e-6, "no normalization below peak 1.0");
    }

    #[test]
    fn output_length_is_the_shortest_stem() {
        let out = mix_buffers(
            &[0.0; 100],
            &[0.0; 97],
            &[0.0; 99],
            &[0.0; 98],
            Gains::default(),
        );
        assert_eq!(out.len(), 97);
    }

    #[test]
    fn normalization_uses_absolute_peak_not_rms() {
        // One negative spike dominates; RMS would barely register it
        let voice = vec![0.0, 0.0, -3.0, 0.0];
        let out = mix_buffers(&voice, &[0.0; 4], &[0.0; 4], &[0.0; 4], Gains::default());
        assert!((out[2] + 1.0).abs() < 1e-6);
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn gains_above_the_ui_range_are_honored() {
        let out = mix_buffers(&[0.1], &[0.0], &[0.0], &[0.0], gains(5.0, 1.0, 1.0));
        assert!((out[0] - 0.5).abs() < 1e-6);
    }

    // ── file-level wrapper ────────────────────────────────────────────────

    fn write_stem(path: &Path, samples: Vec<f32>, sample_rate: u32) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        wav::write(
            path,
            &AudioBuffer {
                samples,
                sample_rate,
                channels: 2,
            },
        )
        .unwrap();
    }

    fn stems_in(dir: &Path, sample_rate: u32, len: usize) -> StemPaths {
        let stems = StemPaths {
            vocals: dir.join("vocals.wav"),
            drums: dir.join("drums.wav"),
            bass: dir.join("bass.wav"),
            other: dir.join("other.wav"),
        };
        for (_, path) in stems.iter() {
            write_stem(path, vec![0.0; len], sample_rate);
        }
        stems
    }

    #[test]
    fn silent_stems_at_unity_gain_mix_to_silence_of_equal_length() {
        let dir = TempDir::new().unwrap();
        let stems = stems_in(dir.path(), 44_100, 400);
        let out = dir.path().join("preview.wav");

        mix_stems(&stems, &stems.other, Gains::default(), &out).unwrap();

        let mixed = wav::read(&out).unwrap();
        assert_eq!(mixed.samples.len(), 400);
        assert!(mixed.samples.iter().all(|&s| s == 0.0));
        assert_eq!(mixed.sample_rate, 44_100);
    }

    #[test]
    fn mix_stems_rejects_sample_rate_mismatch() {
        let dir = TempDir::new().unwrap();
        let stems = stems_in(dir.path(), 44_100, 100);
        write_stem(&stems.bass, vec![0.0; 100], 48_000);

        let err = mix_stems(
            &stems,
            &stems.other,
            Gains::default(),
            &dir.path().join("preview.wav"),
        )
        .unwrap_err();
        assert!(matches!(err, StemixError::AudioFormat { .. }));
    }

    #[test]
    fn mix_stems_uses_the_background_override() {
        let dir = TempDir::new().unwrap();
        let stems = stems_in(dir.path(), 44_100, 100);
        let cleaned = dir.path().join("background_clean.wav");
        write_stem(&cleaned, vec![0.5; 100], 44_100);

        let out = dir.path().join("preview.wav");
        mix_stems(&stems, &cleaned, Gains::default(), &out).unwrap();

        let mixed = wav::read(&out).unwrap();
        // Only the override contributes signal
        assert!(mixed.samples.iter().all(|&s| (s - 0.5).abs() < 1e-3));
    }
}
