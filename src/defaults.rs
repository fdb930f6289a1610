//! Pipeline constants shared across modules.

use crate::job::progress::StageSpan;

/// Target sample rate for extracted PCM audio.
pub const SAMPLE_RATE: u32 = 44_100;

/// Target channel count for extracted PCM audio.
pub const CHANNELS: u16 = 2;

/// Background workers executing job pipelines.
pub const WORKERS: usize = 2;

/// Poll cadence for status watchers.
pub const WATCH_INTERVAL_MS: u64 = 500;

/// Separation engine executable.
pub const ENGINE_PROGRAM: &str = "demucs";

/// Separation model; determines the engine's output directory layout.
pub const ENGINE_MODEL: &str = "htdemucs";

/// Default execution-device hint passed through to the engine.
pub const DEFAULT_DEVICE: &str = "cpu";

/// The four stems the engine must produce, in mixing order.
pub const STEM_NAMES: [&str; 4] = ["vocals", "drums", "bass", "other"];

/// Share of the job's 0-100 progress window owned by audio extraction.
pub const INGEST_SPAN: StageSpan = StageSpan::new(5, 10);

/// Share of the job's 0-100 progress window owned by stem separation.
pub const SEPARATE_SPAN: StageSpan = StageSpan::new(10, 98);

/// Linear scale from wind-reduction percent to the denoiser's nr unit.
pub const DENOISE_SCALE: f32 = 0.97;

/// Cap on the denoiser's nr unit.
pub const DENOISE_MAX: f32 = 97.0;

/// Noise floor in dB for the spectral denoiser.
pub const DENOISE_NOISE_FLOOR_DB: i32 = -25;

/// Max characters of captured diagnostics kept from a failed tool.
pub const DIAG_TAIL_CHARS: usize = 2000;

/// Max lines of streamed output kept for diagnostics.
pub const DIAG_TAIL_LINES: usize = 20;

/// Container extensions treated as video input (lowercase, no dot).
pub const VIDEO_EXTS: [&str; 10] = [
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "ts", "mpg",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_spans_are_disjoint_and_increasing() {
        assert!(INGEST_SPAN.start < INGEST_SPAN.end);
        assert!(SEPARATE_SPAN.start < SEPARATE_SPAN.end);
        assert!(INGEST_SPAN.end <= SEPARATE_SPAN.start);
        assert!(SEPARATE_SPAN.end <= 100);
    }

    #[test]
    fn denoise_cap_matches_scale_at_full_strength() {
        assert!((100.0 * DENOISE_SCALE - DENOISE_MAX).abs() < f32::EPSILON);
    }

    #[test]
    fn video_exts_are_lowercase() {
        for ext in VIDEO_EXTS {
            assert_eq!(ext, ext.to_lowercase());
        }
    }
}
