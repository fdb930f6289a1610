//! Media file plumbing: PCM extraction, denoising, muxing, WAV I/O.

pub mod denoise;
pub mod ingest;
pub mod mux;
pub mod wav;

use crate::defaults;
use std::path::Path;

/// Whether a path looks like a video container by extension.
pub fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .is_some_and(|e| defaults::VIDEO_EXTS.contains(&e.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_extensions_detected_case_insensitively() {
        assert!(is_video(Path::new("clip.mp4")));
        assert!(is_video(Path::new("clip.MKV")));
        assert!(is_video(Path::new("/some/dir/clip.webm")));
    }

    #[test]
    fn audio_and_extensionless_paths_are_not_video() {
        assert!(!is_video(Path::new("track.wav")));
        assert!(!is_video(Path::new("track.mp3")));
        assert!(!is_video(Path::new("track")));
    }
}
