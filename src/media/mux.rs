//! Recombining the mixed audio with the original picture stream.

use crate::error::Result;
use crate::exec::ToolRunner;
use std::path::Path;

/// Mux the mixed track back under the source video.
///
/// The video stream is copied unmodified; the audio stream is replaced
/// entirely. `-shortest` truncates to the shorter input so upstream stem
/// truncation never leaves trailing freeze-frame or silence.
pub fn mux_video(
    runner: &dyn ToolRunner,
    video: &Path,
    mixed_wav: &Path,
    out: &Path,
) -> Result<()> {
    let video = video.to_string_lossy();
    let mixed = mixed_wav.to_string_lossy();
    let out = out.to_string_lossy();

    runner.run(
        "ffmpeg",
        &[
            "-y", "-i", &video, "-i", &mixed, "-c:v", "copy", "-map", "0:v:0", "-map", "1:a:0",
            "-shortest", &out,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StemixError;
    use crate::exec::MockToolRunner;

    #[test]
    fn copies_video_and_replaces_audio_with_shortest_semantics() {
        let runner = MockToolRunner::new();
        mux_video(
            &runner,
            Path::new("in.mp4"),
            Path::new("preview.wav"),
            Path::new("output.mp4"),
        )
        .unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0].0, "ffmpeg");
        assert_eq!(
            calls[0].1,
            vec![
                "-y",
                "-i",
                "in.mp4",
                "-i",
                "preview.wav",
                "-c:v",
                "copy",
                "-map",
                "0:v:0",
                "-map",
                "1:a:0",
                "-shortest",
                "output.mp4",
            ]
        );
    }

    #[test]
    fn mux_failure_propagates() {
        let runner = MockToolRunner::new().with_failure("could not find codec parameters");
        let err = mux_video(
            &runner,
            Path::new("in.mp4"),
            Path::new("preview.wav"),
            Path::new("output.mp4"),
        )
        .unwrap_err();
        assert!(matches!(err, StemixError::ToolFailed { .. }));
    }
}
