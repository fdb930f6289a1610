//! External tool execution with testable command running.
//!
//! Every subprocess the pipeline touches (transcoder, separation engine,
//! denoiser) goes through the `ToolRunner` trait so stages can be tested
//! without spawning anything.

use crate::defaults;
use crate::error::{Result, StemixError};
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::sync::Mutex;

/// Trait for running external tools.
///
/// Object-safe, Send + Sync for use from worker threads.
pub trait ToolRunner: Send + Sync {
    /// Run a tool to completion with captured output.
    ///
    /// Returns the tool's stdout on success. A non-zero exit maps to
    /// `ToolFailed` carrying the tail of the captured stderr.
    fn run(&self, tool: &str, args: &[&str]) -> Result<String>;

    /// Run a tool, feeding each line of its merged stdout/stderr to
    /// `on_line` as it arrives.
    ///
    /// A non-zero exit maps to `ToolFailed` carrying the last captured
    /// lines of output.
    fn run_streamed(
        &self,
        tool: &str,
        args: &[&str],
        on_line: &mut dyn FnMut(&str),
    ) -> Result<()>;
}

/// Production tool runner using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemToolRunner;

impl SystemToolRunner {
    pub fn new() -> Self {
        Self
    }
}

fn spawn_error(tool: &str, e: std::io::Error) -> StemixError {
    if e.kind() == std::io::ErrorKind::NotFound {
        StemixError::ToolNotFound {
            tool: tool.to_string(),
        }
    } else {
        StemixError::ToolFailed {
            tool: tool.to_string(),
            output: format!("failed to execute: {}", e),
        }
    }
}

/// Keep only the last `limit` characters of a diagnostic blob.
fn tail_chars(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut start = text.len() - limit;
    // Stay on a char boundary
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].to_string()
}

impl ToolRunner for SystemToolRunner {
    fn run(&self, tool: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(tool)
            .args(args)
            .output()
            .map_err(|e| spawn_error(tool, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StemixError::ToolFailed {
                tool: tool.to_string(),
                output: tail_chars(stderr.trim_end(), defaults::DIAG_TAIL_CHARS),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn run_streamed(
        &self,
        tool: &str,
        args: &[&str],
        on_line: &mut dyn FnMut(&str),
    ) -> Result<()> {
        let mut child = Command::new(tool)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(tool, e))?;

        let stdout = child.stdout.take().ok_or_else(|| StemixError::ToolFailed {
            tool: tool.to_string(),
            output: "no stdout pipe".to_string(),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| StemixError::ToolFailed {
            tool: tool.to_string(),
            output: "no stderr pipe".to_string(),
        })?;

        // Both pipes feed one channel; the caller's callback runs on this
        // thread, so it needs no synchronization of its own.
        let (tx, rx) = crossbeam_channel::unbounded::<String>();
        let mut tail: VecDeque<String> = VecDeque::with_capacity(defaults::DIAG_TAIL_LINES);

        std::thread::scope(|scope| {
            let tx_out = tx.clone();
            let tx_err = tx;
            scope.spawn(move || forward_lines(stdout, tx_out));
            scope.spawn(move || forward_lines(stderr, tx_err));

            for line in rx.iter() {
                on_line(&line);
                if tail.len() == defaults::DIAG_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
        });

        let status = child.wait()?;
        if !status.success() {
            let lines: Vec<String> = tail.into_iter().collect();
            return Err(StemixError::ToolFailed {
                tool: tool.to_string(),
                output: lines.join("\n"),
            });
        }

        Ok(())
    }
}

fn forward_lines<R: Read>(reader: R, tx: crossbeam_channel::Sender<String>) {
    for line in BufReader::new(reader).lines().map_while(|l| l.ok()) {
        let line = line.trim_end().to_string();
        if line.is_empty() {
            continue;
        }
        if tx.send(line).is_err() {
            break;
        }
    }
}

/// Mock tool runner for testing.
///
/// Records every invocation and replays canned output lines. Streamed
/// "output" is emitted before the configured exit result is returned.
#[derive(Debug, Default)]
pub struct MockToolRunner {
    lines: Vec<String>,
    stdout: String,
    fail_with: Option<String>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl MockToolRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines emitted to the `run_streamed` callback.
    pub fn with_lines(mut self, lines: &[&str]) -> Self {
        self.lines = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    /// Stdout returned from `run`.
    pub fn with_stdout(mut self, stdout: &str) -> Self {
        self.stdout = stdout.to_string();
        self
    }

    /// Make every invocation fail with this diagnostic.
    pub fn with_failure(mut self, diagnostic: &str) -> Self {
        self.fail_with = Some(diagnostic.to_string());
        self
    }

    /// Invocations recorded so far, as (tool, args) pairs.
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn record(&self, tool: &str, args: &[&str]) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((
                tool.to_string(),
                args.iter().map(|a| a.to_string()).collect(),
            ));
    }

    fn exit(&self, tool: &str) -> Result<()> {
        match &self.fail_with {
            Some(diagnostic) => Err(StemixError::ToolFailed {
                tool: tool.to_string(),
                output: diagnostic.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl ToolRunner for MockToolRunner {
    fn run(&self, tool: &str, args: &[&str]) -> Result<String> {
        self.record(tool, args);
        self.exit(tool)?;
        Ok(self.stdout.clone())
    }

    fn run_streamed(
        &self,
        tool: &str,
        args: &[&str],
        on_line: &mut dyn FnMut(&str),
    ) -> Result<()> {
        self.record(tool, args);
        for line in &self.lines {
            on_line(line);
        }
        self.exit(tool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_captures_stdout() {
        let runner = SystemToolRunner::new();
        let out = runner.run("sh", &["-c", "echo hello"]).unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[test]
    fn run_nonzero_exit_maps_to_tool_failed_with_stderr() {
        let runner = SystemToolRunner::new();
        let err = runner
            .run("sh", &["-c", "echo broken pipe >&2; exit 3"])
            .unwrap_err();
        match err {
            StemixError::ToolFailed { tool, output } => {
                assert_eq!(tool, "sh");
                assert!(output.contains("broken pipe"), "got: {}", output);
            }
            other => panic!("expected ToolFailed, got {:?}", other),
        }
    }

    #[test]
    fn run_missing_tool_maps_to_not_found() {
        let runner = SystemToolRunner::new();
        let err = runner
            .run("stemix-no-such-tool-a8f2", &[])
            .unwrap_err();
        match err {
            StemixError::ToolNotFound { tool } => {
                assert_eq!(tool, "stemix-no-such-tool-a8f2");
            }
            other => panic!("expected ToolNotFound, got {:?}", other),
        }
    }

    #[test]
    fn run_streamed_merges_stdout_and_stderr() {
        let runner = SystemToolRunner::new();
        let mut seen = Vec::new();
        runner
            .run_streamed(
                "sh",
                &["-c", "echo from-stdout; echo from-stderr >&2"],
                &mut |line| seen.push(line.to_string()),
            )
            .unwrap();
        // Stream interleaving is not ordered between the two pipes
        assert!(seen.iter().any(|l| l == "from-stdout"), "got: {:?}", seen);
        assert!(seen.iter().any(|l| l == "from-stderr"), "got: {:?}", seen);
    }

    #[test]
    fn run_streamed_failure_carries_output_tail() {
        let runner = SystemToolRunner::new();
        let err = runner
            .run_streamed(
                "sh",
                &["-c", "echo Traceback; echo boom; exit 1"],
                &mut |_| {},
            )
            .unwrap_err();
        match err {
            StemixError::ToolFailed { output, .. } => {
                assert!(output.contains("Traceback"), "got: {}", output);
                assert!(output.contains("boom"), "got: {}", output);
            }
            other => panic!("expected ToolFailed, got {:?}", other),
        }
    }

    #[test]
    fn run_streamed_tail_is_bounded() {
        let runner = SystemToolRunner::new();
        let script = format!(
            "for i in $(seq 1 {}); do echo line-$i; done; exit 1",
            defaults::DIAG_TAIL_LINES * 3
        );
        let err = runner
            .run_streamed("sh", &["-c", &script], &mut |_| {})
            .unwrap_err();
        match err {
            StemixError::ToolFailed { output, .. } => {
                assert_eq!(output.lines().count(), defaults::DIAG_TAIL_LINES);
                assert!(!output.contains("line-1\n"), "oldest lines should drop");
            }
            other => panic!("expected ToolFailed, got {:?}", other),
        }
    }

    #[test]
    fn tail_chars_truncates_from_the_front() {
        assert_eq!(tail_chars("abcdef", 3), "def");
        assert_eq!(tail_chars("abc", 10), "abc");
    }

    #[test]
    fn mock_runner_records_calls() {
        let runner = MockToolRunner::new();
        runner.run("ffmpeg", &["-y", "-i", "in.mp4"]).unwrap();
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "ffmpeg");
        assert_eq!(calls[0].1, vec!["-y", "-i", "in.mp4"]);
    }

    #[test]
    fn mock_runner_streams_configured_lines() {
        let runner = MockToolRunner::new().with_lines(&["10%", "50%"]);
        let mut seen = Vec::new();
        runner
            .run_streamed("demucs", &[], &mut |line| seen.push(line.to_string()))
            .unwrap();
        assert_eq!(seen, vec!["10%", "50%"]);
    }

    #[test]
    fn mock_runner_failure() {
        let runner = MockToolRunner::new().with_failure("segfault");
        let err = runner.run("demucs", &[]).unwrap_err();
        assert!(err.to_string().contains("segfault"));
    }
}
