//! Job records and the processing state machine.

pub mod orchestrator;
pub mod pool;
pub mod progress;
pub mod registry;

use crate::engine::StemPaths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Lifecycle of a job. Transitions are forward-only:
/// `uploaded → processing → {ready, error}`. `Ready` and `Error` are sinks
/// for the separation phase; mixes from `Ready` never change status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Uploaded,
    Processing,
    Ready,
    Error,
}

impl JobStatus {
    /// Terminal for the separation phase.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Ready | JobStatus::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Uploaded => "uploaded",
            JobStatus::Processing => "processing",
            JobStatus::Ready => "ready",
            JobStatus::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// One unit of work: a submitted media file and everything derived from it.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    /// Percent complete, 0-100, non-decreasing for the job's lifetime.
    pub progress: u8,
    pub message: String,
    pub input_path: PathBuf,
    /// Isolated working directory owned by this job.
    pub job_dir: PathBuf,
    /// Populated only once separation succeeds.
    pub stems: Option<StemPaths>,
    /// Most recent mix output; overwritten on each render.
    pub mixed_path: Option<PathBuf>,
    pub duration_s: Option<f64>,
}

impl Job {
    pub fn new(id: String, input_path: PathBuf, job_dir: PathBuf) -> Self {
        Self {
            id,
            status: JobStatus::Uploaded,
            progress: 0,
            message: "File uploaded".to_string(),
            input_path,
            job_dir,
            stems: None,
            mixed_path: None,
            duration_s: None,
        }
    }

    /// Record stage progress. Values below the high-water mark are kept at
    /// the mark so reported progress never regresses.
    pub fn update_progress(&mut self, percent: u8, message: &str) {
        self.progress = self.progress.max(percent.min(100));
        self.message = message.to_string();
    }

    /// Terminal failure of the processing phase. Progress stays where the
    /// last stage left it.
    pub fn fail(&mut self, message: String) {
        self.status = JobStatus::Error;
        self.message = message;
    }

    /// Terminal success: stems in place, progress forced to 100.
    pub fn complete(&mut self, stems: StemPaths, duration_s: f64) {
        self.stems = Some(stems);
        self.duration_s = Some(duration_s);
        self.status = JobStatus::Ready;
        self.progress = 100;
        self.message = "Ready".to_string();
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            status: self.status,
            progress: self.progress,
            message: self.message.clone(),
            duration_s: self.duration_s,
        }
    }
}

/// Point-in-time view of a job, safe to hand to any caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    pub duration_s: Option<f64>,
}

/// Render request parameters. Gains are percents of unity (100 = 1.0);
/// wind reduction is the denoiser strength, 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixParams {
    pub voice: f32,
    pub music: f32,
    pub background: f32,
    pub wind_reduction: f32,
}

impl Default for MixParams {
    fn default() -> Self {
        Self {
            voice: 100.0,
            music: 100.0,
            background: 100.0,
            wind_reduction: 0.0,
        }
    }
}
