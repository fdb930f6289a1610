//! JSON message protocol for IPC communication between CLI and daemon.

use crate::job::{JobStatus, MixParams};
use serde::{Deserialize, Serialize};

/// Commands sent by CLI to the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Register a media file as a new job
    Submit { path: String },
    /// Begin separation for an uploaded job
    Start {
        job_id: String,
        device: Option<String>,
    },
    /// Get a job's status snapshot
    Status { job_id: String },
    /// Mix the job's stems with the given parameters
    Render {
        job_id: String,
        #[serde(default)]
        params: MixParams,
    },
    /// Produce the final artifact from the last render
    Export { job_id: String },
    /// Shutdown the daemon
    Shutdown,
}

impl Command {
    /// Serialize command to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize command from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Responses sent by daemon to CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Command succeeded
    Ok,
    /// Job registered
    Submitted { job_id: String },
    /// Current job status
    Status {
        status: JobStatus,
        progress: u8,
        message: String,
        duration_s: Option<f64>,
    },
    /// A mix or export artifact was produced
    Artifact { path: String },
    /// Error occurred
    Error { message: String },
}

impl Response {
    /// Serialize response to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize response from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
