//! stemix - Stem-level audio remixing for video and audio files
//!
//! Splits a track into vocal, drum, bass and background stems, then mixes
//! them back at user-chosen gains and remuxes into the original container.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod cli;
pub mod config;
pub mod daemon;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod exec;
pub mod ipc;
pub mod job;
pub mod media;
pub mod mix;

// Core traits (tool execution seam)
pub use exec::{MockToolRunner, SystemToolRunner, ToolRunner};

// Pipeline
pub use engine::{Separator, StemPaths};
pub use job::orchestrator::Orchestrator;
pub use job::{Job, JobStatus, MixParams, StatusSnapshot};

// Error handling
pub use error::{Result, StemixError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
