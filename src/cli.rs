//! Command-line interface for stemix
//!
//! Provides argument parsing using clap derive macros.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Stem-level audio remixing for video and audio files
#[derive(Parser, Debug)]
#[command(
    name = "stemix",
    version,
    about = "Stem-level audio remixing for video and audio files"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to Unix socket (default: $XDG_RUNTIME_DIR/stemix.sock)
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Gain and denoise knobs shared by `render` and `run`.
#[derive(Args, Debug, Clone)]
pub struct MixArgs {
    /// Voice gain as a percent of unity
    #[arg(long, value_name = "PERCENT", default_value = "100")]
    pub voice: f32,

    /// Music (drums + bass) gain as a percent of unity
    #[arg(long, value_name = "PERCENT", default_value = "100")]
    pub music: f32,

    /// Background gain as a percent of unity
    #[arg(long, value_name = "PERCENT", default_value = "100")]
    pub background: f32,

    /// Background denoise strength, 0-100 (0 disables)
    #[arg(long, value_name = "PERCENT", default_value = "0")]
    pub wind_reduction: f32,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the daemon (foreground process for systemd)
    Daemon,

    /// Register a media file as a new job via IPC
    Submit {
        /// Video or audio file to process
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Begin stem separation for an uploaded job via IPC
    Start {
        #[arg(value_name = "JOB_ID")]
        job_id: String,

        /// Device hint passed to the separation engine (e.g. cpu, cuda)
        #[arg(long, value_name = "DEVICE")]
        device: Option<String>,
    },

    /// Print a job's status snapshot via IPC
    Status {
        #[arg(value_name = "JOB_ID")]
        job_id: String,
    },

    /// Poll a job's status until it finishes
    Watch {
        #[arg(value_name = "JOB_ID")]
        job_id: String,
    },

    /// Mix a ready job's stems via IPC
    Render {
        #[arg(value_name = "JOB_ID")]
        job_id: String,

        #[command(flatten)]
        mix: MixArgs,
    },

    /// Produce the final artifact from the last render via IPC
    Export {
        #[arg(value_name = "JOB_ID")]
        job_id: String,
    },

    /// Run the whole pipeline in-process, no daemon required
    Run {
        /// Video or audio file to process
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Device hint passed to the separation engine (e.g. cpu, cuda)
        #[arg(long, value_name = "DEVICE")]
        device: Option<String>,

        #[command(flatten)]
        mix: MixArgs,
    },
}
