//! Error types for stemix.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StemixError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // External tool errors
    #[error("External tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("{tool} failed: {output}")]
    ToolFailed { tool: String, output: String },

    // Separation errors
    #[error("Separation did not produce the {stem} stem at {path}")]
    IncompleteSeparation { stem: String, path: String },

    // Audio file errors
    #[error("Audio format mismatch: expected {expected}, got {actual}")]
    AudioFormat { expected: String, actual: String },

    #[error("Failed to read audio from {path}: {message}")]
    AudioRead { path: String, message: String },

    #[error("Failed to write audio to {path}: {message}")]
    AudioWrite { path: String, message: String },

    // Job errors
    #[error("Job not found: {job_id}")]
    JobNotFound { job_id: String },

    #[error("Job {job_id}: {message}")]
    InvalidState { job_id: String, message: String },

    // IPC errors
    #[error("IPC socket error: {message}")]
    IpcSocket { message: String },

    #[error("IPC protocol error: {message}")]
    IpcProtocol { message: String },

    #[error("IPC connection failed: {message}")]
    IpcConnection { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, StemixError>;
