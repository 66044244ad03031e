// ============================================================================
// psspectrum-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Types for the Conversion Pipelines
//
// This module defines the error types shared by the stream patcher, the tool
// runner and the pipeline orchestrator. Tool failures carry their own nested
// error type so the orchestrator can attach the failing step's label.
//
// KEY COMPONENTS:
// - CoreError: Main error enum for the library
// - ToolFailure: Why a single external tool invocation failed
// - CoreResult: Result alias used throughout the crate

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Why an external tool invocation did not succeed.
#[derive(Error, Debug)]
pub enum ToolFailure {
    #[error("exited with non-zero status: {0}")]
    NonZeroExit(i32),

    #[error("was terminated without an exit code")]
    Terminated,

    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("timed out after {} seconds and was killed", .0.as_secs())]
    Timeout(Duration),

    #[error("I/O error while running: {0}")]
    Io(#[from] io::Error),
}

impl ToolFailure {
    /// The exit code, if the process got far enough to report one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ToolFailure::NonZeroExit(code) => Some(*code),
            _ => None,
        }
    }
}

/// Custom error type for psspectrum-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Required tools not found: {}", .missing.join(", "))]
    DependencyMissing { missing: Vec<String> },

    #[error("Could not find GOP start code (000001B8) in '{}'", .path.display())]
    MarkerNotFound { path: PathBuf },

    #[error("Stream patch I/O error on '{}': {source}", .path.display())]
    PatchIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{step} failed: tool {source}")]
    ToolExecutionFailed {
        step: String,
        #[source]
        source: ToolFailure,
    },

    #[error("Failed to write '{}': {source}", .path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not remove intermediate file '{}': {source}", .path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Another conversion job is already running")]
    JobInProgress,

    #[error("Conversion worker thread panicked")]
    WorkerPanicked,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CoreError {
    pub(crate) fn patch_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CoreError::PatchIo {
            path: path.into(),
            source,
        }
    }
}

/// Result type for psspectrum-core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;
