//! Scratch files a pipeline creates and the best-effort cleanup that runs
//! after every job.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::CoreError;
use crate::events::LogSink;

/// Ordered list of scratch paths for one job.
///
/// Paths are derived from the job's input/output names, so repeated runs
/// reuse and overwrite the same files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntermediateFileSet {
    paths: Vec<PathBuf>,
}

impl IntermediateFileSet {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Deletes every path that exists and returns the ones removed.
    ///
    /// Missing files are skipped silently. Any other failure is logged as a
    /// [`CoreError::Cleanup`] and never stops the remaining deletions.
    pub fn cleanup(&self, sink: &mut dyn LogSink) -> Vec<PathBuf> {
        let mut removed = Vec::new();

        for path in &self.paths {
            match fs::remove_file(path) {
                Ok(()) => {
                    log::debug!("Removed intermediate file {}", path.display());
                    removed.push(path.clone());
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => {
                    let err = CoreError::Cleanup {
                        path: path.clone(),
                        source,
                    };
                    log::warn!("{}", err);
                    sink.line(&format!("[WARN] {err}"));
                }
            }
        }

        removed
    }
}
