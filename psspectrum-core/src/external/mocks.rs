// psspectrum-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for this crate's unit tests only.

use super::ToolRunner;
use crate::error::ToolFailure;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// How a scripted tool invocation ends.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Success,
    ExitCode(i32),
    LaunchError,
}

/// Represents an expected tool call and its scripted result.
#[derive(Debug, Clone)]
pub struct MockToolExpectation {
    /// Matched against the program path and every argument (substring).
    pub pattern: String,
    /// Output lines emitted before the tool "exits".
    pub lines: Vec<String>,
    pub outcome: MockOutcome,
    /// Files created (empty unless contents given) before the tool "exits".
    pub creates: Vec<(PathBuf, Vec<u8>)>,
}

/// Mock implementation of ToolRunner supporting multiple ordered expectations.
///
/// Each expectation is consumed by the first call it matches. A call with no
/// matching expectation panics.
#[derive(Debug, Clone, Default)]
pub struct MockToolRunner {
    expectations: Arc<Mutex<Vec<MockToolExpectation>>>,
    received_calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockToolRunner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_expectation(&self, expectation: MockToolExpectation) {
        self.expectations
            .lock()
            .expect("mock expectations poisoned")
            .push(expectation);
    }

    pub fn add_success_expectation(
        &self,
        pattern: &str,
        lines: &[&str],
        creates: Vec<(PathBuf, Vec<u8>)>,
    ) {
        self.add_expectation(MockToolExpectation {
            pattern: pattern.to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
            outcome: MockOutcome::Success,
            creates,
        });
    }

    pub fn add_exit_error_expectation(&self, pattern: &str, lines: &[&str], exit_code: i32) {
        self.add_expectation(MockToolExpectation {
            pattern: pattern.to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
            outcome: MockOutcome::ExitCode(exit_code),
            creates: Vec::new(),
        });
    }

    pub fn add_launch_error_expectation(&self, pattern: &str) {
        self.add_expectation(MockToolExpectation {
            pattern: pattern.to_string(),
            lines: Vec::new(),
            outcome: MockOutcome::LaunchError,
            creates: Vec::new(),
        });
    }

    /// Every call received so far, program first, then arguments.
    pub fn received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls
            .lock()
            .expect("mock calls poisoned")
            .clone()
    }

    /// Expectations that were never matched.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.lock().expect("mock expectations poisoned").len()
    }
}

impl ToolRunner for MockToolRunner {
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        on_line: &mut dyn FnMut(&str),
    ) -> Result<(), ToolFailure> {
        let mut call = vec![program.to_string_lossy().into_owned()];
        call.extend(args.iter().map(|a| a.to_string_lossy().into_owned()));
        self.received_calls
            .lock()
            .expect("mock calls poisoned")
            .push(call.clone());

        let expectation = {
            let mut expectations = self.expectations.lock().expect("mock expectations poisoned");
            let found = expectations
                .iter()
                .position(|exp| call.iter().any(|part| part.contains(&exp.pattern)));
            match found {
                Some(index) => expectations.remove(index),
                None => panic!("MockToolRunner: No expectation found for call: {call:?}"),
            }
        };
        log::info!("MockToolRunner: Matched expectation with pattern '{}'", expectation.pattern);

        if let MockOutcome::LaunchError = expectation.outcome {
            return Err(ToolFailure::Launch {
                program: call[0].clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "mock launch failure"),
            });
        }

        for line in &expectation.lines {
            on_line(line);
        }

        for (path, contents) in &expectation.creates {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, contents)?;
        }

        match expectation.outcome {
            MockOutcome::ExitCode(code) => Err(ToolFailure::NonZeroExit(code)),
            _ => Ok(()),
        }
    }
}
