// ============================================================================
// psspectrum-core/src/pipeline/mod.rs
// ============================================================================
//
// PIPELINE ORCHESTRATION: Ordered Steps, Early Abort and Cleanup
//
// A pipeline is a fixed, ordered list of steps. Each step either runs an
// external tool, patches the M2V stream or writes a small text file. Steps
// run strictly one after another; the first failure stops the job. Whatever
// the outcome, the job's intermediate files are removed afterwards unless
// the job asked to keep them.
//
// KEY COMPONENTS:
// - PipelineStep / StepAction / PatchOperation: What a step does
// - Pipeline: The steps plus the job's intermediate file set
// - run_pipeline: The orchestrator
// - JobState / JobReport / JobSummary: Terminal outcome for the shell
//
// SUBMODULES:
// - encode: MP4 -> PSS step sequence
// - decode: PSS -> MP4 step sequence
// - intermediates: Scratch file tracking and cleanup
// - manifest: Mux project file rendering

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::events::LogSink;
use crate::external::{ToolRunner, format_command_line};
use crate::job::Direction;
use crate::stream_patch;

pub mod decode;
pub mod encode;
pub mod intermediates;
pub mod manifest;

pub use intermediates::IntermediateFileSet;
pub use manifest::{MuxManifest, StreamKind};

// ============================================================================
// STEPS
// ============================================================================

/// One of the two M2V edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOperation {
    /// Insert a user-data block carrying `comment` before the first GOP.
    InjectMetadata { comment: String },
    /// Append the sequence-end code if the stream does not end with it.
    EnsureSequenceEnd,
}

impl PatchOperation {
    /// Applies the edit and returns the status line for the operator log.
    fn apply(&self, target: &Path) -> CoreResult<String> {
        match self {
            PatchOperation::InjectMetadata { comment } => {
                let inserted = stream_patch::inject_metadata(target, comment)?;
                Ok(format!(
                    "Successfully injected metadata comment ({inserted} bytes)."
                ))
            }
            PatchOperation::EnsureSequenceEnd => {
                Ok(stream_patch::ensure_sequence_end_code(target)?.to_string())
            }
        }
    }
}

/// What a step does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    RunTool {
        program: PathBuf,
        args: Vec<OsString>,
    },
    PatchStream {
        operation: PatchOperation,
        target: PathBuf,
    },
    WriteTextFile {
        path: PathBuf,
        contents: String,
    },
}

/// One unit of work inside a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStep {
    pub label: String,
    pub action: StepAction,
}

impl PipelineStep {
    pub fn run_tool<I, A>(label: &str, program: &Path, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            label: label.to_string(),
            action: StepAction::RunTool {
                program: program.to_path_buf(),
                args: args.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn patch(label: &str, operation: PatchOperation, target: &Path) -> Self {
        Self {
            label: label.to_string(),
            action: StepAction::PatchStream {
                operation,
                target: target.to_path_buf(),
            },
        }
    }

    pub fn write_text(label: &str, path: &Path, contents: String) -> Self {
        Self {
            label: label.to_string(),
            action: StepAction::WriteTextFile {
                path: path.to_path_buf(),
                contents,
            },
        }
    }

    /// Runs the step. Tool failures are tagged with this step's label.
    fn execute<R: ToolRunner + ?Sized>(&self, runner: &R, sink: &mut dyn LogSink) -> CoreResult<()> {
        match &self.action {
            StepAction::RunTool { program, args } => {
                sink.line(&format!("Executing: {}", format_command_line(program, args)));
                runner
                    .run(program, args, &mut |line| sink.line(line))
                    .map_err(|source| CoreError::ToolExecutionFailed {
                        step: self.label.clone(),
                        source,
                    })
            }
            StepAction::PatchStream { operation, target } => {
                let message = operation.apply(target)?;
                sink.line(&message);
                Ok(())
            }
            StepAction::WriteTextFile { path, contents } => {
                let write = || -> std::io::Result<()> {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(path, contents)
                };
                write().map_err(|source| CoreError::FileWrite {
                    path: path.clone(),
                    source,
                })?;
                sink.line(&format!("Wrote {}", path.display()));
                Ok(())
            }
        }
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// The full step sequence for one job.
#[derive(Debug, Clone)]
pub struct Pipeline {
    direction: Direction,
    output: PathBuf,
    steps: Vec<PipelineStep>,
    intermediates: IntermediateFileSet,
    keep_intermediates: bool,
}

impl Pipeline {
    pub fn new(
        direction: Direction,
        output: PathBuf,
        intermediates: IntermediateFileSet,
        keep_intermediates: bool,
    ) -> Self {
        Self {
            direction,
            output,
            steps: Vec::new(),
            intermediates,
            keep_intermediates,
        }
    }

    pub fn with_step(mut self, step: PipelineStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn step_labels(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn intermediates(&self) -> &IntermediateFileSet {
        &self.intermediates
    }

    pub fn keeps_intermediates(&self) -> bool {
        self.keep_intermediates
    }
}

// ============================================================================
// JOB OUTCOME
// ============================================================================

/// Lifecycle of a job. `Created` and the terminal states are instantaneous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Created,
    Running,
    Succeeded,
    Failed,
}

/// The step that stopped a job.
#[derive(Debug)]
pub struct StepFailure {
    /// 1-based position of the step
    pub index: usize,
    pub label: String,
    pub error: CoreError,
}

impl StepFailure {
    /// Short reason without the step label.
    pub fn reason(&self) -> String {
        match &self.error {
            CoreError::ToolExecutionFailed { source, .. } => format!("tool {source}"),
            other => other.to_string(),
        }
    }
}

/// Terminal result of a job.
#[derive(Debug)]
pub struct JobReport {
    pub direction: Direction,
    pub state: JobState,
    pub output: PathBuf,
    /// Human-readable outcome for the shell
    pub message: String,
    pub completed_steps: Vec<String>,
    pub failure: Option<StepFailure>,
    /// Intermediate files deleted during cleanup
    pub removed_intermediates: Vec<PathBuf>,
    pub elapsed: Duration,
    pub finished_at: DateTime<Local>,
}

impl JobReport {
    pub fn is_success(&self) -> bool {
        self.state == JobState::Succeeded
    }

    pub fn summary(&self) -> JobSummary {
        JobSummary {
            direction: self.direction,
            state: self.state,
            output: self.output.display().to_string(),
            message: self.message.clone(),
            completed_steps: self.completed_steps.clone(),
            failed_step: self.failure.as_ref().map(|f| f.label.clone()),
            error: self.failure.as_ref().map(StepFailure::reason),
            removed_intermediates: self
                .removed_intermediates
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            elapsed_secs: self.elapsed.as_secs_f64(),
            finished_at: self.finished_at.to_rfc3339(),
        }
    }
}

/// Serializable view of a [`JobReport`].
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub direction: Direction,
    pub state: JobState,
    pub output: String,
    pub message: String,
    pub completed_steps: Vec<String>,
    pub failed_step: Option<String>,
    pub error: Option<String>,
    pub removed_intermediates: Vec<String>,
    pub elapsed_secs: f64,
    pub finished_at: String,
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

fn target_name(direction: Direction) -> &'static str {
    match direction {
        Direction::EncodeToContainer => "PSS",
        Direction::DecodeFromContainer => "MP4",
    }
}

/// Runs every step of `pipeline` in order, stopping at the first failure,
/// then cleans up intermediates unless the job keeps them.
pub fn run_pipeline<R: ToolRunner + ?Sized>(
    pipeline: &Pipeline,
    runner: &R,
    sink: &mut dyn LogSink,
) -> JobReport {
    let started = Instant::now();
    let mut state = JobState::Created;
    log::debug!("Job {:?}: {} -> {}", state, pipeline.direction(), pipeline.output().display());

    state = JobState::Running;
    log::debug!("Job {:?} with {} steps", state, pipeline.steps().len());

    let total = pipeline.steps().len();
    let mut completed_steps = Vec::with_capacity(total);
    let mut failure = None;

    for (i, step) in pipeline.steps().iter().enumerate() {
        let index = i + 1;
        log::info!("Step {}/{}: {}", index, total, step.label);
        sink.line(&format!("--- Step {index}: {} ---", step.label));

        if let Err(error) = step.execute(runner, sink) {
            log::error!("Step {} ({}) failed: {}", index, step.label, error);
            failure = Some(StepFailure {
                index,
                label: step.label.clone(),
                error,
            });
            break;
        }
        completed_steps.push(step.label.clone());
    }

    let target = target_name(pipeline.direction());
    let message = match &failure {
        None => {
            state = JobState::Succeeded;
            let message = format!(
                "Conversion to {target} completed successfully: {}",
                pipeline.output().display()
            );
            sink.line(&format!("[SUCCESS] {message}"));
            message
        }
        Some(failure) => {
            state = JobState::Failed;
            sink.line(&format!(
                "[ERROR] Step {} ({}) failed: {}",
                failure.index,
                failure.label,
                failure.reason()
            ));
            format!(
                "Conversion to {target} failed at step {} ({}): {}",
                failure.index,
                failure.label,
                failure.reason()
            )
        }
    };

    let removed_intermediates = if pipeline.keeps_intermediates() {
        log::debug!("Keeping intermediate files");
        Vec::new()
    } else {
        sink.line("--- Cleaning up temporary files ---");
        pipeline.intermediates().cleanup(sink)
    };

    log::info!("Job {:?}: {}", state, message);
    JobReport {
        direction: pipeline.direction(),
        state,
        output: pipeline.output().to_path_buf(),
        message,
        completed_steps,
        failure,
        removed_intermediates,
        elapsed: started.elapsed(),
        finished_at: Local::now(),
    }
}
