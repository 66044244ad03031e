// ============================================================================
// psspectrum-core/src/converter.rs
// ============================================================================
//
// CONVERTER: Job Admission and Background Execution
//
// The Converter is the entry point shells use. It is created once after the
// external tools have been found, then accepts one job at a time. A job can
// run on the caller's thread (`convert`) or on a worker thread (`spawn`)
// whose log lines arrive over a channel so the shell stays responsive.
//
// KEY COMPONENTS:
// - Converter: Owns the configuration, the tool runner and the admission lock
// - JobHandle: Line receiver plus the worker's join handle

use std::sync::{Arc, Mutex, TryLockError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::events::{ChannelSink, LogSink};
use crate::external::{SystemRunner, ToolRunner, check_dependencies};
use crate::job::{ConversionJob, Direction};
use crate::pipeline::{JobReport, Pipeline, decode, encode, run_pipeline};

/// Runs conversion jobs, one at a time.
#[derive(Debug)]
pub struct Converter<R = SystemRunner> {
    config: CoreConfig,
    runner: R,
    admission: Mutex<()>,
}

impl Converter<SystemRunner> {
    /// Verifies every external tool exists, then builds a converter that
    /// spawns real processes. Fails with [`CoreError::DependencyMissing`]
    /// naming all missing tools.
    pub fn new(config: CoreConfig) -> CoreResult<Self> {
        check_dependencies(&config.tools)?;
        let runner = SystemRunner::with_timeout(config.tool_timeout);
        Ok(Self::with_runner(config, runner))
    }
}

impl<R: ToolRunner> Converter<R> {
    /// Uses `runner` as is; no dependency check is made.
    pub fn with_runner(config: CoreConfig, runner: R) -> Self {
        Self {
            config,
            runner,
            admission: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Builds the step sequence `job` would run.
    pub fn plan(&self, job: &ConversionJob) -> CoreResult<Pipeline> {
        job.validate()?;
        match job.direction() {
            Direction::EncodeToContainer => encode::build(job, &self.config.tools),
            Direction::DecodeFromContainer => decode::build(job, &self.config.tools),
        }
    }

    /// Runs `job` to completion on the calling thread.
    ///
    /// Returns `Err` only when the job is rejected before it starts: invalid
    /// parameters or another job still running. Step failures are reported
    /// through the returned [`JobReport`].
    pub fn convert(&self, job: &ConversionJob, sink: &mut dyn LogSink) -> CoreResult<JobReport> {
        let pipeline = self.plan(job)?;

        let _guard = match self.admission.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(CoreError::JobInProgress),
            // Poisoned by a panicked job; the lock guards no data.
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        log::info!(
            "Starting {} job: {} -> {}",
            job.direction(),
            job.input().display(),
            job.output().display()
        );
        Ok(run_pipeline(&pipeline, &self.runner, sink))
    }
}

impl<R> Converter<R>
where
    R: ToolRunner + Send + Sync + 'static,
{
    /// Runs `job` on a worker thread. Log lines arrive on the handle's
    /// receiver in order; the receiver disconnects when the job ends.
    pub fn spawn(self: &Arc<Self>, job: ConversionJob) -> JobHandle {
        let (sender, lines) = crossbeam_channel::unbounded();
        let converter = Arc::clone(self);
        let worker = thread::spawn(move || {
            let mut sink = ChannelSink::new(sender);
            converter.convert(&job, &mut sink)
        });
        JobHandle { lines, worker }
    }
}

/// A job running on a worker thread.
#[derive(Debug)]
pub struct JobHandle {
    lines: Receiver<String>,
    worker: JoinHandle<CoreResult<JobReport>>,
}

impl JobHandle {
    pub fn lines(&self) -> &Receiver<String> {
        &self.lines
    }

    /// Waits for the worker and returns its result.
    pub fn join(self) -> CoreResult<JobReport> {
        self.worker.join().map_err(|_| CoreError::WorkerPanicked)?
    }
}
