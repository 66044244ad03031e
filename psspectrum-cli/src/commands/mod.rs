//! Command implementations for the CLI.
//!
//! `encode` and `decode` share [`run_job`]: the conversion runs on a core
//! worker thread while this thread prints its log lines as they arrive.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use psspectrum_core::{ConversionJob, Converter, CoreError};

use crate::cli::GlobalArgs;
use crate::logging::run_log_file_name;
use crate::output::{LinePrinter, Stream};

/// Module containing the implementation of the `check` command.
pub mod check;
/// Module containing the implementation of the `decode` command.
pub mod decode;
/// Module containing the implementation of the `encode` command.
pub mod encode;

/// Runs `job` to completion, streaming its output, and maps the outcome to
/// the process exit code.
pub fn run_job(global: &GlobalArgs, job: ConversionJob) -> Result<ExitCode> {
    if !job.input().is_file() {
        anyhow::bail!("Input file not found: {}", job.input().display());
    }

    let config = global
        .core_config()
        .context("Failed to resolve tool locations")?;
    let converter = match Converter::new(config) {
        Ok(converter) => Arc::new(converter),
        Err(e @ CoreError::DependencyMissing { .. }) => {
            return Err(anyhow::Error::new(e)
                .context("Conversion is disabled until the missing tools are installed"));
        }
        Err(e) => return Err(e.into()),
    };

    let stream = if global.json {
        Stream::Stderr
    } else {
        Stream::Stdout
    };
    let mut printer = LinePrinter::new(stream);
    if let Some(dir) = &global.log_dir {
        printer = printer
            .with_log_file(dir, &run_log_file_name(job.direction().as_str()))
            .with_context(|| format!("Failed to create run log in {}", dir.display()))?;
    }
    if let Some(path) = printer.log_path() {
        log::info!("Writing run log to {}", path.display());
    }

    let handle = converter.spawn(job);
    for line in handle.lines().iter() {
        printer.print(&line);
    }
    printer.finish();

    let report = handle.join().context("Conversion job could not run")?;

    if global.json {
        let summary = serde_json::to_string_pretty(&report.summary())
            .context("Failed to serialize job summary")?;
        println!("{summary}");
    } else if report.is_success() {
        if Stream::Stdout.supports_color() {
            println!("{}", report.message.green());
        } else {
            println!("{}", report.message);
        }
    } else if Stream::Stderr.supports_color() {
        eprintln!("{}", report.message.red());
    } else {
        eprintln!("{}", report.message);
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
