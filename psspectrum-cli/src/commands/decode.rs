//! Implementation of the 'decode' subcommand (PSS -> MP4).

use std::process::ExitCode;

use anyhow::Result;
use psspectrum_core::{ConversionJob, Direction, default_output_path};

use crate::cli::{DecodeArgs, GlobalArgs};

pub fn decode_job(args: DecodeArgs) -> ConversionJob {
    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input, Direction::DecodeFromContainer));
    ConversionJob::decode(args.input, output).keep_intermediates(args.keep_intermediates)
}

pub fn run_decode(global: &GlobalArgs, args: DecodeArgs) -> Result<ExitCode> {
    let job = decode_job(args);
    log::debug!("Decode job: {:?}", job);
    super::run_job(global, job)
}
