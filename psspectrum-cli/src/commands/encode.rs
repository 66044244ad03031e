//! Implementation of the 'encode' subcommand (MP4 -> PSS).

use std::process::ExitCode;

use anyhow::Result;
use psspectrum_core::{ConversionJob, Direction, EncodeParams, default_output_path};

use crate::cli::{EncodeArgs, GlobalArgs};

/// Builds the encode job described by `args`.
pub fn encode_job(args: EncodeArgs) -> ConversionJob {
    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input, Direction::EncodeToContainer));
    let params = EncodeParams {
        width: args.width,
        height: args.height,
        bitrate_kbps: args.bitrate,
    };
    ConversionJob::encode(args.input, output, params).keep_intermediates(args.keep_intermediates)
}

pub fn run_encode(global: &GlobalArgs, args: EncodeArgs) -> Result<ExitCode> {
    let job = encode_job(args);
    log::debug!("Encode job: {:?}", job);
    super::run_job(global, job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_output_defaults_next_to_input() {
        let job = encode_job(EncodeArgs {
            input: PathBuf::from("/videos/intro.mp4"),
            output: None,
            width: 512,
            height: 384,
            bitrate: 4000,
            keep_intermediates: true,
        });
        assert_eq!(job.output(), Path::new("/videos/intro.pss"));
        assert_eq!(job.params().map(|p| p.width), Some(512));
        assert!(job.keeps_intermediates());
    }
}
