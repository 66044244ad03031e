//! Core library for converting between PlayStation 2 PSS movies and MP4.
//!
//! Conversions are fixed step pipelines that drive ffmpeg, ps2str and
//! vgmstream-cli, plus two direct edits of the MPEG-2 video stream that the
//! PS2 multiplexer needs: a metadata user-data block before the first GOP and
//! a trailing sequence-end code.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use psspectrum_core::{ConversionJob, Converter, CoreConfigBuilder, EncodeParams};
//! use std::path::PathBuf;
//!
//! let config = CoreConfigBuilder::new()
//!     .base_dir(PathBuf::from("/opt/psspectrum"))
//!     .build()
//!     .unwrap();
//! let converter = Converter::new(config).unwrap();
//!
//! let job = ConversionJob::encode(
//!     PathBuf::from("intro.mp4"),
//!     PathBuf::from("intro.pss"),
//!     EncodeParams::default(),
//! );
//! let report = converter
//!     .convert(&job, &mut |line: &str| println!("{line}"))
//!     .unwrap();
//! assert!(report.is_success());
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod events;
pub mod external;
pub mod job;
pub mod pipeline;
pub mod stream_patch;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder, METADATA_COMMENT, ToolPaths};
pub use converter::{Converter, JobHandle};
pub use error::{CoreError, CoreResult, ToolFailure};
pub use events::{ChannelSink, LogSink};
pub use external::{DependencyStatus, SystemRunner, ToolRunner, check_dependencies, dependency_report};
pub use job::{ConversionJob, Direction, EncodeParams, default_output_path, parse_positive};
pub use pipeline::{JobReport, JobState, JobSummary, StepFailure, run_pipeline};
pub use stream_patch::{EndCodeStatus, ensure_sequence_end_code, inject_metadata};
