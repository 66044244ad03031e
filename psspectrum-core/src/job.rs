//! Conversion job description and validation of shell input.
//!
//! A [`ConversionJob`] is built from validated shell input and handed to the
//! orchestrator by reference, so it cannot change while a pipeline runs.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{DEFAULT_BITRATE_KBPS, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::error::{CoreError, CoreResult};

/// Which way a job converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// MP4 (or any ffmpeg-readable source) -> PSS
    EncodeToContainer,
    /// PSS -> MP4
    DecodeFromContainer,
}

impl Direction {
    /// Short name used in run log file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::EncodeToContainer => "encode",
            Direction::DecodeFromContainer => "decode",
        }
    }

    /// Extension of the file this direction produces.
    pub fn output_extension(self) -> &'static str {
        match self {
            Direction::EncodeToContainer => "pss",
            Direction::DecodeFromContainer => "mp4",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::EncodeToContainer => write!(f, "MP4 -> PSS"),
            Direction::DecodeFromContainer => write!(f, "PSS -> MP4"),
        }
    }
}

/// Video parameters for MP4 -> PSS encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncodeParams {
    pub width: u32,
    pub height: u32,
    pub bitrate_kbps: u32,
}

impl Default for EncodeParams {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
        }
    }
}

impl EncodeParams {
    /// Parses the three numeric text fields a shell collects.
    pub fn from_text(width: &str, height: &str, bitrate_kbps: &str) -> CoreResult<Self> {
        Ok(Self {
            width: parse_positive("width", width)?,
            height: parse_positive("height", height)?,
            bitrate_kbps: parse_positive("bitrate", bitrate_kbps)?,
        })
    }

    fn validate(&self) -> CoreResult<()> {
        for (field, value) in [
            ("width", self.width),
            ("height", self.height),
            ("bitrate", self.bitrate_kbps),
        ] {
            if value == 0 {
                return Err(CoreError::Validation(format!(
                    "{field} must be a number greater than 0"
                )));
            }
        }
        Ok(())
    }
}

/// Parses a numeric text field. Only plain ASCII digit strings with a value
/// above zero are accepted; signs, whitespace and empty input are rejected.
pub fn parse_positive(field: &str, text: &str) -> CoreResult<u32> {
    if text.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::Validation(format!(
            "{field} must be a whole number, got '{text}'"
        )));
    }
    match text.parse::<u32>() {
        Ok(0) => Err(CoreError::Validation(format!(
            "{field} must be greater than 0"
        ))),
        Ok(value) => Ok(value),
        Err(_) => Err(CoreError::Validation(format!(
            "{field} is too large: {text}"
        ))),
    }
}

/// One request to convert a file in one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    direction: Direction,
    input: PathBuf,
    output: PathBuf,
    params: Option<EncodeParams>,
    keep_intermediates: bool,
}

impl ConversionJob {
    /// MP4 -> PSS job.
    pub fn encode(input: PathBuf, output: PathBuf, params: EncodeParams) -> Self {
        Self {
            direction: Direction::EncodeToContainer,
            input,
            output,
            params: Some(params),
            keep_intermediates: false,
        }
    }

    /// PSS -> MP4 job.
    pub fn decode(input: PathBuf, output: PathBuf) -> Self {
        Self {
            direction: Direction::DecodeFromContainer,
            input,
            output,
            params: None,
            keep_intermediates: false,
        }
    }

    pub fn keep_intermediates(mut self, keep: bool) -> Self {
        self.keep_intermediates = keep;
        self
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Encode parameters; `None` for decode jobs.
    pub fn params(&self) -> Option<&EncodeParams> {
        self.params.as_ref()
    }

    pub fn keeps_intermediates(&self) -> bool {
        self.keep_intermediates
    }

    /// Checks the required fields before the job is admitted.
    pub fn validate(&self) -> CoreResult<()> {
        if self.input.as_os_str().is_empty() {
            return Err(CoreError::Validation("input path is required".to_string()));
        }
        if self.output.as_os_str().is_empty() {
            return Err(CoreError::Validation("output path is required".to_string()));
        }
        if self.output.file_name().is_none() {
            return Err(CoreError::Validation(format!(
                "output path '{}' does not name a file",
                self.output.display()
            )));
        }
        match (self.direction, &self.params) {
            (Direction::EncodeToContainer, Some(params)) => params.validate(),
            (Direction::EncodeToContainer, None) => Err(CoreError::Validation(
                "encode jobs need resolution and bitrate".to_string(),
            )),
            (Direction::DecodeFromContainer, _) => Ok(()),
        }
    }
}

/// Output path a shell proposes once the input is chosen: the input's stem
/// with the direction's extension, next to the input.
pub fn default_output_path(input: &Path, direction: Direction) -> PathBuf {
    input.with_extension(direction.output_extension())
}
