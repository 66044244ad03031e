// psspectrum-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use psspectrum_core::config::{DEFAULT_BITRATE_KBPS, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use psspectrum_core::{CoreConfig, CoreConfigBuilder, CoreResult, parse_positive};
use std::path::PathBuf;
use std::time::Duration;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "PSSpectrum: PS2 PSS <-> MP4 converter",
    long_about = "Converts between PlayStation 2 PSS movies and MP4 using ffmpeg, ps2str and vgmstream-cli via psspectrum-core."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Converts an MP4 (or any ffmpeg-readable video) to a PSS movie
    Encode(EncodeArgs),
    /// Converts a PSS movie to MP4
    Decode(DecodeArgs),
    /// Reports where each external tool is expected and whether it exists
    Check,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable debug-level diagnostics on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding ffmpeg and bin/{ps2str,vgmstream-cli} (defaults to the executable's directory)
    #[arg(long, global = true, value_name = "DIR", env = "PSSPECTRUM_TOOLS_DIR")]
    pub tools_dir: Option<PathBuf>,

    /// Override the ffmpeg executable
    #[arg(long, global = true, value_name = "PATH", env = "PSSPECTRUM_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Override the ps2str executable
    #[arg(long, global = true, value_name = "PATH", env = "PSSPECTRUM_PS2STR")]
    pub ps2str: Option<PathBuf>,

    /// Override the vgmstream-cli executable
    #[arg(long, global = true, value_name = "PATH", env = "PSSPECTRUM_VGMSTREAM")]
    pub vgmstream: Option<PathBuf>,

    /// Kill any external tool still running after this many seconds
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        env = "PSSPECTRUM_TOOL_TIMEOUT",
        value_parser = parse_seconds
    )]
    pub tool_timeout: Option<u32>,

    /// Optional: Directory for the run log file
    #[arg(short, long, global = true, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Print the job summary as JSON on stdout (tool output goes to stderr)
    #[arg(long, global = true)]
    pub json: bool,
}

impl GlobalArgs {
    /// Resolves tool locations and the timeout into a core configuration.
    pub fn core_config(&self) -> CoreResult<CoreConfig> {
        let mut builder = CoreConfigBuilder::new();
        if let Some(dir) = &self.tools_dir {
            builder = builder.base_dir(dir.clone());
        }
        if let Some(path) = &self.ffmpeg {
            builder = builder.ffmpeg(path.clone());
        }
        if let Some(path) = &self.ps2str {
            builder = builder.ps2str(path.clone());
        }
        if let Some(path) = &self.vgmstream {
            builder = builder.vgmstream(path.clone());
        }
        if let Some(secs) = self.tool_timeout {
            builder = builder.tool_timeout(Duration::from_secs(u64::from(secs)));
        }
        builder.build()
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Source video file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Target .pss file (defaults to INPUT with a .pss extension)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Output width in pixels
    #[arg(long, value_name = "PIXELS", default_value_t = DEFAULT_WIDTH, value_parser = parse_width)]
    pub width: u32,

    /// Output height in pixels
    #[arg(long, value_name = "PIXELS", default_value_t = DEFAULT_HEIGHT, value_parser = parse_height)]
    pub height: u32,

    /// Constant video bitrate in kbps
    #[arg(long, value_name = "KBPS", default_value_t = DEFAULT_BITRATE_KBPS, value_parser = parse_bitrate)]
    pub bitrate: u32,

    /// Keep the intermediate M2V/WAV/ADS/MUX files
    #[arg(long)]
    pub keep_intermediates: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Source .pss file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Target .mp4 file (defaults to INPUT with a .mp4 extension)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Keep the demuxed M2V/ADS and the temporary WAV
    #[arg(long)]
    pub keep_intermediates: bool,
}

// --- Value parsers ---

fn positive(field: &str, text: &str) -> Result<u32, String> {
    parse_positive(field, text).map_err(|e| e.to_string())
}

fn parse_width(text: &str) -> Result<u32, String> {
    positive("width", text)
}

fn parse_height(text: &str) -> Result<u32, String> {
    positive("height", text)
}

fn parse_bitrate(text: &str) -> Result<u32, String> {
    positive("bitrate", text)
}

fn parse_seconds(text: &str) -> Result<u32, String> {
    positive("tool timeout", text)
}
