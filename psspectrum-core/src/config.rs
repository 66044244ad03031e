// ============================================================================
// psspectrum-core/src/config.rs
// ============================================================================
//
// CONFIGURATION: Tool Locations, Defaults and the Core Configuration
//
// This module defines the process-wide configuration resolved once at
// startup: where the external tools live and how long a single tool may run.
// The configuration is passed explicitly into the runner and the dependency
// check; nothing in the library reads tool locations from global state.
//
// KEY COMPONENTS:
// - Default encoding constants and the provenance comment
// - ToolPaths: Resolved executable locations
// - CoreConfig: Main configuration structure for the library
// - CoreConfigBuilder: Builder pattern for CoreConfig

use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

// ============================================================================
// DEFAULT CONSTANTS
// ============================================================================

/// Default output width for MP4 -> PSS encodes.
pub const DEFAULT_WIDTH: u32 = 640;

/// Default output height for MP4 -> PSS encodes.
pub const DEFAULT_HEIGHT: u32 = 448;

/// Default constant video bitrate in kbps.
pub const DEFAULT_BITRATE_KBPS: u32 = 8000;

/// Provenance comment written into the user-data block of every encoded M2V.
/// Must stay plain ASCII without start code bytes.
pub const METADATA_COMMENT: &str = "==== Created with PSSpectrum. Powered by FFMPEG, PS2STR, and VGMSTREAM.|||https://github.com/Ailyth99/PSSpectrum ====";

// ============================================================================
// TOOL PATHS
// ============================================================================

/// Locations of the three external executables every conversion needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    /// Video/audio transcoder
    pub ffmpeg: PathBuf,
    /// Platform stream (de)multiplexer and ADPCM encoder
    pub ps2str: PathBuf,
    /// Platform audio decoder
    pub vgmstream: PathBuf,
}

impl ToolPaths {
    /// Lays out the tools the way a release bundle ships them:
    /// ffmpeg next to the program, the platform tools under `bin/`.
    pub fn from_base_dir(base_dir: &Path) -> Self {
        let bin_dir = base_dir.join("bin");
        Self {
            ffmpeg: base_dir.join(format!("ffmpeg{EXE_SUFFIX}")),
            ps2str: bin_dir.join(format!("ps2str{EXE_SUFFIX}")),
            vgmstream: bin_dir.join(format!("vgmstream-cli{EXE_SUFFIX}")),
        }
    }

    /// Display name and path for each tool, in check order.
    pub fn entries(&self) -> [(&'static str, &Path); 3] {
        [
            ("ffmpeg", self.ffmpeg.as_path()),
            ("ps2str", self.ps2str.as_path()),
            ("vgmstream-cli", self.vgmstream.as_path()),
        ]
    }
}

/// Directory containing the running executable.
pub fn executable_dir() -> CoreResult<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        CoreError::Validation(format!(
            "Could not determine directory of executable '{}'",
            exe.display()
        ))
    })
}

// ============================================================================
// CORE CONFIGURATION
// ============================================================================

/// Main configuration structure for the psspectrum-core library.
///
/// Created once by the shell and handed to [`crate::Converter`].
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Resolved external tool locations
    pub tools: ToolPaths,

    /// Upper bound on a single external tool run. `None` waits forever.
    pub tool_timeout: Option<Duration>,
}

impl CoreConfig {
    pub fn new(tools: ToolPaths) -> Self {
        Self {
            tools,
            tool_timeout: None,
        }
    }
}

/// Builder for creating CoreConfig instances.
///
/// Tool paths default to the bundle layout under the base directory; each
/// tool can be overridden individually.
///
/// # Examples
///
/// ```rust
/// use psspectrum_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
/// use std::time::Duration;
///
/// let config = CoreConfigBuilder::new()
///     .base_dir(PathBuf::from("/opt/psspectrum"))
///     .ffmpeg(PathBuf::from("/usr/bin/ffmpeg"))
///     .tool_timeout(Duration::from_secs(3600))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.tools.ffmpeg, PathBuf::from("/usr/bin/ffmpeg"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    base_dir: Option<PathBuf>,
    ffmpeg: Option<PathBuf>,
    ps2str: Option<PathBuf>,
    vgmstream: Option<PathBuf>,
    tool_timeout: Option<Duration>,
}

impl CoreConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory the bundled tools are resolved against.
    /// Defaults to the directory of the running executable.
    pub fn base_dir(mut self, base_dir: PathBuf) -> Self {
        self.base_dir = Some(base_dir);
        self
    }

    pub fn ffmpeg(mut self, path: PathBuf) -> Self {
        self.ffmpeg = Some(path);
        self
    }

    pub fn ps2str(mut self, path: PathBuf) -> Self {
        self.ps2str = Some(path);
        self
    }

    pub fn vgmstream(mut self, path: PathBuf) -> Self {
        self.vgmstream = Some(path);
        self
    }

    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    /// Resolves every tool location and builds the configuration.
    pub fn build(self) -> CoreResult<CoreConfig> {
        if self.tool_timeout.is_some_and(|t| t.is_zero()) {
            return Err(CoreError::Validation(
                "Tool timeout must be greater than zero".to_string(),
            ));
        }

        let base_dir = match self.base_dir {
            Some(dir) => dir,
            None => executable_dir()?,
        };
        let defaults = ToolPaths::from_base_dir(&base_dir);

        let tools = ToolPaths {
            ffmpeg: self.ffmpeg.unwrap_or(defaults.ffmpeg),
            ps2str: self.ps2str.unwrap_or(defaults.ps2str),
            vgmstream: self.vgmstream.unwrap_or(defaults.vgmstream),
        };
        log::debug!("Resolved tool paths: {:?}", tools);

        Ok(CoreConfig {
            tools,
            tool_timeout: self.tool_timeout,
        })
    }
}
