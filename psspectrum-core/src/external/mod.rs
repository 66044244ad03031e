// ============================================================================
// psspectrum-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg, ps2str and vgmstream-cli
//
// This module encapsulates everything that touches the external tools: the
// startup dependency check, the runner that executes a tool and streams its
// output, and command-line formatting for the operator log.
//
// DESIGN:
// The orchestrator only ever talks to the ToolRunner trait, so tests inject
// the scripted runner from `mocks` instead of spawning processes.

use std::ffi::OsString;
use std::path::Path;

use crate::config::ToolPaths;
use crate::error::{CoreError, CoreResult};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Trait and std::process implementation for running a tool
pub mod runner;

/// Scripted runner for tests
#[cfg(test)]
pub mod mocks;

pub use runner::{SystemRunner, ToolRunner, split_lines_lossy};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Presence of one required tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyStatus {
    pub name: &'static str,
    pub path: std::path::PathBuf,
    pub found: bool,
}

/// Looks up every configured tool without running it.
pub fn dependency_report(tools: &ToolPaths) -> Vec<DependencyStatus> {
    tools
        .entries()
        .into_iter()
        .map(|(name, path)| DependencyStatus {
            name,
            path: path.to_path_buf(),
            found: path.is_file(),
        })
        .collect()
}

/// Fails with [`CoreError::DependencyMissing`] naming every absent tool.
///
/// Called once before any job is accepted; a failure disables conversion
/// entirely.
pub fn check_dependencies(tools: &ToolPaths) -> CoreResult<()> {
    let missing: Vec<String> = dependency_report(tools)
        .into_iter()
        .filter(|status| !status.found)
        .map(|status| {
            log::warn!(
                "Dependency '{}' not found at {}",
                status.name,
                status.path.display()
            );
            status.name.to_string()
        })
        .collect();

    if missing.is_empty() {
        log::debug!("All external tools found");
        Ok(())
    } else {
        Err(CoreError::DependencyMissing { missing })
    }
}

// ============================================================================
// COMMAND FORMATTING
// ============================================================================

/// Renders a program and its arguments as one space-separated line.
pub fn format_command_line(program: &Path, args: &[OsString]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}
