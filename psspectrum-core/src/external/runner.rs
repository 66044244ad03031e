// ============================================================================
// psspectrum-core/src/external/runner.rs
// ============================================================================
//
// TOOL RUNNER: Launching External Tools and Streaming Their Output
//
// This module runs one external executable with a fixed argument vector,
// merges its standard output and standard error into a single ordered line
// stream and reports success only for exit code zero.
//
// KEY COMPONENTS:
// - ToolRunner: Trait the orchestrator runs tools through
// - SystemRunner: Concrete implementation using std::process
// - split_lines_lossy: Permissive line splitting of raw tool output
//
// ARCHITECTURE:
// The child's stdout and stderr share the write end of one pipe, so lines
// keep the order the tool wrote them in. A reader thread drains the pipe
// into a channel; the calling thread forwards lines to the sink as they
// arrive and watches for exit or timeout.

use std::ffi::OsString;
use std::io::{self, PipeWriter, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::error::ToolFailure;

/// How often the exit status is polled while a tool is quiet.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Windows process creation flag that suppresses the console window.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

// ============================================================================
// RUNNER ABSTRACTION
// ============================================================================

/// Trait representing something that can run an external tool to completion.
pub trait ToolRunner {
    /// Runs `program` with `args`, handing every output line to `on_line` as
    /// soon as it is read. Blocks until the process exits.
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        on_line: &mut dyn FnMut(&str),
    ) -> Result<(), ToolFailure>;
}

// ============================================================================
// LINE SPLITTING
// ============================================================================

/// Reads `reader` to the end, calling `on_line` for every line.
///
/// `\n`, `\r` and `\r\n` all end a line, so carriage-return progress updates
/// are delivered one by one. Bytes that are not valid UTF-8 are replaced
/// rather than failing the read. Empty lines are skipped.
pub fn split_lines_lossy<R: Read>(mut reader: R, mut on_line: impl FnMut(String)) -> io::Result<()> {
    let mut chunk = [0u8; 4096];
    let mut pending: Vec<u8> = Vec::new();

    loop {
        let read = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        for &byte in &chunk[..read] {
            if byte == b'\n' || byte == b'\r' {
                if !pending.is_empty() {
                    on_line(String::from_utf8_lossy(&pending).into_owned());
                    pending.clear();
                }
            } else {
                pending.push(byte);
            }
        }
    }

    if !pending.is_empty() {
        on_line(String::from_utf8_lossy(&pending).into_owned());
    }
    Ok(())
}

fn spawn_reader<R>(reader: R, tx: Sender<String>) -> thread::JoinHandle<io::Result<()>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        split_lines_lossy(reader, |line| {
            // The receiver only goes away once the process is done with.
            let _ = tx.send(line);
        })
    })
}

// ============================================================================
// SYSTEM RUNNER
// ============================================================================

/// Runs tools as real child processes.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill any tool still running after `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    fn command(
        program: &Path,
        args: &[OsString],
        stdout: PipeWriter,
        stderr: PipeWriter,
    ) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr);

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        cmd
    }

    /// Forwards lines until the process exits and the pipe is closed.
    ///
    /// The deadline covers the whole run, including draining output held
    /// open by processes the tool left behind.
    fn pump(
        &self,
        child: &mut Child,
        lines: &Receiver<String>,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<ExitStatus, ToolFailure> {
        let deadline = self.timeout.map(|t| Instant::now() + t);
        let mut status = None;

        loop {
            match lines.recv_timeout(POLL_INTERVAL) {
                Ok(line) => on_line(&line),
                // The reader finished: every write end is closed.
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }

            if status.is_none() {
                status = match child.try_wait() {
                    Ok(status) => status,
                    Err(e) => {
                        kill_and_reap(child);
                        return Err(e.into());
                    }
                };
            }

            if let (Some(deadline), Some(timeout)) = (deadline, self.timeout) {
                if Instant::now() >= deadline {
                    log::error!("Tool exceeded timeout of {}s, killing it", timeout.as_secs());
                    if status.is_none() {
                        kill_and_reap(child);
                    }
                    return Err(ToolFailure::Timeout(timeout));
                }
            }
        }

        match status {
            Some(status) => Ok(status),
            None => Ok(child.wait()?),
        }
    }
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

impl ToolRunner for SystemRunner {
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        on_line: &mut dyn FnMut(&str),
    ) -> Result<(), ToolFailure> {
        log::debug!("Spawning {}", super::format_command_line(program, args));

        let launch_error = |source: io::Error| ToolFailure::Launch {
            program: program.display().to_string(),
            source,
        };
        let (reader, stdout) = io::pipe().map_err(launch_error)?;
        let stderr = stdout.try_clone().map_err(launch_error)?;

        let mut cmd = Self::command(program, args, stdout, stderr);
        let spawned = cmd.spawn();
        // The command owns the parent's copies of the write end; the reader
        // only sees end of file once they are gone.
        drop(cmd);
        let mut child = spawned.map_err(launch_error)?;

        let (tx, rx) = crossbeam_channel::unbounded();
        let reader = spawn_reader(reader, tx);

        let status = self.pump(&mut child, &rx, on_line)?;

        match reader.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::warn!("Error reading tool output: {}", e),
            Err(_) => log::warn!("Tool output reader thread panicked"),
        }

        if status.success() {
            log::debug!("{} exited successfully", program.display());
            return Ok(());
        }

        match status.code() {
            Some(code) => {
                log::error!("{} exited with code {}", program.display(), code);
                Err(ToolFailure::NonZeroExit(code))
            }
            None => {
                log::error!("{} was terminated: {}", program.display(), status);
                Err(ToolFailure::Terminated)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        split_lines_lossy(input, |l| lines.push(l)).unwrap();
        lines
    }

    #[test]
    fn test_split_handles_all_line_endings() {
        assert_eq!(collect(b"a\nb\r\nc\rd"), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_split_skips_empty_lines() {
        assert_eq!(collect(b"\n\nframe=1\r\r\nframe=2\n"), ["frame=1", "frame=2"]);
    }

    #[test]
    fn test_split_replaces_invalid_utf8() {
        assert_eq!(collect(b"ok \xff\xfe end\n"), ["ok \u{fffd}\u{fffd} end"]);
    }

    #[test]
    fn test_launch_failure_for_missing_program() {
        let runner = SystemRunner::new();
        let result = runner.run(
            Path::new("/definitely/not/a/real/tool"),
            &[],
            &mut |_| {},
        );
        assert!(matches!(result, Err(ToolFailure::Launch { .. })));
    }
}
