//! Console rendering of pipeline lines and the plain-text run log.
//!
//! Status lines from the orchestrator are colored by their prefix when the
//! terminal supports it. Everything written to the run log file has ANSI
//! escapes stripped, since tools such as ffmpeg may emit them.

use owo_colors::OwoColorize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Where console lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    pub fn supports_color(self) -> bool {
        let stream = match self {
            Stream::Stdout => supports_color::Stream::Stdout,
            Stream::Stderr => supports_color::Stream::Stderr,
        };
        supports_color::on(stream).is_some()
    }
}

/// Applies the console color for a pipeline line, if any.
pub fn style_line(line: &str) -> String {
    if line.starts_with("[SUCCESS]") {
        line.green().bold().to_string()
    } else if line.starts_with("[ERROR]") || line.starts_with("[FAILED]") {
        line.red().bold().to_string()
    } else if line.starts_with("[WARN]") {
        line.yellow().to_string()
    } else if line.starts_with("--- ") {
        line.cyan().bold().to_string()
    } else if line.starts_with("Executing:") {
        line.dimmed().to_string()
    } else {
        line.to_string()
    }
}

/// Prints pipeline lines to the console and mirrors them into an optional
/// run log file.
pub struct LinePrinter {
    stream: Stream,
    colored: bool,
    log_file: Option<(PathBuf, BufWriter<File>)>,
}

impl LinePrinter {
    pub fn new(stream: Stream) -> Self {
        Self {
            stream,
            colored: stream.supports_color(),
            log_file: None,
        }
    }

    /// Creates `dir` if needed and opens `dir/file_name` as the run log.
    pub fn with_log_file(mut self, dir: &Path, file_name: &str) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        let file = File::create(&path)?;
        self.log_file = Some((path, BufWriter::new(file)));
        Ok(self)
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_file.as_ref().map(|(path, _)| path.as_path())
    }

    pub fn print(&mut self, line: &str) {
        let rendered = if self.colored {
            style_line(line)
        } else {
            line.to_string()
        };
        match self.stream {
            Stream::Stdout => println!("{rendered}"),
            Stream::Stderr => eprintln!("{rendered}"),
        }

        if let Some((path, writer)) = &mut self.log_file {
            let plain = strip_ansi_escapes::strip_str(line);
            if let Err(e) = writeln!(writer, "{plain}") {
                log::warn!("Failed to write run log {}: {}", path.display(), e);
            }
        }
    }

    /// Flushes the run log.
    pub fn finish(&mut self) {
        if let Some((path, writer)) = &mut self.log_file {
            if let Err(e) = writer.flush() {
                log::warn!("Failed to flush run log {}: {}", path.display(), e);
            }
        }
    }
}

impl Drop for LinePrinter {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_plain_lines_unstyled() {
        assert_eq!(style_line("frame=  12 fps=30"), "frame=  12 fps=30");
    }

    #[test]
    fn test_status_lines_styled() {
        assert_ne!(style_line("[SUCCESS] done"), "[SUCCESS] done");
        assert!(style_line("[ERROR] Step 1 failed").contains("[ERROR] Step 1 failed"));
    }

    #[test]
    fn test_run_log_is_ansi_free() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let mut printer = LinePrinter::new(Stream::Stderr)
            .with_log_file(&log_dir, "run.log")
            .unwrap();
        printer.print("\u{1b}[32mgreen\u{1b}[0m text");
        printer.print("--- Step 1: Something ---");
        printer.finish();

        let contents = fs::read_to_string(log_dir.join("run.log")).unwrap();
        assert_eq!(contents, "green text\n--- Step 1: Something ---\n");
    }
}
