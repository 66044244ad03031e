//! Mux project file consumed by the platform multiplexer.
//!
//! The format is line oriented: an outer `pss ... end` block holding one
//! `stream <kind>:<index> ... end` block per elementary stream, each with an
//! `input "<absolute path>"` directive.

use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

/// Role of an elementary stream inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Pcm,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Video => write!(f, "video"),
            StreamKind::Pcm => write!(f, "pcm"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestStream {
    pub kind: StreamKind,
    pub index: u32,
    pub input: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MuxManifest {
    streams: Vec<ManifestStream>,
}

impl MuxManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stream; its index is the count of earlier streams of the same
    /// kind.
    pub fn stream(mut self, kind: StreamKind, input: &Path) -> Self {
        let index = self.streams.iter().filter(|s| s.kind == kind).count() as u32;
        self.streams.push(ManifestStream {
            kind,
            index,
            input: absolute(input),
        });
        self
    }

    pub fn streams(&self) -> &[ManifestStream] {
        &self.streams
    }

    /// Renders the project file text.
    pub fn render(&self) -> String {
        let mut out = String::from("pss\n");
        for stream in &self.streams {
            let _ = write!(
                out,
                "\n\tstream {}:{}\n\t\tinput \"{}\"\n\tend\n",
                stream.kind,
                stream.index,
                stream.input.display()
            );
        }
        out.push_str("end\n");
        out
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
