// psspectrum-core/src/pipeline/encode.rs
//
// MP4 -> PSS: ffmpeg produces the M2V and WAV in one pass, the M2V is
// patched for the multiplexer, ps2str encodes the audio to ADS and finally
// muxes both streams through a generated project file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::{IntermediateFileSet, MuxManifest, PatchOperation, Pipeline, PipelineStep, StreamKind};
use crate::config::{METADATA_COMMENT, ToolPaths};
use crate::error::{CoreError, CoreResult};
use crate::job::{ConversionJob, Direction, EncodeParams};

/// Scratch files of an encode job, all derived from the output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeIntermediates {
    pub m2v: PathBuf,
    pub wav: PathBuf,
    pub ads: PathBuf,
    pub mux: PathBuf,
}

impl EncodeIntermediates {
    pub fn for_output(output: &Path) -> Self {
        Self {
            m2v: output.with_extension("m2v"),
            wav: output.with_extension("wav"),
            ads: output.with_extension("ads"),
            mux: output.with_extension("mux"),
        }
    }

    pub fn to_file_set(&self) -> IntermediateFileSet {
        IntermediateFileSet::new(vec![
            self.m2v.clone(),
            self.wav.clone(),
            self.ads.clone(),
            self.mux.clone(),
        ])
    }
}

/// Directory ps2str writes into: the output's parent, or `.` for a bare name.
fn output_dir(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn os_args<const N: usize>(args: [&str; N]) -> Vec<OsString> {
    args.iter().map(OsString::from).collect()
}

/// ffmpeg arguments producing a platform-conformant M2V plus 48 kHz stereo
/// 16-bit PCM from the same input.
fn ffmpeg_args(input: &Path, files: &EncodeIntermediates, params: &EncodeParams) -> Vec<OsString> {
    let bitrate = format!("{}k", params.bitrate_kbps);
    let size = format!("{}x{}", params.width, params.height);

    let mut args = os_args(["-i"]);
    args.push(input.into());
    args.extend(os_args(["-c:v", "mpeg2video", "-profile:v", "4", "-level:v", "8"]));
    args.extend(os_args(["-b:v", bitrate.as_str(), "-bufsize", "1835k"]));
    args.extend(os_args(["-maxrate", bitrate.as_str(), "-minrate", bitrate.as_str()]));
    args.extend(os_args([
        "-color_range",
        "tv",
        "-colorspace",
        "smpte170m",
        "-color_trc",
        "smpte170m",
        "-color_primaries",
        "smpte170m",
        "-field_order",
        "progressive",
    ]));
    args.extend(os_args(["-s", size.as_str(), "-an", "-y"]));
    args.push(files.m2v.clone().into());
    args.extend(os_args(["-vn", "-acodec", "pcm_s16le", "-ar", "48000", "-ac", "2", "-y"]));
    args.push(files.wav.clone().into());
    args
}

fn ps2str_args(mode: &str, out_dir: &Path, input: &Path) -> Vec<OsString> {
    let mut args = os_args([mode, "-o", "-v", "-d"]);
    args.push(out_dir.into());
    args.push(input.into());
    args
}

/// Builds the six-step encode pipeline for `job`.
pub fn build(job: &ConversionJob, tools: &ToolPaths) -> CoreResult<Pipeline> {
    let params = job.params().ok_or_else(|| {
        CoreError::Validation("encode job is missing its encoding parameters".to_string())
    })?;
    let output = job.output();
    let files = EncodeIntermediates::for_output(output);
    let out_dir = output_dir(output);

    let manifest = MuxManifest::new()
        .stream(StreamKind::Video, &files.m2v)
        .stream(StreamKind::Pcm, &files.ads);
    let mux_name = files
        .mux
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let pipeline = Pipeline::new(
        Direction::EncodeToContainer,
        output.to_path_buf(),
        files.to_file_set(),
        job.keeps_intermediates(),
    )
    .with_step(PipelineStep::run_tool(
        "FFMPEG is generating M2V and WAV",
        &tools.ffmpeg,
        ffmpeg_args(job.input(), &files, params),
    ))
    .with_step(PipelineStep::patch(
        "Injecting metadata into M2V file",
        PatchOperation::InjectMetadata {
            comment: METADATA_COMMENT.to_string(),
        },
        &files.m2v,
    ))
    .with_step(PipelineStep::patch(
        "Appending sequence end code to M2V file",
        PatchOperation::EnsureSequenceEnd,
        &files.m2v,
    ))
    .with_step(PipelineStep::run_tool(
        "PS2STR is generating ADS audio",
        &tools.ps2str,
        ps2str_args("e", &out_dir, &files.wav),
    ))
    .with_step(PipelineStep::write_text(
        &format!("Creating project file {mux_name}"),
        &files.mux,
        manifest.render(),
    ))
    .with_step(PipelineStep::run_tool(
        "PS2STR is multiplexing PSS file",
        &tools.ps2str,
        ps2str_args("m", &out_dir, &files.mux),
    ));

    Ok(pipeline)
}
