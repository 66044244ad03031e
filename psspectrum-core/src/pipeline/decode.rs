// psspectrum-core/src/pipeline/decode.rs
//
// PSS -> MP4: ps2str demultiplexes next to the input, vgmstream-cli turns the
// ADS audio into WAV and ffmpeg remuxes the untouched video with AAC audio.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::{IntermediateFileSet, Pipeline, PipelineStep};
use crate::config::ToolPaths;
use crate::error::{CoreError, CoreResult};
use crate::job::{ConversionJob, Direction};

/// Scratch files of a decode job.
///
/// The M2V and ADS names are fixed by ps2str's demux convention; only the
/// WAV name is ours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeIntermediates {
    pub m2v: PathBuf,
    pub ads: PathBuf,
    pub wav: PathBuf,
}

impl DecodeIntermediates {
    pub fn for_input(input: &Path) -> CoreResult<Self> {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                CoreError::Validation(format!("input '{}' has no file name", input.display()))
            })?;
        let dir = input_dir(input);

        Ok(Self {
            m2v: dir.join(format!("{stem}_video_0.m2v")),
            ads: dir.join(format!("{stem}_pcm_0.ads")),
            wav: dir.join(format!("{stem}_temp.wav")),
        })
    }

    pub fn to_file_set(&self) -> IntermediateFileSet {
        IntermediateFileSet::new(vec![self.m2v.clone(), self.ads.clone(), self.wav.clone()])
    }
}

fn input_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Builds the three-step decode pipeline for `job`.
pub fn build(job: &ConversionJob, tools: &ToolPaths) -> CoreResult<Pipeline> {
    let input = job.input();
    let files = DecodeIntermediates::for_input(input)?;

    let demux_args: Vec<OsString> = vec![
        "d".into(),
        "-o".into(),
        "-v".into(),
        "-d".into(),
        input_dir(input).into(),
        input.into(),
    ];
    let audio_args: Vec<OsString> = vec!["-o".into(), files.wav.clone().into(), files.ads.clone().into()];
    let mut remux_args: Vec<OsString> = vec!["-i".into(), files.m2v.clone().into()];
    remux_args.push("-i".into());
    remux_args.push(files.wav.clone().into());
    remux_args.extend(
        ["-c:v", "copy", "-c:a", "aac", "-b:a", "192k", "-y"]
            .into_iter()
            .map(OsString::from),
    );
    remux_args.push(job.output().into());

    Ok(Pipeline::new(
        Direction::DecodeFromContainer,
        job.output().to_path_buf(),
        files.to_file_set(),
        job.keeps_intermediates(),
    )
    .with_step(PipelineStep::run_tool(
        "PS2STR is demultiplexing PSS file",
        &tools.ps2str,
        demux_args,
    ))
    .with_step(PipelineStep::run_tool(
        "vgmstream-cli is converting audio",
        &tools.vgmstream,
        audio_args,
    ))
    .with_step(PipelineStep::run_tool(
        "FFMPEG is multiplexing MP4 file",
        &tools.ffmpeg,
        remux_args,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::MockToolRunner;
    use crate::pipeline::{JobState, StepAction, run_pipeline};
    use std::fs;
    use tempfile::tempdir;

    fn tools() -> ToolPaths {
        ToolPaths {
            ffmpeg: PathBuf::from("/tools/ffmpeg"),
            ps2str: PathBuf::from("/tools/bin/ps2str"),
            vgmstream: PathBuf::from("/tools/bin/vgmstream-cli"),
        }
    }

    fn scripted_runner(files: &DecodeIntermediates, output: &Path) -> MockToolRunner {
        let runner = MockToolRunner::new();
        runner.add_success_expectation(
            "ps2str",
            &["demuxing stream 0"],
            vec![(files.m2v.clone(), vec![0, 0, 1, 0xB3]), (files.ads.clone(), b"SShd".to_vec())],
        );
        runner.add_success_expectation("vgmstream-cli", &[], vec![(files.wav.clone(), b"RIFF".to_vec())]);
        runner.add_success_expectation("ffmpeg", &["muxing"], vec![(output.to_path_buf(), b"ftyp".to_vec())]);
        runner
    }

    #[test]
    fn test_intermediate_names_follow_input() {
        let files = DecodeIntermediates::for_input(Path::new("/movies/intro.pss")).unwrap();
        assert_eq!(files.m2v, Path::new("/movies/intro_video_0.m2v"));
        assert_eq!(files.ads, Path::new("/movies/intro_pcm_0.ads"));
        assert_eq!(files.wav, Path::new("/movies/intro_temp.wav"));

        let bare = DecodeIntermediates::for_input(Path::new("intro.pss")).unwrap();
        assert_eq!(bare.m2v, Path::new("./intro_video_0.m2v"));
    }

    #[test]
    fn test_build_decode_commands() {
        let job = ConversionJob::decode(PathBuf::from("/movies/intro.pss"), PathBuf::from("/out/intro.mp4"));
        let pipeline = build(&job, &tools()).unwrap();
        assert_eq!(pipeline.steps().len(), 3);

        let commands: Vec<Vec<String>> = pipeline
            .steps()
            .iter()
            .map(|step| match &step.action {
                StepAction::RunTool { program, args } => std::iter::once(program.display().to_string())
                    .chain(args.iter().map(|a| a.to_string_lossy().into_owned()))
                    .collect(),
                other => panic!("unexpected action {other:?}"),
            })
            .collect();

        assert_eq!(
            commands[0],
            ["/tools/bin/ps2str", "d", "-o", "-v", "-d", "/movies", "/movies/intro.pss"]
        );
        assert_eq!(
            commands[1],
            [
                "/tools/bin/vgmstream-cli",
                "-o",
                "/movies/intro_temp.wav",
                "/movies/intro_pcm_0.ads"
            ]
        );
        assert_eq!(
            commands[2],
            [
                "/tools/ffmpeg",
                "-i",
                "/movies/intro_video_0.m2v",
                "-i",
                "/movies/intro_temp.wav",
                "-c:v",
                "copy",
                "-c:a",
                "aac",
                "-b:a",
                "192k",
                "-y",
                "/out/intro.mp4"
            ]
        );
    }

    #[test]
    fn test_decode_success_removes_intermediates() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("intro.pss");
        fs::write(&input, b"pss").unwrap();
        let output = dir.path().join("intro.mp4");
        let files = DecodeIntermediates::for_input(&input).unwrap();

        let job = ConversionJob::decode(input.clone(), output.clone());
        let pipeline = build(&job, &tools()).unwrap();
        let runner = scripted_runner(&files, &output);

        let mut lines = Vec::new();
        let report = run_pipeline(&pipeline, &runner, &mut |l: &str| lines.push(l.to_string()));

        assert_eq!(report.state, JobState::Succeeded);
        assert_eq!(report.removed_intermediates.len(), 3);
        assert!(!files.m2v.exists());
        assert!(!files.ads.exists());
        assert!(!files.wav.exists());
        assert!(output.exists());
        assert!(input.exists());
        assert!(lines.contains(&"demuxing stream 0".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("[SUCCESS]")));
    }

    #[test]
    fn test_decode_success_keeps_intermediates() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("intro.pss");
        let output = dir.path().join("intro.mp4");
        let files = DecodeIntermediates::for_input(&input).unwrap();

        let job = ConversionJob::decode(input, output.clone()).keep_intermediates(true);
        let pipeline = build(&job, &tools()).unwrap();
        let runner = scripted_runner(&files, &output);

        let report = run_pipeline(&pipeline, &runner, &mut |_: &str| {});

        assert!(report.is_success());
        assert!(report.removed_intermediates.is_empty());
        assert!(files.m2v.exists());
        assert!(files.ads.exists());
        assert!(files.wav.exists());
    }

    #[test]
    fn test_tool_that_cannot_start_fails_the_step() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("intro.pss");
        fs::write(&input, b"pss").unwrap();
        let output = dir.path().join("intro.mp4");
        let files = DecodeIntermediates::for_input(&input).unwrap();

        let runner = MockToolRunner::new();
        runner.add_success_expectation(
            "ps2str",
            &[],
            vec![(files.m2v.clone(), vec![0, 0, 1, 0xB3]), (files.ads.clone(), b"SShd".to_vec())],
        );
        runner.add_launch_error_expectation("vgmstream-cli");

        let job = ConversionJob::decode(input.clone(), output.clone());
        let pipeline = build(&job, &tools()).unwrap();
        let mut lines = Vec::new();
        let report = run_pipeline(&pipeline, &runner, &mut |l: &str| lines.push(l.to_string()));

        assert_eq!(report.state, JobState::Failed);
        assert_eq!(report.completed_steps, ["PS2STR is demultiplexing PSS file"]);
        let failure = report.failure.as_ref().unwrap();
        assert_eq!(failure.index, 2);
        assert!(matches!(
            &failure.error,
            CoreError::ToolExecutionFailed {
                source: crate::error::ToolFailure::Launch { .. },
                ..
            }
        ));

        let errors: Vec<&String> = lines.iter().filter(|l| l.starts_with("[ERROR]")).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("[ERROR] Step 2 (vgmstream-cli is converting audio) failed:"));
        assert!(lines.contains(&"--- Cleaning up temporary files ---".to_string()));

        // The remux step never ran and the demuxed files were removed.
        assert_eq!(runner.received_calls().len(), 2);
        assert!(!files.m2v.exists());
        assert!(!files.ads.exists());
        assert!(!output.exists());
        assert!(input.exists());
    }
}
