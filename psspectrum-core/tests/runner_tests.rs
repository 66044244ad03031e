// Exercises SystemRunner against real child processes. Unix only: the
// fixtures are small /bin/sh scripts.
#![cfg(unix)]

use psspectrum_core::*;
use std::ffi::OsString;
use std::path::Path;
use std::time::{Duration, Instant};

fn sh(script: &str) -> Vec<OsString> {
    vec!["-c".into(), script.into()]
}

fn run(runner: &SystemRunner, script: &str) -> (Result<(), ToolFailure>, Vec<String>) {
    let mut lines = Vec::new();
    let result = runner.run(Path::new("/bin/sh"), &sh(script), &mut |l| {
        lines.push(l.to_string())
    });
    (result, lines)
}

#[test]
fn test_stdout_lines_arrive_in_order() {
    let (result, lines) = run(&SystemRunner::new(), "echo one; echo two; printf 'three'");
    assert!(result.is_ok());
    assert_eq!(lines, ["one", "two", "three"]);
}

#[test]
fn test_stderr_is_merged_in_write_order() {
    let (result, lines) = run(
        &SystemRunner::new(),
        "i=0; while [ $i -lt 300 ]; do echo \"err $i\" 1>&2; echo \"out $i\"; i=$((i+1)); done",
    );
    assert!(result.is_ok());

    let expected: Vec<String> = (0..300)
        .flat_map(|i| [format!("err {i}"), format!("out {i}")])
        .collect();
    assert_eq!(lines, expected);
}

#[test]
fn test_carriage_return_progress_lines() {
    let (_, lines) = run(&SystemRunner::new(), "printf 'frame=1\\rframe=2\\rdone\\n'");
    assert_eq!(lines, ["frame=1", "frame=2", "done"]);
}

#[test]
fn test_nonzero_exit_is_failure_even_with_output() {
    let (result, lines) = run(&SystemRunner::new(), "echo partial; exit 2");
    assert_eq!(lines, ["partial"]);
    match result {
        Err(failure) => assert_eq!(failure.exit_code(), Some(2)),
        Ok(()) => panic!("exit 2 must fail"),
    }
}

#[test]
fn test_error_text_with_zero_exit_is_success() {
    let (result, lines) = run(&SystemRunner::new(), "echo 'Error: something odd' 1>&2; exit 0");
    assert!(result.is_ok());
    assert_eq!(lines, ["Error: something odd"]);
}

#[test]
fn test_large_output_does_not_stall() {
    let (result, lines) = run(
        &SystemRunner::new(),
        "i=0; while [ $i -lt 5000 ]; do echo \"line $i padding padding padding\" 1>&2; i=$((i+1)); done",
    );
    assert!(result.is_ok());
    assert_eq!(lines.len(), 5000);
    assert_eq!(lines[4999], "line 4999 padding padding padding");
}

#[test]
fn test_timeout_kills_hung_tool() {
    let runner = SystemRunner::with_timeout(Some(Duration::from_millis(300)));
    let started = Instant::now();
    let (result, _) = run(&runner, "echo started; exec sleep 30");

    assert!(matches!(result, Err(ToolFailure::Timeout(_))));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn test_timeout_covers_output_held_by_background_process() {
    let runner = SystemRunner::with_timeout(Some(Duration::from_millis(300)));
    let started = Instant::now();
    let (result, lines) = run(&runner, "sleep 4 & echo started");

    assert_eq!(lines, ["started"]);
    assert!(matches!(result, Err(ToolFailure::Timeout(_))));
    assert!(started.elapsed() < Duration::from_secs(3));
}
