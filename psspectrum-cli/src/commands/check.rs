//! Implementation of the 'check' subcommand.
//!
//! Prints the resolved location of every external tool and exits non-zero
//! when any is missing, which is the same condition that disables
//! conversion.

use std::process::ExitCode;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use psspectrum_core::{DependencyStatus, dependency_report};

use crate::cli::GlobalArgs;
use crate::output::Stream;

fn status_json(statuses: &[DependencyStatus]) -> serde_json::Value {
    serde_json::Value::Array(
        statuses
            .iter()
            .map(|s| {
                serde_json::json!({
                    "name": s.name,
                    "path": s.path.display().to_string(),
                    "found": s.found,
                })
            })
            .collect(),
    )
}

pub fn run_check(global: &GlobalArgs) -> Result<ExitCode> {
    let config = global
        .core_config()
        .context("Failed to resolve tool locations")?;
    let statuses = dependency_report(&config.tools);
    let all_found = statuses.iter().all(|s| s.found);

    if global.json {
        println!("{}", serde_json::to_string_pretty(&status_json(&statuses))?);
    } else {
        let colored = Stream::Stdout.supports_color();
        for status in &statuses {
            let mark = match (status.found, colored) {
                (true, true) => format!("{:<8}", "found").green().to_string(),
                (false, true) => format!("{:<8}", "missing").red().bold().to_string(),
                (true, false) => format!("{:<8}", "found"),
                (false, false) => format!("{:<8}", "missing"),
            };
            println!("{:<14} {} {}", status.name, mark, status.path.display());
        }
        if !all_found {
            let missing: Vec<&str> = statuses
                .iter()
                .filter(|s| !s.found)
                .map(|s| s.name)
                .collect();
            eprintln!("Required tools not found: {}", missing.join(", "));
        }
    }

    Ok(if all_found {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
