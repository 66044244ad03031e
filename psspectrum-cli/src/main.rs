// ============================================================================
// psspectrum-cli/src/main.rs
// ============================================================================
//
// PSSPECTRUM CLI: Main Entry Point
//
// Parses the command line, installs logging and dispatches to the encode,
// decode or check command. Errors from a command are printed with their
// context chain and turn into a non-zero exit code.

use clap::Parser;
use owo_colors::OwoColorize;
use psspectrum_cli::{Cli, Commands, logging, run_check, run_decode, run_encode};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.global.verbose) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let result = match cli.command {
        Commands::Encode(args) => run_encode(&cli.global, args),
        Commands::Decode(args) => run_decode(&cli.global, args),
        Commands::Check => run_check(&cli.global),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
