// ============================================================================
// psspectrum-cli/src/logging.rs
// ============================================================================
//
// LOGGING: Diagnostics Setup and Run Log Naming
//
// Library diagnostics go through the `log` facade. This module installs a
// fern dispatcher that writes them to stderr, so stdout carries only the
// conversion output (or the JSON summary).
//
// KEY COMPONENTS:
// - init: fern dispatcher, level chosen by --verbose
// - get_timestamp / run_log_file_name: Timestamped run log names

use log::LevelFilter;

/// Installs the global logger. Call once, before any job starts.
pub fn init(verbose: bool) -> Result<(), log::SetLoggerError> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Run log file name for a job, e.g. `psspectrum_encode_20240601_123045.log`.
pub fn run_log_file_name(direction: &str) -> String {
    format!("psspectrum_{}_{}.log", direction, get_timestamp())
}
