// psspectrum-cli/src/lib.rs
//
// Library portion of the PSSpectrum CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod output;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, DecodeArgs, EncodeArgs, GlobalArgs};
pub use commands::check::run_check;
pub use commands::decode::run_decode;
pub use commands::encode::run_encode;
