//! depprobe command-line interface
//!
//! - [`cli`]: Argument parsing (clap derive)
//! - [`commands`]: One handler per subcommand
//! - [`output`]: Text / JSON / SARIF rendering
//! - [`logging`]: `tracing-subscriber` initialization
//! - [`error`]: `CliError` and exit code mapping

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
