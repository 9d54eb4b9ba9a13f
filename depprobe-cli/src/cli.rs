//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use depprobe_core::types::{Ecosystem, ProtocolMode};

/// depprobe -- resolve and test unmanaged (C/C++) dependencies.
///
/// Use `depprobe <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "depprobe", version, about, long_about = None)]
pub struct Cli {
    /// Path to the depprobe.toml configuration file.
    #[arg(short, long, default_value = "depprobe.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
    /// SARIF 2.1.0 log.
    Sarif,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve scan results and test them for known issues.
    Test(TestArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- test ----

/// Resolve and test file-signature scan results.
#[derive(Args, Debug)]
pub struct TestArgs {
    /// Project paths to test (default: current directory).
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Scan result file name inside each path.
    #[arg(long, default_value = "scan-results.json")]
    pub scan_file: String,

    /// Organization to test under (overrides `api.org`).
    #[arg(long)]
    pub org: Option<String>,

    /// Only report issues at or above this severity (low, medium, high, critical).
    #[arg(long)]
    pub severity_threshold: Option<String>,

    /// Ignore suppression policy files.
    #[arg(long)]
    pub ignore_policy: bool,

    /// Explicit suppression policy file.
    #[arg(long)]
    pub policy_path: Option<PathBuf>,

    /// Backend protocol (overrides `resolver.protocol`).
    #[arg(long)]
    pub protocol: Option<ProtocolArg>,

    /// Ecosystem of the scan results (cpp, docker, code).
    #[arg(long, default_value = "cpp", value_parser = parse_ecosystem)]
    pub ecosystem: Ecosystem,
}

fn parse_ecosystem(s: &str) -> Result<Ecosystem, String> {
    Ecosystem::from_str_loose(s)
        .ok_or_else(|| format!("unknown ecosystem: {s} (expected: cpp, docker, code)"))
}

/// Backend protocol selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProtocolArg {
    /// Ask the backend feature flag.
    Auto,
    /// Token polling.
    Legacy,
    /// Dependency-graph resources.
    Graph,
}

impl From<ProtocolArg> for ProtocolMode {
    fn from(arg: ProtocolArg) -> Self {
        match arg {
            ProtocolArg::Auto => Self::Auto,
            ProtocolArg::Legacy => Self::Legacy,
            ProtocolArg::Graph => Self::Graph,
        }
    }
}

// ---- config ----

/// Manage depprobe configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, api, resolver, policy).
        section: Option<String>,
    },
}
