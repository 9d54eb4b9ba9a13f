//! CLI-specific error types and exit code mapping

use depprobe_core::error::DepprobeError;
use depprobe_resolver::ResolverError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// Variants produced by `test` may also carry an already rendered payload
/// that must reach stdout before the process exits.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// At least one tested project has issues. `payload` is the rendered report.
    #[error("found {count} issues")]
    FoundIssues { count: usize, payload: String },

    /// Every project failed (text output: the error list is the message).
    #[error("{}", .errors.join("\n"))]
    NoSuccessfulScans { errors: Vec<String> },

    /// Every project failed (JSON / SARIF output: the rendered report is carried).
    #[error("{}", .errors.join("\n"))]
    NoSuccessfulScansReport { payload: String, errors: Vec<String> },

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from depprobe-core.
    #[error("{0}")]
    Core(#[from] DepprobeError),
}

impl From<ResolverError> for CliError {
    fn from(e: ResolverError) -> Self {
        Self::Core(e.into())
    }
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                  |
    /// |------|------------------------------------------|
    /// | 0    | Success, no issues                       |
    /// | 1    | Issues found                             |
    /// | 2    | Failure (no successful scan, IO, ...)    |
    /// | 3    | Configuration error                      |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FoundIssues { .. } => 1,
            Self::Config(_) | Self::Core(DepprobeError::Config(_)) => 3,
            Self::Command(_)
            | Self::NoSuccessfulScans { .. }
            | Self::NoSuccessfulScansReport { .. }
            | Self::JsonSerialize(_)
            | Self::Io(_)
            | Self::Core(_) => 2,
        }
    }

    /// Rendered report to print on stdout instead of an error line.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::FoundIssues { payload, .. } | Self::NoSuccessfulScansReport { payload, .. } => {
                Some(payload)
            }
            _ => None,
        }
    }
}
