//! CLI error types with miette diagnostics.
//!
//! Fatal startup failures end the process with [`CliError::exit_code`].
//! Errors raised inside the loop are printed inline and the loop
//! carries on.

use miette::Diagnostic;
use thiserror::Error;

use adbshell_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const TOOL_MISSING: i32 = 1;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Startup ──────────────────────────────────────────────────────
    #[error("adb executable not found")]
    #[diagnostic(
        code(adbshell::adb_not_found),
        help(
            "Searched: {searched}\n\
             Put the Android platform-tools in the `adb` folder of the adbshell home,\n\
             install adb on your PATH, or pass --adb <path>."
        )
    )]
    AdbNotFound { searched: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(adbshell::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(
        code(adbshell::options),
        help("Check adbshell.toml in the adbshell home and any ADBSHELL_* variables.")
    )]
    Options(Box<figment::Error>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Prompt failed: {0}")]
    #[diagnostic(code(adbshell::prompt))]
    Prompt(String),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AdbNotFound { .. } => exit_code::TOOL_MISSING,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::AdbNotFound { searched } => Self::AdbNotFound {
                searched: searched
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Figment(err) => Self::Options(err),
            ConfigError::Io(err) => Self::Io(err),
        }
    }
}
