// ── Core error types ──
//
// Errors surfaced by adbshell-core. Nothing in here is fatal to the
// interactive loop; the binary decides how to report each variant.

use std::process::ExitStatus;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Process errors ───────────────────────────────────────────────
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    ToolFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Could not parse arguments: {message}")]
    InvalidArguments { message: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
