//! Persistence and configuration for adbshell.
//!
//! The flat `key=value` config file with flags and saved devices, home
//! directory layout, runtime options (TOML + env), and discovery of the
//! wrapped adb executable. Core never reads or writes any of this; the
//! binary loads a [`ConfigDocument`] and hands plain values down.

use std::path::PathBuf;

use thiserror::Error;

mod options;
mod paths;
mod store;
mod tool;

pub use options::{RuntimeOptions, runtime_options_figment};
pub use paths::AppPaths;
pub use store::{ConfigDocument, load, render, save};
pub use tool::locate_adb;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("adb executable not found (searched: {})", display_paths(.searched))]
    AdbNotFound { searched: Vec<PathBuf> },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
