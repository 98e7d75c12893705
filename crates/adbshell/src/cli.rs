//! Clap derive structures for the `adbshell` launcher.
//!
//! There are no subcommands: everything after startup happens inside the
//! interactive loop.

use std::path::PathBuf;

use clap::{Args, Parser};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// adbshell -- an interactive shell around adb
#[derive(Debug, Parser)]
#[command(
    name = "adbshell",
    version,
    about = "Interactive shell around adb with saved devices and autoconnect",
    long_about = "An interactive shell for the Android Debug Bridge.\n\n\
        Type adb commands without the adb prefix, bookmark devices with `save`,\n\
        and have them reconnect automatically on the next start."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Directory holding adbshell.conf, adb/, apks/ and mods/
    #[arg(long, env = "ADBSHELL_HOME", value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Path to the adb executable (skips discovery)
    #[arg(long, env = "ADBSHELL_ADB", value_name = "PATH")]
    pub adb: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}
