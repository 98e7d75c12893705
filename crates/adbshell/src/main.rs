mod cli;
mod commands;
mod error;
mod output;
mod presence;
mod shell;

use std::sync::Arc;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use adbshell_config::{AppPaths, RuntimeOptions};
use adbshell_core::{DeviceRegistry, Dispatcher, ProcessRunner};

use crate::cli::Cli;
use crate::error::{CliError, exit_code};
use crate::shell::ShellContext;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
    std::process::exit(exit_code::SUCCESS);
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let paths = AppPaths::resolve(cli.global.home);
    let adb = adbshell_config::locate_adb(cli.global.adb.as_deref(), &paths)?;
    debug!(adb = %adb.display(), home = %paths.home().display(), "starting");

    paths.ensure_home()?;
    let options = RuntimeOptions::load(&paths.options_file())?;
    let document = adbshell_config::load(&paths.config_file())?;

    let runner = Arc::new(ProcessRunner::new(
        adb.clone(),
        options.success_detection.classifier(),
    ));
    let ctx = ShellContext::new(
        paths,
        adb,
        runner,
        document.flags,
        DeviceRegistry::from_devices(document.devices),
        Dispatcher::new(options.wsa_port),
    );

    shell::run(ctx, options.reporter_config()).await
}
