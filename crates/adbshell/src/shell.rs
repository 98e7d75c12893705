//! Interactive loop and the state it threads through every handler.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use adbshell_config::AppPaths;
use adbshell_core::{
    CommandRunner, ConfigFlags, CountChange, DeviceCount, DeviceRegistry, Dispatcher, FlagKey,
    Invocation, PresenceFiles, Reporter, ReporterConfig, RunOutcome, SavedDevice,
};

use crate::commands::{self, Flow, util::TerminalPrompter};
use crate::error::CliError;
use crate::output;
use crate::presence;

// ── Context ──────────────────────────────────────────────────────────

/// Everything a handler may read or change.
pub struct ShellContext {
    pub flags: ConfigFlags,
    pub registry: DeviceRegistry,
    pub paths: AppPaths,
    pub config_file: PathBuf,
    pub adb: PathBuf,
    pub count: DeviceCount,
    pub runner: Arc<dyn CommandRunner>,
    pub dispatcher: Dispatcher,
    pub presence: PresenceFiles,
    pub color: bool,
}

impl ShellContext {
    pub fn new(
        paths: AppPaths,
        adb: PathBuf,
        runner: Arc<dyn CommandRunner>,
        flags: ConfigFlags,
        registry: DeviceRegistry,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            flags,
            registry,
            config_file: paths.config_file(),
            presence: PresenceFiles::under(&paths.mods_dir()),
            paths,
            adb,
            count: DeviceCount::new(),
            runner,
            dispatcher,
            color: output::should_color(),
        }
    }

    /// Run an invocation and, on success, move the device count.
    pub async fn run_tracked(
        &self,
        invocation: &Invocation,
        change: Option<CountChange>,
    ) -> RunOutcome {
        let outcome = self.runner.run(invocation).await;
        if outcome.success {
            if let Some(change) = change {
                let connected = self.count.apply(change);
                debug!(?change, connected, "device count adjusted");
            }
        }
        outcome
    }

    /// Apply `f` to a copy of the registry, persist it, and only then
    /// adopt it. A failed write leaves the in-memory state untouched.
    pub fn update_registry<T>(
        &mut self,
        f: impl FnOnce(&mut DeviceRegistry) -> T,
    ) -> Result<T, CliError> {
        let mut draft = self.registry.clone();
        let result = f(&mut draft);
        adbshell_config::save(&self.config_file, &self.flags, draft.list())?;
        self.registry = draft;
        Ok(result)
    }

    /// Persist edited settings and adopt them.
    pub fn commit_settings(
        &mut self,
        flags: ConfigFlags,
        registry: DeviceRegistry,
    ) -> Result<(), CliError> {
        adbshell_config::save(&self.config_file, &flags, registry.list())?;
        self.flags = flags;
        self.registry = registry;
        Ok(())
    }

    /// Refresh `enabled.dat` from the current flags.
    pub async fn write_presence_flag(&self) {
        if !self.flags.get(FlagKey::Mods) {
            return;
        }
        let enabled = self.flags.get(FlagKey::PresenceReporting);
        if let Err(e) = self.presence.write_enabled(enabled).await {
            warn!(error = %e, "failed to write presence flag");
        }
    }
}

// ── Loop ─────────────────────────────────────────────────────────────

/// Banner, startup work, then read-dispatch until `exit` or end of input.
pub async fn run(mut ctx: ShellContext, reporter_config: ReporterConfig) -> Result<(), CliError> {
    println!("{}", output::banner(ctx.color));
    ctx.runner.run(&Invocation::tool(["version"])).await;
    println!("{}", output::rule());

    let reporter = if ctx.flags.get(FlagKey::Mods) {
        Some(start_mods(&ctx, reporter_config).await)
    } else {
        None
    };

    autoconnect(&ctx).await;

    let prompter = TerminalPrompter;
    loop {
        let Some(line) = read_line(output::prompt(ctx.color)).await else {
            println!();
            debug!("end of input");
            break;
        };

        let command = ctx.dispatcher.classify(&line, &ctx.flags);
        debug!(?command, "dispatching");
        match commands::dispatch(&mut ctx, command, &prompter).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(e) => output::error_line(e, ctx.color),
        }
    }

    if let Some(reporter) = reporter {
        reporter.shutdown().await;
    }
    Ok(())
}

async fn start_mods(ctx: &ShellContext, config: ReporterConfig) -> Reporter {
    ctx.write_presence_flag().await;
    presence::launch(&ctx.paths);
    info!("mods enabled, starting presence reporter");
    Reporter::spawn(
        Arc::clone(&ctx.runner),
        ctx.count.clone(),
        ctx.presence.clone(),
        config,
    )
}

/// Connect every saved device flagged for it, in list order.
pub async fn autoconnect(ctx: &ShellContext) {
    let targets: Vec<SavedDevice> = ctx.registry.autoconnect_targets().cloned().collect();
    for device in targets {
        output::status_line(
            format!("Autoconnecting to {} ({})...", device.name, device.address),
            ctx.color,
        );
        let outcome = ctx
            .run_tracked(
                &Invocation::tool(["connect", device.address.as_str()]),
                Some(CountChange::Connected),
            )
            .await;
        if !outcome.success {
            warn!(name = %device.name, address = %device.address, "autoconnect failed");
        }
    }
}

/// Read one line on a blocking thread. `None` on end of input. Bytes
/// that are not UTF-8 are replaced so a bad line never ends the session.
async fn read_line(prompt: String) -> Option<String> {
    let read = tokio::task::spawn_blocking(move || {
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "{prompt}");
        let _ = stdout.flush();
        drop(stdout);

        let mut line = Vec::new();
        match io::stdin().lock().read_until(b'\n', &mut line) {
            Ok(0) => None,
            Ok(_) => Some(String::from_utf8_lossy(&line).into_owned()),
            Err(e) => {
                warn!(error = %e, "failed to read input");
                None
            }
        }
    })
    .await;

    read.unwrap_or_else(|e| {
        warn!(error = %e, "input reader task failed");
        None
    })
}
