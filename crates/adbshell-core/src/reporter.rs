// ── Background presence reporter ──
//
// Feeds the presence side-process through plain text files it polls:
// a device-count file kept in sync with `DeviceCount`, and a heartbeat
// timestamp it uses to notice that the shell has gone away.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::device_count::DeviceCount;
use crate::error::CoreError;
use crate::probe::count_connected;
use crate::runner::{CommandRunner, Invocation};

/// Timestamp layout the side-process parses from the heartbeat file.
pub const HEARTBEAT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

// ── Files ────────────────────────────────────────────────────────────

/// Locations of the files shared with the presence side-process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceFiles {
    /// `1` / `0`: whether the side-process should show presence.
    pub enabled: PathBuf,
    /// Decimal connected-device count.
    pub device_count: PathBuf,
    /// Last heartbeat timestamp.
    pub heartbeat: PathBuf,
}

impl PresenceFiles {
    /// Standard layout under a `mods` directory.
    pub fn under(mods_dir: &Path) -> Self {
        Self {
            enabled: mods_dir.join("rich_presence").join("enabled.dat"),
            device_count: mods_dir.join("devices.dat"),
            heartbeat: mods_dir.join("running.dat"),
        }
    }

    pub async fn write_enabled(&self, enabled: bool) -> Result<(), CoreError> {
        write_file(&self.enabled, if enabled { "1" } else { "0" }).await
    }

    pub async fn write_count(&self, count: usize) -> Result<(), CoreError> {
        write_file(&self.device_count, &count.to_string()).await
    }

    pub async fn write_heartbeat(&self, now: DateTime<Local>) -> Result<(), CoreError> {
        write_file(&self.heartbeat, &now.format(HEARTBEAT_FORMAT).to_string()).await
    }
}

async fn write_file(path: &Path, contents: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}

// ── Reporter ─────────────────────────────────────────────────────────

/// Task periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReporterConfig {
    pub probe_interval: Duration,
    pub heartbeat_interval: Duration,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            probe_interval: Duration::from_secs(10),
            heartbeat_interval: Duration::from_secs(10),
        }
    }
}

/// Handle to the running background tasks.
#[derive(Debug)]
pub struct Reporter {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Reporter {
    /// Spawn the count and heartbeat tasks on the current runtime.
    pub fn spawn(
        runner: Arc<dyn CommandRunner>,
        count: DeviceCount,
        files: PresenceFiles,
        config: ReporterConfig,
    ) -> Self {
        let cancel = CancellationToken::new();
        let handles = vec![
            tokio::spawn(count_task(
                runner,
                count,
                files.clone(),
                config.probe_interval,
                cancel.clone(),
            )),
            tokio::spawn(heartbeat_task(files, config.heartbeat_interval, cancel.clone())),
        ];
        debug!(?config, "presence reporter started");
        Self { cancel, handles }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel both tasks and wait for them to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for handle in self.handles {
            let _ = handle.await;
        }
        debug!("presence reporter stopped");
    }
}

/// Query adb once and publish the result into `count`.
pub async fn probe_once(runner: &dyn CommandRunner, count: &DeviceCount) -> Result<usize, CoreError> {
    let output = runner.capture(&Invocation::tool(["devices"])).await?;
    let connected = count_connected(&output);
    count.set_probed(connected);
    Ok(connected)
}

/// Probe on every tick; rewrite the count file on every change, whether
/// it came from a probe or an inline adjustment.
async fn count_task(
    runner: Arc<dyn CommandRunner>,
    count: DeviceCount,
    files: PresenceFiles,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut rx = count.subscribe();
    let initial = *rx.borrow_and_update();
    if let Err(e) = files.write_count(initial).await {
        warn!(error = %e, "failed to write device count");
    }

    // The first tick fires immediately.
    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *rx.borrow_and_update();
                if let Err(e) = files.write_count(current).await {
                    warn!(error = %e, "failed to write device count");
                }
            }
            _ = interval.tick() => {
                match probe_once(runner.as_ref(), &count).await {
                    Ok(n) => debug!(connected = n, "device probe"),
                    Err(e) => warn!(error = %e, "device probe failed"),
                }
            }
        }
    }
}

async fn heartbeat_task(files: PresenceFiles, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = files.write_heartbeat(Local::now()).await {
                    warn!(error = %e, "failed to write heartbeat");
                }
            }
        }
    }
}
