//! Launcher for the presence side-process shipped under `mods/`.

use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use adbshell_config::AppPaths;

/// Start the presence executable detached, if it is installed.
///
/// The child is never awaited; it watches the heartbeat file and exits
/// on its own once the shell stops writing it.
pub fn launch(paths: &AppPaths) -> bool {
    let exe = paths.presence_executable();
    if !exe.is_file() {
        debug!(path = %exe.display(), "presence executable not installed");
        return false;
    }

    let mut command = Command::new(&exe);
    command
        .current_dir(paths.home())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    detach(&mut command);

    match command.spawn() {
        Ok(child) => {
            info!(pid = child.id(), "presence side-process started");
            true
        }
        Err(e) => {
            warn!(path = %exe.display(), error = %e, "failed to start presence side-process");
            false
        }
    }
}

#[cfg(windows)]
fn detach(command: &mut Command) {
    use std::os::windows::process::CommandExt;

    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    command.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
}

#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;

    command.process_group(0);
}

#[cfg(not(any(unix, windows)))]
fn detach(_command: &mut Command) {}
