//! `installapp`: push every APK from the home `apks` folder.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use adbshell_core::Invocation;

use crate::error::CliError;
use crate::output;
use crate::shell::ShellContext;

pub async fn install_all(ctx: &ShellContext) -> Result<(), CliError> {
    let dir = ctx.paths.apks_dir();
    let apks = find_apks(&dir)?;
    let Some(invocation) = install_invocation(&apks) else {
        output::error_line(
            format!("No .apk files found in {}.", dir.display()),
            ctx.color,
        );
        return Ok(());
    };

    output::status_line(format!("Installing {} apk file(s)...", apks.len()), ctx.color);
    debug!(%invocation, "installing apks");
    ctx.runner.run(&invocation).await;
    Ok(())
}

/// `*.apk` files directly inside `dir`, sorted by name. A missing
/// directory yields an empty list.
pub fn find_apks(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut apks = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_apk = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("apk"));
        if is_apk && path.is_file() {
            apks.push(path);
        }
    }
    apks.sort();
    Ok(apks)
}

/// One file installs on its own; several are treated as a split-APK set.
pub fn install_invocation(apks: &[PathBuf]) -> Option<Invocation> {
    let verb = match apks.len() {
        0 => return None,
        1 => "install",
        _ => "install-multiple",
    };
    Some(Invocation::Tool(
        std::iter::once(verb.to_owned())
            .chain(apks.iter().map(|p| p.display().to_string()))
            .collect(),
    ))
}
