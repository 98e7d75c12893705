//! Saved-device commands.

use adbshell_core::{AddOutcome, CountChange, DeviceRegistry, Invocation};

use crate::commands::util::Prompter;
use crate::error::CliError;
use crate::output;
use crate::shell::ShellContext;

pub fn save(
    ctx: &mut ShellContext,
    name: String,
    address: String,
    autoconnect: bool,
) -> Result<(), CliError> {
    let message = format!("'{name}' ({address})");
    let outcome = ctx.update_registry(|registry| registry.add(name, address, autoconnect))?;
    let verb = match outcome {
        AddOutcome::Added => "Saved device",
        AddOutcome::Replaced => "Updated saved device",
    };
    let suffix = if autoconnect { ", autoconnect on" } else { "" };
    output::status_line(format!("{verb} {message}{suffix}."), ctx.color);
    Ok(())
}

pub fn remove(ctx: &mut ShellContext, name: &str) -> Result<(), CliError> {
    if ctx.registry.find_by_name(name).is_none() {
        not_found(ctx, name);
        return Ok(());
    }
    ctx.update_registry(|registry| registry.remove_by_name(name))?;
    output::status_line(format!("Removed saved device '{name}'."), ctx.color);
    Ok(())
}

/// `connectsaved` / `disconnectsaved`.
pub async fn connect_saved(ctx: &ShellContext, name: &str, connect: bool) {
    let Some(device) = ctx.registry.find_by_name(name) else {
        not_found(ctx, name);
        return;
    };
    let (verb, change) = if connect {
        ("connect", CountChange::Connected)
    } else {
        ("disconnect", CountChange::Disconnected)
    };
    let invocation = Invocation::tool([verb, device.address.as_str()]);
    ctx.run_tracked(&invocation, Some(change)).await;
}

pub fn list(ctx: &ShellContext) {
    output::print_output(&output::saved_devices_table(ctx.registry.list()));
}

pub fn clear(ctx: &mut ShellContext, prompter: &dyn Prompter) -> Result<(), CliError> {
    if ctx.registry.is_empty() {
        output::status_line("There are no saved devices.", ctx.color);
        return Ok(());
    }
    let question = format!("Forget all {} saved device(s)?", ctx.registry.len());
    if !prompter.confirm(&question)? {
        return Ok(());
    }
    let removed = ctx.update_registry(DeviceRegistry::clear_all)?;
    output::status_line(format!("Removed {removed} saved device(s)."), ctx.color);
    Ok(())
}

pub fn set_autoconnect(ctx: &mut ShellContext, name: &str, enabled: bool) -> Result<(), CliError> {
    if ctx.registry.find_by_name(name).is_none() {
        not_found(ctx, name);
        return Ok(());
    }
    ctx.update_registry(|registry| registry.set_autoconnect(name, enabled))?;
    let state = if enabled { "on" } else { "off" };
    output::status_line(format!("Autoconnect for '{name}' is now {state}."), ctx.color);
    Ok(())
}

fn not_found(ctx: &ShellContext, name: &str) {
    output::error_line(
        format!("No saved device named '{name}'. Run 'listsaved' to see saved devices."),
        ctx.color,
    );
}
