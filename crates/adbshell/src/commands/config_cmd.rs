//! `config`: terminal settings editor.
//!
//! Edits a draft copy of the flags and saved devices. Nothing touches
//! the shell or the config file until "Save and exit" is chosen.

use dialoguer::{Confirm, Input, Select};

use adbshell_core::{ConfigFlags, DeviceRegistry, FlagKey, SavedDevice};

use crate::commands::util::prompt_err;
use crate::error::CliError;
use crate::output;
use crate::shell::ShellContext;

// ── Draft state ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
struct Draft {
    flags: ConfigFlags,
    registry: DeviceRegistry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainChoice {
    Toggle(FlagKey),
    Devices,
    Save,
    Discard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DevicesChoice {
    Device(usize),
    Add,
    ClearAll,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeviceAction {
    EditAddress,
    ToggleAutoconnect,
    Delete,
    Back,
}

fn checkbox(on: bool) -> &'static str {
    if on { "[x]" } else { "[ ]" }
}

fn main_menu(draft: &Draft) -> Vec<(String, MainChoice)> {
    let mut items: Vec<(String, MainChoice)> = draft
        .flags
        .known()
        .map(|(key, on)| {
            (
                format!("{} {}", checkbox(on), key.label()),
                MainChoice::Toggle(key),
            )
        })
        .collect();
    items.push((
        format!("Saved devices ({})", draft.registry.len()),
        MainChoice::Devices,
    ));
    items.push(("Save and exit".into(), MainChoice::Save));
    items.push(("Discard changes".into(), MainChoice::Discard));
    items
}

fn device_label(device: &SavedDevice) -> String {
    let auto = if device.autoconnect { " [autoconnect]" } else { "" };
    format!("{} ({}){auto}", device.name, device.address)
}

fn devices_menu(draft: &Draft) -> Vec<(String, DevicesChoice)> {
    let mut items: Vec<(String, DevicesChoice)> = draft
        .registry
        .list()
        .iter()
        .enumerate()
        .map(|(i, device)| (device_label(device), DevicesChoice::Device(i)))
        .collect();
    items.push(("Add device".into(), DevicesChoice::Add));
    if !draft.registry.is_empty() {
        items.push(("Clear all devices".into(), DevicesChoice::ClearAll));
    }
    items.push(("Back".into(), DevicesChoice::Back));
    items
}

fn device_menu(device: &SavedDevice) -> Vec<(String, DeviceAction)> {
    vec![
        ("Edit address".into(), DeviceAction::EditAddress),
        (
            format!(
                "Autoconnect: {} (toggle)",
                if device.autoconnect { "on" } else { "off" }
            ),
            DeviceAction::ToggleAutoconnect,
        ),
        ("Delete".into(), DeviceAction::Delete),
        ("Back".into(), DeviceAction::Back),
    ]
}

// ── Prompts ──────────────────────────────────────────────────────────

/// Show a menu and return the chosen action. Esc picks `fallback`.
fn choose<T: Copy>(prompt: &str, items: &[(String, T)], fallback: T) -> Result<T, CliError> {
    let labels: Vec<&str> = items.iter().map(|(label, _)| label.as_str()).collect();
    let selection = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact_opt()
        .map_err(prompt_err)?;
    Ok(selection
        .and_then(|i| items.get(i))
        .map_or(fallback, |(_, choice)| *choice))
}

fn input_required(prompt: &str, initial: Option<&str>) -> Result<String, CliError> {
    let mut input = Input::<String>::new()
        .with_prompt(prompt)
        .validate_with(|value: &String| {
            if value.trim().is_empty() {
                Err("a value is required")
            } else {
                Ok(())
            }
        });
    if let Some(initial) = initial {
        input = input.with_initial_text(initial);
    }
    let value = input.interact_text().map_err(prompt_err)?;
    Ok(value.trim().to_owned())
}

fn ask(prompt: &str) -> Result<bool, CliError> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(ctx: &mut ShellContext) -> Result<(), CliError> {
    let original = Draft {
        flags: ctx.flags.clone(),
        registry: ctx.registry.clone(),
    };
    let mut draft = original.clone();

    loop {
        match choose("Settings", &main_menu(&draft), MainChoice::Discard)? {
            MainChoice::Toggle(key) => {
                draft.flags.toggle(key);
            }
            MainChoice::Devices => edit_devices(&mut draft)?,
            MainChoice::Save => break,
            MainChoice::Discard => {
                if draft != original {
                    output::status_line("Changes discarded.", ctx.color);
                }
                return Ok(());
            }
        }
    }

    if draft == original {
        output::status_line("No changes to save.", ctx.color);
        return Ok(());
    }

    let mods_changed = draft.flags.get(FlagKey::Mods) != original.flags.get(FlagKey::Mods);
    ctx.commit_settings(draft.flags, draft.registry)?;
    ctx.write_presence_flag().await;
    output::status_line("Settings saved.", ctx.color);
    if mods_changed {
        output::status_line("Restart adbshell for the mods setting to take effect.", ctx.color);
    }
    Ok(())
}

fn edit_devices(draft: &mut Draft) -> Result<(), CliError> {
    loop {
        match choose("Saved devices", &devices_menu(draft), DevicesChoice::Back)? {
            DevicesChoice::Device(index) => {
                let Some(device) = draft.registry.list().get(index).cloned() else {
                    continue;
                };
                edit_device(draft, &device)?;
            }
            DevicesChoice::Add => {
                let name = input_required("Device name", None)?;
                let address = input_required("Address (host:port)", None)?;
                let autoconnect = ask("Connect automatically at startup?")?;
                draft.registry.add(name, address, autoconnect);
            }
            DevicesChoice::ClearAll => {
                if ask("Remove every saved device?")? {
                    draft.registry.clear_all();
                }
            }
            DevicesChoice::Back => return Ok(()),
        }
    }
}

fn edit_device(draft: &mut Draft, device: &SavedDevice) -> Result<(), CliError> {
    let prompt = format!("Device '{}'", device.name);
    match choose(&prompt, &device_menu(device), DeviceAction::Back)? {
        DeviceAction::EditAddress => {
            let address = input_required("Address (host:port)", Some(&device.address))?;
            draft.registry.set_address(&device.name, address);
        }
        DeviceAction::ToggleAutoconnect => {
            draft
                .registry
                .set_autoconnect(&device.name, !device.autoconnect);
        }
        DeviceAction::Delete => {
            draft.registry.remove_by_name(&device.name);
        }
        DeviceAction::Back => {}
    }
    Ok(())
}
