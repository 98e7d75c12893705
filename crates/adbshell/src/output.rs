//! Console output: banner, prompt, help text and the saved-device table.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use adbshell_core::SavedDevice;

const RULE: &str = "--------------------------------------------";

// ── Color helpers ────────────────────────────────────────────────────

/// Color only when stdout is a terminal and `NO_COLOR` is unset.
pub fn should_color() -> bool {
    io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

pub fn prompt(color: bool) -> String {
    if color {
        format!("{}", "adbshell:".green().bold())
    } else {
        "adbshell:".to_owned()
    }
}

/// Inline error line for the interactive loop.
pub fn error_line(message: impl std::fmt::Display, color: bool) {
    if color {
        eprintln!("{} {message}", "Error:".red().bold());
    } else {
        eprintln!("Error: {message}");
    }
}

pub fn status_line(message: impl std::fmt::Display, color: bool) {
    if color {
        println!("{}", message.cyan());
    } else {
        println!("{message}");
    }
}

// ── Fixed text ───────────────────────────────────────────────────────

pub fn banner(color: bool) -> String {
    let title = format!("Welcome to adbshell! (v{})", env!("CARGO_PKG_VERSION"));
    let title = if color {
        title.bold().to_string()
    } else {
        title
    };
    format!(
        "{title}\n\
         Type 'help' for a list of shell-specific commands or type standard adb commands\n\
         directly without the adb prefix.\n\
         {RULE}"
    )
}

pub fn rule() -> &'static str {
    RULE
}

const HELP_ENTRIES: &[(&str, &str)] = &[
    ("exit", "Exit the shell"),
    ("config", "Open the settings editor"),
    ("about", "Show version, paths and connection status"),
    ("clear", "Clear the console"),
    ("help", "Show this help message"),
    ("installedapps", "List installed apps on the connected device"),
    ("apppath <package>", "Show the path to an app's apk"),
    ("installapp", "Install every .apk in the apks folder"),
    ("shpm <args>", "Run the package manager (adb shell pm <args>)"),
    ("localconnect <port|wsa>", "Connect to a local adb port"),
    ("localdisconnect <port|wsa>", "Disconnect from a local adb port"),
    ("wsaconnect", "Connect to the local WSA adb port"),
    ("wsadisconnect", "Disconnect from the local WSA adb port"),
    (
        "save <address> --name <name> [--autoconnect]",
        "Save a device",
    ),
    ("listsaved", "List saved devices"),
    ("connectsaved <name>", "Connect to a saved device"),
    ("disconnectsaved <name>", "Disconnect from a saved device"),
    ("removesaved <name>", "Forget a saved device"),
    ("autoconnect <name> <on|off>", "Connect a saved device at startup"),
    ("clearsaved", "Forget every saved device"),
    ("cmd <command>", "Run a command in the host shell"),
    ("powershell <command>", "Run a command in PowerShell (alias: pwrsh)"),
    ("<adb command>", "Anything else runs as an adb command"),
];

pub fn help_text(wsa_port: u16) -> String {
    let width = HELP_ENTRIES.iter().map(|(cmd, _)| cmd.len()).max().unwrap_or(0);
    let mut out = String::from("Available commands:\n");
    for (cmd, description) in HELP_ENTRIES {
        out.push_str(&format!("  {cmd:<width$}  {description}\n"));
    }
    out.push_str(&format!("\nThe WSA port is {wsa_port}."));
    out
}

// ── Saved devices ────────────────────────────────────────────────────

#[derive(Tabled)]
struct SavedDeviceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Autoconnect")]
    autoconnect: &'static str,
}

impl From<&SavedDevice> for SavedDeviceRow {
    fn from(device: &SavedDevice) -> Self {
        Self {
            name: device.name.clone(),
            address: device.address.clone(),
            autoconnect: if device.autoconnect { "yes" } else { "no" },
        }
    }
}

pub fn saved_devices_table(devices: &[SavedDevice]) -> String {
    if devices.is_empty() {
        return "No saved devices. Add one with: save <address> --name <name>".to_owned();
    }
    let rows: Vec<SavedDeviceRow> = devices.iter().map(SavedDeviceRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Print rendered output to stdout.
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lists_every_device() {
        let devices = vec![
            SavedDevice::new("phone", "192.168.1.20:5555", false),
            SavedDevice::new("tablet", "10.0.0.7:5555", true),
        ];
        let table = saved_devices_table(&devices);
        assert!(table.contains("phone"));
        assert!(table.contains("10.0.0.7:5555"));
        assert!(table.contains("yes"));
    }

    #[test]
    fn empty_registry_gets_a_hint() {
        assert!(saved_devices_table(&[]).starts_with("No saved devices"));
    }

    #[test]
    fn help_mentions_every_saved_device_command() {
        let help = help_text(58526);
        for cmd in ["listsaved", "connectsaved", "removesaved", "clearsaved", "autoconnect"] {
            assert!(help.contains(cmd), "help is missing {cmd}");
        }
        assert!(help.contains("58526"));
    }

    #[test]
    fn plain_prompt_has_no_escape_codes() {
        assert_eq!(prompt(false), "adbshell:");
    }
}
