// ── Command dispatcher ──
//
// Classifies one line of input into a `ShellCommand`. Classification is
// stateless per line: the only inputs are the line, the current flags,
// and the dispatcher's fixed settings. Keywords match case-insensitively;
// arguments are forwarded with their original casing.

use crate::device_count::CountChange;
use crate::error::CoreError;
use crate::model::{ConfigFlags, FlagKey};
use crate::runner::{Interpreter, Invocation};

/// Default local port of the Windows Subsystem for Android adb daemon.
pub const WSA_PORT: u16 = 58526;

const SAVE_USAGE: &str = "Usage: save <address> --name <name> [--autoconnect]";

/// One classified line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Blank line.
    Empty,
    Exit,
    /// Open the settings editor.
    Config,
    About,
    Help,
    Clear,
    InstalledApps,
    AppPath { package: String },
    Connect { address: String },
    /// `None` disconnects every device.
    Disconnect { address: Option<String> },
    SaveDevice {
        name: String,
        address: String,
        autoconnect: bool,
    },
    RemoveSaved { name: String },
    ConnectSaved { name: String },
    DisconnectSaved { name: String },
    ListSaved,
    ClearSaved,
    SetAutoconnect { name: String, enabled: bool },
    /// `adb shell pm <args>`.
    PackageManager { args: Vec<String> },
    /// Install every APK from the apks directory.
    InstallApps,
    /// Raw adb arguments.
    Tool { args: Vec<String> },
    /// Forwarded verbatim to a host interpreter.
    System {
        interpreter: Interpreter,
        command: String,
    },
    /// Malformed arguments; the message is shown to the user.
    Usage(String),
}

impl ShellCommand {
    /// The invocation this command maps to when it needs no shell state
    /// (registry lookups, filesystem scans) to build one.
    pub fn direct_invocation(&self) -> Option<Invocation> {
        match self {
            Self::InstalledApps => Some(Invocation::tool(["shell", "pm", "list", "packages"])),
            Self::AppPath { package } => {
                Some(Invocation::tool(["shell", "pm", "path", package.as_str()]))
            }
            Self::Connect { address } => Some(Invocation::tool(["connect", address.as_str()])),
            Self::Disconnect { address } => Some(match address {
                Some(address) => Invocation::tool(["disconnect", address.as_str()]),
                None => Invocation::tool(["disconnect"]),
            }),
            Self::PackageManager { args } => Some(Invocation::Tool(
                ["shell", "pm"]
                    .into_iter()
                    .map(str::to_owned)
                    .chain(args.iter().cloned())
                    .collect(),
            )),
            Self::Tool { args } => Some(Invocation::Tool(args.clone())),
            Self::System {
                interpreter,
                command,
            } => Some(Invocation::System {
                interpreter: *interpreter,
                command: command.clone(),
            }),
            _ => None,
        }
    }

    /// How a successful run of this command moves the device count.
    pub fn count_change(&self) -> Option<CountChange> {
        match self {
            Self::Connect { .. } | Self::ConnectSaved { .. } => Some(CountChange::Connected),
            Self::Disconnect { address: Some(_) } | Self::DisconnectSaved { .. } => {
                Some(CountChange::Disconnected)
            }
            Self::Disconnect { address: None } => Some(CountChange::DisconnectedAll),
            _ => None,
        }
    }
}

/// Line classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatcher {
    wsa_port: u16,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(WSA_PORT)
    }
}

impl Dispatcher {
    pub fn new(wsa_port: u16) -> Self {
        Self { wsa_port }
    }

    pub fn wsa_port(&self) -> u16 {
        self.wsa_port
    }

    /// Classify a line. Tested in priority order: always-available
    /// built-ins, flag-gated convenience commands, connect-shaped
    /// commands, passthrough prefixes, then the adb fallback.
    pub fn classify(&self, line: &str, flags: &ConfigFlags) -> ShellCommand {
        let line = line.trim();
        if line.is_empty() {
            return ShellCommand::Empty;
        }

        let (keyword, rest) = split_keyword(line);
        let keyword = keyword.to_ascii_lowercase();

        if rest.is_empty() {
            match keyword.as_str() {
                "exit" => return ShellCommand::Exit,
                "config" => return ShellCommand::Config,
                "about" => return ShellCommand::About,
                _ => {}
            }
        }

        if flags.get(FlagKey::CustomCommands) {
            if let Some(cmd) = self.classify_custom(&keyword, rest) {
                return cmd;
            }
        }

        if let Some(cmd) = classify_connection(&keyword, rest) {
            return cmd;
        }

        match keyword.as_str() {
            "adb" => {
                let (sub, sub_rest) = split_keyword(rest);
                if let Some(cmd) = classify_connection(&sub.to_ascii_lowercase(), sub_rest) {
                    return cmd;
                }
                tool(rest)
            }
            "cmd" => system(Interpreter::Cmd, rest),
            "powershell" | "pwrsh" => system(Interpreter::PowerShell, rest),
            _ => tool(line),
        }
    }

    fn classify_custom(&self, keyword: &str, rest: &str) -> Option<ShellCommand> {
        let cmd = match (keyword, rest.is_empty()) {
            ("help", true) => ShellCommand::Help,
            ("clear" | "cls", true) => ShellCommand::Clear,
            ("installedapps", true) => ShellCommand::InstalledApps,
            ("wsaconnect", true) => self.local_connect(true),
            ("wsadisconnect", true) => self.local_connect(false),
            ("listsaved", true) => ShellCommand::ListSaved,
            ("clearsaved", true) => ShellCommand::ClearSaved,
            ("installapp", true) => ShellCommand::InstallApps,
            ("apppath", true) => ShellCommand::Usage("Please provide a package name.".into()),
            ("apppath", false) => ShellCommand::AppPath {
                package: rest.to_owned(),
            },
            ("localconnect", _) => self.local_port(rest, true),
            ("localdisconnect", _) => self.local_port(rest, false),
            ("connect", false) if rest.eq_ignore_ascii_case("wsa") => self.local_connect(true),
            ("disconnect", false) if rest.eq_ignore_ascii_case("wsa") => {
                self.local_connect(false)
            }
            ("save", _) => parse_save(rest),
            ("removesaved" | "connectsaved" | "disconnectsaved", true) => {
                ShellCommand::Usage("Please provide the name of a saved device.".into())
            }
            ("removesaved", false) => ShellCommand::RemoveSaved { name: rest.to_owned() },
            ("connectsaved", false) => ShellCommand::ConnectSaved { name: rest.to_owned() },
            ("disconnectsaved", false) => ShellCommand::DisconnectSaved { name: rest.to_owned() },
            ("autoconnect", _) => parse_autoconnect(rest),
            ("shpm", true) => ShellCommand::Usage("Please provide package manager arguments.".into()),
            ("shpm", false) => match split_args(rest) {
                Ok(args) => ShellCommand::PackageManager { args },
                Err(e) => ShellCommand::Usage(e.to_string()),
            },
            _ => return None,
        };
        Some(cmd)
    }

    fn local_port(&self, rest: &str, connect: bool) -> ShellCommand {
        if rest.eq_ignore_ascii_case("wsa") {
            return self.local_connect(connect);
        }
        match rest.parse::<u16>() {
            Ok(port) if port > 0 => local_address(port, connect),
            _ => ShellCommand::Usage("Please provide a valid port number.".into()),
        }
    }

    fn local_connect(&self, connect: bool) -> ShellCommand {
        local_address(self.wsa_port, connect)
    }
}

fn local_address(port: u16, connect: bool) -> ShellCommand {
    let address = format!("localhost:{port}");
    if connect {
        ShellCommand::Connect { address }
    } else {
        ShellCommand::Disconnect {
            address: Some(address),
        }
    }
}

/// `connect <addr>` / `disconnect [<addr>]`, shared by the bare and
/// `adb`-prefixed forms. Anything with extra arguments falls through.
fn classify_connection(keyword: &str, rest: &str) -> Option<ShellCommand> {
    let mut words = rest.split_whitespace();
    let first = words.next();
    if words.next().is_some() {
        return None;
    }
    match (keyword, first) {
        ("connect", Some(address)) => Some(ShellCommand::Connect {
            address: address.to_owned(),
        }),
        ("disconnect", address) => Some(ShellCommand::Disconnect {
            address: address.map(str::to_owned),
        }),
        _ => None,
    }
}

fn tool(args: &str) -> ShellCommand {
    match split_args(args) {
        Ok(args) => ShellCommand::Tool { args },
        Err(e) => ShellCommand::Usage(e.to_string()),
    }
}

fn system(interpreter: Interpreter, command: &str) -> ShellCommand {
    if command.is_empty() {
        return ShellCommand::Usage("Please provide a command to run.".into());
    }
    ShellCommand::System {
        interpreter,
        command: command.to_owned(),
    }
}

fn parse_save(rest: &str) -> ShellCommand {
    let tokens = match split_args(rest) {
        Ok(tokens) => tokens,
        Err(e) => return ShellCommand::Usage(e.to_string()),
    };

    let mut address = None;
    let mut name_parts: Vec<String> = Vec::new();
    let mut autoconnect = false;
    let mut in_name = false;

    for token in tokens {
        if token.eq_ignore_ascii_case("--name") {
            in_name = true;
        } else if token.eq_ignore_ascii_case("--autoconnect") {
            autoconnect = true;
            in_name = false;
        } else if in_name {
            name_parts.push(token);
        } else if address.is_none() {
            address = Some(token);
        } else {
            return ShellCommand::Usage(SAVE_USAGE.into());
        }
    }

    match address {
        Some(address) if !name_parts.is_empty() => ShellCommand::SaveDevice {
            name: name_parts.join(" "),
            address,
            autoconnect,
        },
        _ => ShellCommand::Usage(SAVE_USAGE.into()),
    }
}

fn parse_autoconnect(rest: &str) -> ShellCommand {
    let usage = || ShellCommand::Usage("Usage: autoconnect <name> <on|off>".into());
    let Some((name, state)) = rest.rsplit_once(char::is_whitespace) else {
        return usage();
    };
    let enabled = match state.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => true,
        "off" | "false" | "no" => false,
        _ => return usage(),
    };
    let name = name.trim();
    if name.is_empty() {
        return usage();
    }
    ShellCommand::SetAutoconnect {
        name: name.to_owned(),
        enabled,
    }
}

/// Split arguments on whitespace. Single and double quotes group words
/// and are removed; backslashes are ordinary characters so Windows paths
/// reach adb unchanged.
fn split_args(line: &str) -> Result<Vec<String>, CoreError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(CoreError::InvalidArguments {
            message: format!("missing closing {q}"),
        });
    }
    if in_word {
        args.push(current);
    }
    Ok(args)
}

/// Split off the first whitespace-delimited word. The remainder is
/// trimmed at its start only.
fn split_keyword(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim_start()),
        None => (line, ""),
    }
}
