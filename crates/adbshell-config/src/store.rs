// ── Flat config file ──
//
// One `key=value` per line. Known flags first in declared order, then
// unrecognized keys as they were read, then one `saved_device` record
// per device. Record fields are joined with `/!/` and percent-encoded
// so a field can never contain the separator.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use adbshell_core::{ConfigFlags, FlagKey, SavedDevice, parse_flag_value};

use crate::ConfigError;

const DEVICE_KEY: &str = "saved_device";
const FIELD_SEPARATOR: &str = "/!/";

/// Bytes escaped inside a record field.
const FIELD: &AsciiSet = &CONTROLS.add(b'%').add(b'!');

/// Parsed contents of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    pub flags: ConfigFlags,
    /// In file order. Duplicate names are resolved by the registry.
    pub devices: Vec<SavedDevice>,
}

// ── Load ─────────────────────────────────────────────────────────────

/// Read the config file, writing defaults first if it does not exist.
///
/// Bad lines are skipped; only I/O failures abort the load.
pub fn load(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file missing, writing defaults");
            let doc = ConfigDocument::default();
            save(path, &doc.flags, &doc.devices)?;
            return Ok(doc);
        }
        Err(e) => return Err(e.into()),
    };
    Ok(parse(&text))
}

fn parse(text: &str) -> ConfigDocument {
    let mut doc = ConfigDocument::default();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            debug!(line = line_no, "ignoring line without '='");
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if key == DEVICE_KEY {
            match decode_record(value) {
                Some(device) => doc.devices.push(device),
                None => warn!(line = line_no, "skipping malformed saved device record"),
            }
        } else if let Ok(flag) = key.parse::<FlagKey>() {
            match parse_flag_value(value) {
                Some(enabled) => doc.flags.set(flag, enabled),
                None => warn!(line = line_no, flag = %flag, value, "ignoring non-boolean flag value"),
            }
        } else {
            doc.flags.preserve_unknown(key, value);
        }
    }

    doc
}

fn decode_record(value: &str) -> Option<SavedDevice> {
    let fields: Vec<&str> = value.split(FIELD_SEPARATOR).collect();
    let (name, address, autoconnect) = match fields.as_slice() {
        [name, address] => (*name, *address, false),
        [name, address, flag] => (*name, *address, parse_flag_value(flag)?),
        _ => return None,
    };
    let name = decode_field(name);
    let address = decode_field(address);
    if name.trim().is_empty() || address.trim().is_empty() {
        return None;
    }
    Some(SavedDevice::new(name, address, autoconnect))
}

fn decode_field(field: &str) -> String {
    percent_decode_str(field).decode_utf8_lossy().into_owned()
}

// ── Save ─────────────────────────────────────────────────────────────

/// Serialize flags and devices to the on-disk text form.
pub fn render(flags: &ConfigFlags, devices: &[SavedDevice]) -> String {
    let mut out = String::new();
    for (key, value) in flags.known() {
        let _ = writeln!(out, "{key}={value}");
    }
    for (key, value) in flags.unknown() {
        let _ = writeln!(out, "{key}={value}");
    }
    for device in devices {
        let _ = writeln!(
            out,
            "{DEVICE_KEY}={}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
            utf8_percent_encode(&device.name, FIELD),
            utf8_percent_encode(&device.address, FIELD),
            device.autoconnect,
        );
    }
    out
}

/// Rewrite the whole file. The new contents land in a sibling temp file
/// which is then renamed over `path`, so readers never see a torn write.
pub fn save(path: &Path, flags: &ConfigFlags, devices: &[SavedDevice]) -> Result<(), ConfigError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(render(flags, devices).as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| ConfigError::Io(e.error))?;

    debug!(path = %path.display(), devices = devices.len(), "config saved");
    Ok(())
}
