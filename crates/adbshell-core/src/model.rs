// ── Domain model ──
//
// Feature flags and saved-device bookmarks. Persistence lives in
// adbshell-config; these types never touch disk.

use indexmap::IndexMap;
use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

// ── Flags ────────────────────────────────────────────────────────────

/// A known feature flag. Iteration order is the declared serialization order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr, EnumIter, EnumString,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum FlagKey {
    CustomCommands,
    PresenceReporting,
    Mods,
}

impl FlagKey {
    pub fn default_value(self) -> bool {
        match self {
            Self::CustomCommands | Self::PresenceReporting | Self::Mods => true,
        }
    }

    /// Human-readable label for the settings editor.
    pub fn label(self) -> &'static str {
        match self {
            Self::CustomCommands => "Enable custom commands",
            Self::PresenceReporting => "Enable presence reporting",
            Self::Mods => "Enable mods",
        }
    }
}

/// Parse a flag value. Accepts the usual boolean spellings, case-insensitive.
pub fn parse_flag_value(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Boolean feature flags, plus any unrecognized `key=value` pairs that
/// must survive a rewrite untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    custom_commands: bool,
    presence_reporting: bool,
    mods: bool,
    unknown: IndexMap<String, String>,
}

impl Default for ConfigFlags {
    fn default() -> Self {
        Self {
            custom_commands: FlagKey::CustomCommands.default_value(),
            presence_reporting: FlagKey::PresenceReporting.default_value(),
            mods: FlagKey::Mods.default_value(),
            unknown: IndexMap::new(),
        }
    }
}

impl ConfigFlags {
    pub fn get(&self, key: FlagKey) -> bool {
        match key {
            FlagKey::CustomCommands => self.custom_commands,
            FlagKey::PresenceReporting => self.presence_reporting,
            FlagKey::Mods => self.mods,
        }
    }

    pub fn set(&mut self, key: FlagKey, value: bool) {
        match key {
            FlagKey::CustomCommands => self.custom_commands = value,
            FlagKey::PresenceReporting => self.presence_reporting = value,
            FlagKey::Mods => self.mods = value,
        }
    }

    /// Flip a flag and return its new value.
    pub fn toggle(&mut self, key: FlagKey) -> bool {
        let value = !self.get(key);
        self.set(key, value);
        value
    }

    /// Known flags in declared order.
    pub fn known(&self) -> impl Iterator<Item = (FlagKey, bool)> + '_ {
        FlagKey::iter().map(|key| (key, self.get(key)))
    }

    /// Keep an unrecognized entry verbatim. A repeated key keeps its first
    /// position and takes the latest value.
    pub fn preserve_unknown(&mut self, key: impl Into<String>, raw_value: impl Into<String>) {
        self.unknown.insert(key.into(), raw_value.into());
    }

    /// Unrecognized entries in the order they were first seen.
    pub fn unknown(&self) -> impl Iterator<Item = (&str, &str)> {
        self.unknown.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ── Saved devices ────────────────────────────────────────────────────

/// A bookmarked device address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedDevice {
    /// Unique, case-sensitive key.
    pub name: String,
    /// `host:port` passed to `adb connect`.
    pub address: String,
    /// Connect automatically when the shell starts.
    pub autoconnect: bool,
}

impl SavedDevice {
    pub fn new(name: impl Into<String>, address: impl Into<String>, autoconnect: bool) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            autoconnect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_keys_parse_case_insensitively() {
        assert_eq!("custom_commands".parse::<FlagKey>(), Ok(FlagKey::CustomCommands));
        assert_eq!("MODS".parse::<FlagKey>(), Ok(FlagKey::Mods));
        assert!("enable_everything".parse::<FlagKey>().is_err());
    }

    #[test]
    fn flag_keys_render_snake_case() {
        assert_eq!(FlagKey::PresenceReporting.as_ref(), "presence_reporting");
    }

    #[test]
    fn declared_order_is_stable() {
        let flags = ConfigFlags::default();
        let keys: Vec<_> = flags.known().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![FlagKey::CustomCommands, FlagKey::PresenceReporting, FlagKey::Mods]
        );
    }

    #[test]
    fn toggle_flips_and_reports_new_value() {
        let mut flags = ConfigFlags::default();
        assert!(!flags.toggle(FlagKey::Mods));
        assert!(!flags.get(FlagKey::Mods));
        assert!(flags.toggle(FlagKey::Mods));
    }

    #[test]
    fn flag_values_accept_common_spellings() {
        assert_eq!(parse_flag_value("True"), Some(true));
        assert_eq!(parse_flag_value(" 0 "), Some(false));
        assert_eq!(parse_flag_value("off"), Some(false));
        assert_eq!(parse_flag_value("maybe"), None);
    }

    #[test]
    fn unknown_entries_keep_first_position() {
        let mut flags = ConfigFlags::default();
        flags.preserve_unknown("theme", "dark");
        flags.preserve_unknown("lang", "en");
        flags.preserve_unknown("theme", "light");
        let unknown: Vec<_> = flags.unknown().collect();
        assert_eq!(unknown, vec![("theme", "light"), ("lang", "en")]);
    }
}
