// ── Runtime options ──
//
// Tunables that do not belong in the flat config file: reporter periods,
// how run success is judged, and the WSA port. Layered as defaults, then
// `adbshell.toml` in the home directory, then `ADBSHELL_*` env vars.

use std::path::Path;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use adbshell_core::{ReporterConfig, SuccessDetection, WSA_PORT};

use crate::ConfigError;

const ENV_KEYS: &[&str] = &[
    "probe_interval_secs",
    "heartbeat_interval_secs",
    "success_detection",
    "wsa_port",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuntimeOptions {
    /// Seconds between `adb devices` probes.
    #[serde(default = "default_interval")]
    pub probe_interval_secs: u64,

    /// Seconds between heartbeat writes.
    #[serde(default = "default_interval")]
    pub heartbeat_interval_secs: u64,

    #[serde(default)]
    pub success_detection: SuccessDetection,

    /// Port used by `wsaconnect` and the `wsa` keyword.
    #[serde(default = "default_wsa_port")]
    pub wsa_port: u16,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            probe_interval_secs: default_interval(),
            heartbeat_interval_secs: default_interval(),
            success_detection: SuccessDetection::default(),
            wsa_port: default_wsa_port(),
        }
    }
}

fn default_interval() -> u64 {
    10
}
fn default_wsa_port() -> u16 {
    WSA_PORT
}

/// Provider stack for runtime options rooted at `options_file`.
pub fn runtime_options_figment(options_file: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RuntimeOptions::default()))
        .merge(Toml::file(options_file))
        .merge(Env::prefixed("ADBSHELL_").only(ENV_KEYS))
}

impl RuntimeOptions {
    /// Load from the standard provider stack.
    pub fn load(options_file: &Path) -> Result<Self, ConfigError> {
        Self::extract(&runtime_options_figment(options_file))
    }

    /// Extract and validate from an arbitrary figment.
    pub fn extract(figment: &Figment) -> Result<Self, ConfigError> {
        let options: Self = figment.extract()?;
        options.validate()?;
        Ok(options)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("probe_interval_secs", self.probe_interval_secs),
            ("heartbeat_interval_secs", self.heartbeat_interval_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation {
                    field: field.into(),
                    reason: "must be at least 1 second".into(),
                });
            }
        }
        if self.wsa_port == 0 {
            return Err(ConfigError::Validation {
                field: "wsa_port".into(),
                reason: "must be a non-zero port".into(),
            });
        }
        Ok(())
    }

    pub fn reporter_config(&self) -> ReporterConfig {
        ReporterConfig {
            probe_interval: Duration::from_secs(self.probe_interval_secs),
            heartbeat_interval: Duration::from_secs(self.heartbeat_interval_secs),
        }
    }
}
