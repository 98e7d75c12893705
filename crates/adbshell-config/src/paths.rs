// ── Home directory layout ──

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::ConfigError;

const CONFIG_FILE: &str = "adbshell.conf";
const OPTIONS_FILE: &str = "adbshell.toml";

/// Everything adbshell reads or writes lives under one home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    home: PathBuf,
}

impl AppPaths {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Explicit home if given, else the platform data dir, else `./`.
    pub fn resolve(home: Option<PathBuf>) -> Self {
        let home = home.unwrap_or_else(|| {
            ProjectDirs::from("com", "adbshell", "adbshell")
                .map_or_else(|| PathBuf::from("."), |dirs| dirs.data_dir().to_path_buf())
        });
        Self { home }
    }

    /// Create the home directory if it does not exist yet.
    pub fn ensure_home(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.home)?;
        Ok(())
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config_file(&self) -> PathBuf {
        self.home.join(CONFIG_FILE)
    }

    pub fn options_file(&self) -> PathBuf {
        self.home.join(OPTIONS_FILE)
    }

    /// adb shipped next to the shell, checked before `PATH`.
    pub fn bundled_adb(&self) -> PathBuf {
        self.home
            .join("adb")
            .join(format!("adb{}", std::env::consts::EXE_SUFFIX))
    }

    /// Source directory for `installapp`.
    pub fn apks_dir(&self) -> PathBuf {
        self.home.join("apks")
    }

    pub fn mods_dir(&self) -> PathBuf {
        self.home.join("mods")
    }

    pub fn presence_executable(&self) -> PathBuf {
        self.mods_dir()
            .join("rich_presence")
            .join(format!("presence{}", std::env::consts::EXE_SUFFIX))
    }
}
