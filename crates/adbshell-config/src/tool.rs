// ── adb discovery ──

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{AppPaths, ConfigError};

/// Find the adb executable.
///
/// An explicit path is authoritative: if it does not exist the search
/// stops there. Otherwise the bundled copy under the home directory is
/// preferred over whatever `adb` is on `PATH`.
pub fn locate_adb(explicit: Option<&Path>, paths: &AppPaths) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(ConfigError::AdbNotFound {
            searched: vec![path.to_path_buf()],
        });
    }

    let bundled = paths.bundled_adb();
    if bundled.is_file() {
        debug!(path = %bundled.display(), "using bundled adb");
        return Ok(bundled);
    }

    match which::which("adb") {
        Ok(found) => {
            debug!(path = %found.display(), "using adb from PATH");
            Ok(found)
        }
        Err(e) => {
            debug!(error = %e, "adb not on PATH");
            Err(ConfigError::AdbNotFound {
                searched: vec![bundled, PathBuf::from("adb (PATH)")],
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn explicit_missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(dir.path());
        let missing = dir.path().join("no-such-adb");

        let err = locate_adb(Some(&missing), &paths).unwrap_err();
        assert!(matches!(err, ConfigError::AdbNotFound { ref searched } if searched == &[missing.clone()]));
    }

    #[test]
    fn explicit_existing_path_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(dir.path());
        let adb = dir.path().join("my-adb");
        std::fs::write(&adb, "").unwrap();

        assert_eq!(locate_adb(Some(&adb), &paths).unwrap(), adb);
    }

    #[test]
    fn bundled_copy_beats_path() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(dir.path());
        let bundled = paths.bundled_adb();
        std::fs::create_dir_all(bundled.parent().unwrap()).unwrap();
        std::fs::write(&bundled, "").unwrap();

        assert_eq!(locate_adb(None, &paths).unwrap(), bundled);
    }
}
