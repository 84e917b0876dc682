//! Persisted UI theme preference
//!
//! The theme is a single word (`dark` or `light`) in a small file under the
//! user's config directory. Reading never fails: a missing or unreadable
//! file falls back to the terminal's hint, then to the configured default.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Config;
use crate::error::{BugHiveError, Result};

const THEME_FILE: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    #[default]
    Light,
}

crate::enum_display_fromstr!(
    Theme,
    |value| BugHiveError::InvalidValue {
        field: "theme",
        value,
    },
    {
        Dark => "dark",
        Light => "light",
    }
);

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Guess the terminal's color scheme from `COLORFGBG` (`"fg;bg"`).
///
/// Background colors 0-6 and 8 are the dark half of the 16-color palette.
pub fn detect_os_theme() -> Option<Theme> {
    let value = env::var("COLORFGBG").ok()?;
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(if background < 7 || background == 8 {
        Theme::Dark
    } else {
        Theme::Light
    })
}

/// File-backed theme preference
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    /// Store keeping the preference in `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        ThemeStore {
            path: dir.as_ref().join(THEME_FILE),
        }
    }

    /// Store at `preferences_dir` from config, or the platform config dir
    pub fn from_config(config: &Config) -> Result<Self> {
        if let Some(dir) = &config.preferences_dir {
            return Ok(Self::in_dir(dir));
        }
        let dirs = directories::ProjectDirs::from("", "", "bughive").ok_or_else(|| {
            BugHiveError::Config("cannot determine a preferences directory".to_string())
        })?;
        Ok(Self::in_dir(dirs.config_dir()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The explicitly saved theme, if any
    pub fn stored(&self) -> Option<Theme> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable theme preference");
                return None;
            }
        };
        match content.parse() {
            Ok(theme) => Some(theme),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring invalid theme preference");
                None
            }
        }
    }

    /// Effective theme: stored, then terminal hint, then `fallback`
    pub fn load(&self, fallback: Option<Theme>) -> Theme {
        self.stored()
            .or_else(detect_os_theme)
            .or(fallback)
            .unwrap_or_default()
    }

    /// Replace the stored theme through a temp file in the same directory
    pub fn save(&self, theme: Theme) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(theme.as_str().as_bytes())?;
        temp.persist(&self.path).map_err(|e| BugHiveError::Io(e.error))?;
        Ok(())
    }

    /// Flip the effective theme and persist the result
    pub fn toggle(&self, fallback: Option<Theme>) -> Result<Theme> {
        let theme = self.load(fallback).toggled();
        self.save(theme)?;
        Ok(theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_toggle_persists() {
        unsafe { env::remove_var("COLORFGBG") };
        let dir = TempDir::new().unwrap();
        let store = ThemeStore::in_dir(dir.path().join("prefs"));

        assert_eq!(store.stored(), None);
        assert_eq!(store.load(None), Theme::Light);

        assert_eq!(store.toggle(None).unwrap(), Theme::Dark);
        assert_eq!(store.stored(), Some(Theme::Dark));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "dark");

        assert_eq!(store.toggle(None).unwrap(), Theme::Light);
    }

    #[test]
    #[serial]
    fn test_fallback_order() {
        let dir = TempDir::new().unwrap();
        let store = ThemeStore::in_dir(dir.path());

        unsafe { env::set_var("COLORFGBG", "15;0") };
        assert_eq!(store.load(Some(Theme::Light)), Theme::Dark);

        unsafe { env::remove_var("COLORFGBG") };
        assert_eq!(store.load(Some(Theme::Dark)), Theme::Dark);

        store.save(Theme::Light).unwrap();
        unsafe { env::set_var("COLORFGBG", "15;0") };
        assert_eq!(store.load(Some(Theme::Dark)), Theme::Light);
        unsafe { env::remove_var("COLORFGBG") };
    }

    #[test]
    #[serial]
    fn test_detect_os_theme() {
        unsafe { env::set_var("COLORFGBG", "0;15") };
        assert_eq!(detect_os_theme(), Some(Theme::Light));
        unsafe { env::set_var("COLORFGBG", "7;default;0") };
        assert_eq!(detect_os_theme(), Some(Theme::Dark));
        unsafe { env::set_var("COLORFGBG", "garbage") };
        assert_eq!(detect_os_theme(), None);
        unsafe { env::remove_var("COLORFGBG") };
    }

    #[test]
    fn test_invalid_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let store = ThemeStore::in_dir(dir.path());
        fs::write(store.path(), "sepia").unwrap();
        assert_eq!(store.stored(), None);
    }

    #[test]
    fn test_save_replaces_file_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let store = ThemeStore::in_dir(dir.path());
        fs::write(store.path(), "light-and-some-trailing-bytes").unwrap();

        store.save(Theme::Dark).unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "dark");
        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from(THEME_FILE)]);
    }

    #[test]
    fn test_parse_trims() {
        assert_eq!("dark\n".parse::<Theme>().unwrap(), Theme::Dark);
    }
}
