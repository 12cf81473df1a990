//! Settings infrastructure for lusp.
//!
//! This module provides support for loading and parsing `lusp.toml` files
//! to configure the parser locale and validation timing.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::lsp::{ValidationOptions, DEFAULT_DEBOUNCE, DEFAULT_LOCALE};

/// Name of the settings file.
pub const SETTINGS_FILE: &str = "lusp.toml";

/// Root settings structure loaded from lusp.toml.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Culture handed to the parser, e.g. `en-us`.
    pub locale: String,

    /// Validation timing.
    pub validation: ValidationSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            validation: ValidationSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Quiet period after the last change before validating, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl Settings {
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            delay: Duration::from_millis(self.validation.debounce_ms),
            locale: self.locale.clone(),
        }
    }
}

/// Load settings from a file, falling back to defaults.
pub fn load_settings(path: &Path) -> Settings {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("failed to parse {}: {}", path.display(), e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("failed to read {}: {}", path.display(), e);
            Settings::default()
        }
    }
}

/// Discover lusp.toml by searching up the directory tree, then direct children.
///
/// Search order:
/// 1. Walk up from `start_dir` to filesystem root
/// 2. If not found, check immediate child directories of `start_dir`
///
/// Returns `(settings, settings_dir)` where `settings_dir` is the directory
/// containing the found file. If not found, returns
/// `(Settings::default(), start_dir)`.
pub fn discover_settings(start_dir: &Path) -> (Settings, PathBuf) {
    let mut current = Some(start_dir);
    while let Some(dir) = current {
        let candidate = dir.join(SETTINGS_FILE);
        if candidate.is_file() {
            return (load_settings(&candidate), dir.to_path_buf());
        }
        current = dir.parent();
    }

    if let Ok(entries) = std::fs::read_dir(start_dir) {
        for entry in entries.flatten() {
            if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                let candidate = entry.path().join(SETTINGS_FILE);
                if candidate.is_file() {
                    return (load_settings(&candidate), entry.path());
                }
            }
        }
    }

    (Settings::default(), start_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a unique temporary directory for a test.
    fn make_test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("lusp-test")
            .join(name)
            .join(format!("{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup_test_dir(dir: &Path) {
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.locale, "en-us");
        assert_eq!(settings.validation.debounce_ms, 200);
        assert_eq!(settings.validation_options(), ValidationOptions::default());
    }

    #[test]
    fn parse_full_settings() {
        let settings: Settings = toml::from_str(
            r#"
locale = "fr-fr"

[validation]
debounce_ms = 50
"#,
        )
        .unwrap();
        let options = settings.validation_options();
        assert_eq!(options.locale, "fr-fr");
        assert_eq!(options.delay, Duration::from_millis(50));
    }

    #[test]
    fn missing_keys_use_defaults() {
        let settings: Settings = toml::from_str("[validation]\n").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let dir = make_test_dir("invalid");
        let path = dir.join(SETTINGS_FILE);
        std::fs::write(&path, "locale = [").unwrap();

        assert_eq!(load_settings(&path), Settings::default());

        cleanup_test_dir(&dir);
    }

    #[test]
    fn discover_settings_in_current_dir() {
        let dir = make_test_dir("discover-current");
        std::fs::write(dir.join(SETTINGS_FILE), "locale = \"de-de\"\n").unwrap();

        let (settings, settings_dir) = discover_settings(&dir);
        assert_eq!(settings_dir, dir);
        assert_eq!(settings.locale, "de-de");

        cleanup_test_dir(&dir);
    }

    #[test]
    fn discover_settings_in_parent_dir() {
        let parent = make_test_dir("discover-parent");
        let child = parent.join("subdir");
        std::fs::create_dir_all(&child).unwrap();
        std::fs::write(parent.join(SETTINGS_FILE), "[validation]\ndebounce_ms = 10\n").unwrap();

        let (settings, settings_dir) = discover_settings(&child);
        assert_eq!(settings_dir, parent);
        assert_eq!(settings.validation.debounce_ms, 10);

        cleanup_test_dir(&parent);
    }

    #[test]
    fn discover_settings_in_child_dir() {
        let parent = make_test_dir("discover-child");
        let child = parent.join("config");
        std::fs::create_dir_all(&child).unwrap();
        std::fs::write(child.join(SETTINGS_FILE), "locale = \"es-es\"\n").unwrap();

        let (settings, settings_dir) = discover_settings(&parent);
        assert_eq!(settings_dir, child);
        assert_eq!(settings.locale, "es-es");

        cleanup_test_dir(&parent);
    }

    #[test]
    fn discover_settings_not_found() {
        let dir = make_test_dir("discover-none");

        let (settings, settings_dir) = discover_settings(&dir);
        assert_eq!(settings_dir, dir);
        assert_eq!(settings, Settings::default());

        cleanup_test_dir(&dir);
    }
}
