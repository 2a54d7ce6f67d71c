use log::{LevelFilter, debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, RwLock};

use crate::props::ViewerProps;
use crate::viewer::Platform;

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "pdfbridge";

/// Verbosity of the log file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub log_level: LogLevel,

    /// Platform to emulate when none is given on the command line
    #[serde(default)]
    pub platform: Platform,

    #[serde(default)]
    pub default_props: ViewerProps,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            log_level: LogLevel::default(),
            platform: Platform::default(),
            default_props: ViewerProps::default(),
        }
    }
}

static SETTINGS: LazyLock<RwLock<Settings>> = LazyLock::new(|| RwLock::new(Settings::default()));

pub fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

pub fn load_settings() {
    let Some(path) = preferred_config_path() else {
        warn!("Could not determine config directory, using default settings");
        return;
    };
    if path.exists() {
        load_settings_from_path(&path);
    } else {
        info!("Settings file not found, creating with defaults at {path:?}");
        if let Ok(settings) = SETTINGS.read() {
            save_settings_to_file(&settings, &path);
        }
    }
}

/// Load settings from `path` into the global settings.
///
/// Unreadable or malformed files are logged and leave the current settings
/// untouched. Returns whether the file was applied.
pub fn load_settings_from_path(path: &Path) -> bool {
    match fs::read_to_string(path) {
        Ok(content) => match serde_yaml::from_str::<Settings>(&content) {
            Ok(mut settings) => {
                debug!("Loaded settings from {path:?}");

                if settings.version < CURRENT_VERSION {
                    migrate_settings(&mut settings);
                    save_settings_to_file(&settings, path);
                }

                if let Ok(mut global) = SETTINGS.write() {
                    *global = settings;
                }
                true
            }
            Err(e) => {
                error!("Failed to parse settings file {path:?}: {e}");
                false
            }
        },
        Err(e) => {
            error!("Failed to read settings file {path:?}: {e}");
            false
        }
    }
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );

    settings.version = CURRENT_VERSION;
}

fn save_settings_to_file(settings: &Settings, path: &Path) {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory {parent:?}: {e}");
                return;
            }
        }
    }

    let body = match serde_yaml::to_string(settings) {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to serialize settings: {e}");
            return;
        }
    };
    let content = format!("{SETTINGS_HEADER}{body}");

    match fs::write(path, content) {
        Ok(()) => debug!("Saved settings to {path:?}"),
        Err(e) => error!("Failed to save settings to {path:?}: {e}"),
    }
}

const SETTINGS_HEADER: &str = r#"# pdfbridge settings
#
# log_level: off | error | warn | info | debug | trace
# platform: android | ios | other
# default_props: options sent to the native surface when it attaches
#   fit_policy: width | height | both

"#;

// Public API for accessing settings

pub fn get_settings() -> Settings {
    SETTINGS.read().map(|s| s.clone()).unwrap_or_default()
}

pub fn get_log_level() -> LogLevel {
    SETTINGS.read().map(|s| s.log_level).unwrap_or_default()
}

pub fn get_platform() -> Platform {
    SETTINGS.read().map(|s| s.platform).unwrap_or_default()
}

pub fn get_default_props() -> ViewerProps {
    SETTINGS
        .read()
        .map(|s| s.default_props.clone())
        .unwrap_or_default()
}

pub fn reset_settings() {
    if let Ok(mut settings) = SETTINGS.write() {
        *settings = Settings::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn loads_partial_file_over_defaults() {
        reset_settings();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "version: 1\nlog_level: debug\nplatform: ios\ndefault_props:\n  horizontal: true\n",
        )
        .unwrap();

        assert!(load_settings_from_path(&path));
        assert_eq!(get_log_level(), LogLevel::Debug);
        assert_eq!(get_platform(), Platform::Ios);
        let props = get_default_props();
        assert!(props.horizontal);
        assert_eq!(props.max_scale, 3.0);
        reset_settings();
    }

    #[test]
    #[serial]
    fn malformed_file_keeps_current_settings() {
        reset_settings();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "log_level: [not, a, level]\n").unwrap();

        assert!(!load_settings_from_path(&path));
        assert_eq!(get_settings(), Settings::default());
    }

    #[test]
    #[serial]
    fn old_version_is_migrated_and_rewritten() {
        reset_settings();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "version: 0\nplatform: other\n").unwrap();

        assert!(load_settings_from_path(&path));
        assert_eq!(get_settings().version, CURRENT_VERSION);
        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.starts_with("# pdfbridge settings"));
        assert!(rewritten.contains("version: 1"));
        reset_settings();
    }

    #[test]
    fn missing_file_is_not_applied() {
        let dir = TempDir::new().unwrap();
        assert!(!load_settings_from_path(&dir.path().join("absent.yaml")));
    }
}
