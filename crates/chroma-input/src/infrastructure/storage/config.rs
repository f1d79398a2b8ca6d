//! TOML-based configuration persistence for the input provider.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\ChromaInput\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/chroma-input/config.toml` (or `~/.config/…`)
//! - macOS:    `~/Library/Application Support/ChromaInput/config.toml`
//!
//! Example:
//!
//! ```toml
//! [provider]
//! log_level = "info"
//!
//! [focus]
//! poll_interval_ms = 500
//! release_on = ["Taskmgr", "Idle"]
//!
//! [motion]
//! max_publish_hz = 25
//!
//! [[devices]]
//! id = "0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0"
//! name = "Main keyboard"
//! device_type = "keyboard"
//! identifiers = ['\\?\HID#VID_1532&PID_0226&MI_00#8&1a2b3c4d&0&0000#{884b96c3-56ef-11d1-bc8c-00a0c91405dd}']
//! ```
//!
//! Every section and field is optional; missing values take the defaults
//! below, so an empty file behaves like no file at all.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chroma_input_core::{
    Device, DeviceIdentifier, InputDeviceType, DEFAULT_FOCUS_DENYLIST, DEFAULT_MAX_PUBLISH_HZ,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::application::dispatch_input::HubSettings;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub focus: FocusConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub devices: Vec<DeviceEntry>,
}

/// General provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// Schema version string – bump when breaking changes are introduced.
    #[serde(default = "default_version")]
    pub version: String,
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Focus-loss monitor settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FocusConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Process names (without `.exe`) that trigger a release-all on focus.
    #[serde(default = "default_release_on")]
    pub release_on: Vec<String>,
}

/// Mouse motion settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MotionConfig {
    /// `0` publishes on every movement record.
    #[serde(default = "default_max_publish_hz")]
    pub max_publish_hz: u32,
}

/// A configured device and the platform identifiers that map to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceEntry {
    pub id: Uuid,
    pub name: String,
    pub device_type: InputDeviceType,
    #[serde(default)]
    pub identifiers: Vec<String>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_version() -> String {
    "1.0".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_poll_interval_ms() -> u64 {
    500
}
fn default_release_on() -> Vec<String> {
    DEFAULT_FOCUS_DENYLIST.iter().map(|s| s.to_string()).collect()
}
fn default_max_publish_hz() -> u32 {
    DEFAULT_MAX_PUBLISH_HZ
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            log_level: default_log_level(),
        }
    }
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            release_on: default_release_on(),
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_publish_hz: default_max_publish_hz(),
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

impl AppConfig {
    /// Hub tunables derived from this config.
    ///
    /// A zero poll interval would spin the monitor thread, so it is raised to
    /// one millisecond.
    pub fn hub_settings(&self) -> HubSettings {
        HubSettings {
            focus_poll_interval: Duration::from_millis(self.focus.poll_interval_ms.max(1)),
            focus_denylist: self.focus.release_on.clone(),
            max_publish_hz: self.motion.max_publish_hz,
        }
    }

    /// Flattens `[[devices]]` into identifier → device bindings.
    ///
    /// Blank identifiers are skipped with a warning.
    pub fn device_bindings(&self) -> Vec<(DeviceIdentifier, Device)> {
        let mut bindings = Vec::new();
        for entry in &self.devices {
            let device = Device {
                id: entry.id,
                name: entry.name.clone(),
                device_type: entry.device_type,
            };
            for raw in &entry.identifiers {
                match DeviceIdentifier::new(raw.as_str()) {
                    Some(identifier) => bindings.push((identifier, device.clone())),
                    None => warn!("skipping blank identifier for device {}", entry.name),
                }
            }
        }
        bindings
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the platform config file, returning
/// `AppConfig::default()` if the file does not yet exist.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning the default if it does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Persists `config` to the platform config file.
///
/// # Errors
///
/// See [`save_config_to`].
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &config_file_path()?)
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config directory including the app subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("ChromaInput"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("chroma-input"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("ChromaInput")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn temp_config_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("chroma_input_test_{}", Uuid::new_v4()))
            .join("config.toml")
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_default_config_matches_documented_values() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.provider.log_level, "info");
        assert_eq!(cfg.focus.poll_interval_ms, 500);
        assert_eq!(cfg.focus.release_on, vec!["Taskmgr", "Idle"]);
        assert_eq!(cfg.motion.max_publish_hz, 25);
        assert!(cfg.devices.is_empty());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: AppConfig = assert_ok!(toml::from_str(""));
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        // Arrange
        let toml_str = r#"
[focus]
poll_interval_ms = 250
"#;

        // Act
        let cfg: AppConfig = assert_ok!(toml::from_str(toml_str));

        // Assert
        assert_eq!(cfg.focus.poll_interval_ms, 250);
        assert_eq!(cfg.focus.release_on, vec!["Taskmgr", "Idle"]);
        assert_eq!(cfg.motion.max_publish_hz, 25);
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        let result: Result<AppConfig, toml::de::Error> = toml::from_str("[[[ not valid toml");
        assert_err!(result);
    }

    // ── Devices ───────────────────────────────────────────────────────────────

    #[test]
    fn test_device_entries_parse_lowercase_device_type() {
        // Arrange
        let toml_str = r#"
[[devices]]
id = "0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0"
name = "Main mouse"
device_type = "mouse"
identifiers = ["mouse-path-a", "mouse-path-b"]
"#;

        // Act
        let cfg: AppConfig = assert_ok!(toml::from_str(toml_str));

        // Assert
        assert_eq!(cfg.devices.len(), 1);
        assert_eq!(cfg.devices[0].device_type, InputDeviceType::Mouse);
        assert_eq!(cfg.devices[0].identifiers.len(), 2);
    }

    #[test]
    fn test_unknown_device_type_is_rejected() {
        let toml_str = r#"
[[devices]]
id = "0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0"
name = "Pad"
device_type = "gamepad"
"#;
        let result: Result<AppConfig, toml::de::Error> = toml::from_str(toml_str);
        assert_err!(result);
    }

    #[test]
    fn test_device_bindings_flatten_and_skip_blank_identifiers() {
        // Arrange
        let id = Uuid::new_v4();
        let mut cfg = AppConfig::default();
        cfg.devices.push(DeviceEntry {
            id,
            name: "Keyboard".into(),
            device_type: InputDeviceType::Keyboard,
            identifiers: vec!["kbd-a".into(), "  ".into(), "kbd-b".into()],
        });

        // Act
        let bindings = cfg.device_bindings();

        // Assert
        let identifiers: Vec<&str> = bindings.iter().map(|(i, _)| i.as_str()).collect();
        assert_eq!(identifiers, vec!["kbd-a", "kbd-b"]);
        assert!(bindings.iter().all(|(_, d)| d.id == id));
    }

    // ── Hub settings ──────────────────────────────────────────────────────────

    #[test]
    fn test_hub_settings_follow_config() {
        let mut cfg = AppConfig::default();
        cfg.focus.poll_interval_ms = 200;
        cfg.focus.release_on = vec!["LockApp".into()];
        cfg.motion.max_publish_hz = 0;

        let settings = cfg.hub_settings();

        assert_eq!(settings.focus_poll_interval, Duration::from_millis(200));
        assert_eq!(settings.focus_denylist, vec!["LockApp".to_string()]);
        assert_eq!(settings.max_publish_hz, 0);
    }

    #[test]
    fn test_default_hub_settings_match_default_config() {
        assert_eq!(AppConfig::default().hub_settings(), HubSettings::default());
    }

    #[test]
    fn test_zero_poll_interval_is_raised() {
        let mut cfg = AppConfig::default();
        cfg.focus.poll_interval_ms = 0;

        assert_eq!(cfg.hub_settings().focus_poll_interval, Duration::from_millis(1));
    }

    // ── Load / save ───────────────────────────────────────────────────────────

    #[test]
    fn test_load_config_from_missing_file_returns_default() {
        let path = temp_config_path();

        let cfg = assert_ok!(load_config_from(&path));

        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_save_then_load_preserves_config() {
        // Arrange
        let path = temp_config_path();
        let mut cfg = AppConfig::default();
        cfg.provider.log_level = "debug".into();
        cfg.devices.push(DeviceEntry {
            id: Uuid::new_v4(),
            name: "Keyboard".into(),
            device_type: InputDeviceType::Keyboard,
            identifiers: vec![r"\\?\HID#VID_1532&PID_0226".into()],
        });

        // Act
        assert_ok!(save_config_to(&cfg, &path));
        let loaded = assert_ok!(load_config_from(&path));

        // Assert
        assert_eq!(loaded, cfg);

        // Cleanup
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_load_config_from_malformed_file_returns_parse_error() {
        let path = temp_config_path();
        let dir = path.parent().expect("parent").to_path_buf();
        std::fs::create_dir_all(&dir).expect("create temp dir");
        std::fs::write(&path, "[focus\npoll_interval_ms = ").expect("write");

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with("config.toml"), "got {path:?}");
        }
    }
}
