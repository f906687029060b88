//! Configuration management for ShowDesk daemon.
//!
//! Configuration is loaded from TOML files in the following locations (in order):
//! 1. `%APPDATA%/showdesk/config.toml` (Windows standard)
//! 2. `~/.config/showdesk/config.toml` (Unix-style, for WSL compatibility)
//! 3. `./config.toml` (current directory, for development)

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure for ShowDesk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hotkey bindings.
    pub hotkeys: HotkeyConfig,
    /// Behavior configuration.
    pub behavior: BehaviorConfig,
}

/// Hotkey bindings configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    /// The toggle hotkey, e.g. `"win+alt+d"` or `"ctrl+shift+f12"`.
    /// Modifiers are win/ctrl/alt/shift plus exactly one key.
    #[serde(default = "default_toggle_hotkey")]
    pub toggle: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            toggle: default_toggle_hotkey(),
        }
    }
}

/// Behavior-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether the originally topmost window receives focus after a
    /// restore.
    #[serde(default = "default_false")]
    pub focus_after_restore: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            focus_after_restore: false,
        }
    }
}

// Default value functions for serde
fn default_toggle_hotkey() -> String {
    "win+alt+d".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_false() -> bool {
    false
}

/// A non-fatal configuration problem, logged at startup.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
}

impl Config {
    /// Load configuration from standard locations.
    ///
    /// Tries the following locations in order:
    /// 1. `%APPDATA%/showdesk/config.toml`
    /// 2. `~/.config/showdesk/config.toml`
    /// 3. `./config.toml`
    ///
    /// Returns default config if no file is found.
    pub fn load() -> Result<Self> {
        let paths = config_paths();

        for path in &paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Check the configuration for problems worth warning about. Invalid
    /// values fall back to defaults at the point of use.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if showdesk_platform_win32::parse_hotkey_string(&self.hotkeys.toggle).is_none() {
            warnings.push(ConfigWarning {
                field: "hotkeys.toggle".to_string(),
                message: format!(
                    "'{}' is not a valid hotkey; the default '{}' will be used",
                    self.hotkeys.toggle,
                    default_toggle_hotkey()
                ),
            });
        }

        const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.behavior.log_level.to_lowercase().as_str()) {
            warnings.push(ConfigWarning {
                field: "behavior.log_level".to_string(),
                message: format!(
                    "'{}' is not a log level; 'info' will be used",
                    self.behavior.log_level
                ),
            });
        }

        warnings
    }

    /// The hotkey string to register, falling back to the default when the
    /// configured one does not parse.
    pub fn effective_toggle_hotkey(&self) -> String {
        if showdesk_platform_win32::parse_hotkey_string(&self.hotkeys.toggle).is_some() {
            self.hotkeys.toggle.clone()
        } else {
            default_toggle_hotkey()
        }
    }
}

/// Get all possible config file paths in priority order.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Windows standard: %APPDATA%/showdesk/config.toml
    if let Some(proj_dirs) = ProjectDirs::from("com", "showdesk", "showdesk") {
        paths.push(proj_dirs.config_dir().join("config.toml"));
    }

    // 2. Unix-style: ~/.config/showdesk/config.toml
    if let Some(home) = dirs_home() {
        paths.push(home.join(".config").join("showdesk").join("config.toml"));
    }

    // 3. Current directory: ./config.toml
    paths.push(PathBuf::from("config.toml"));

    paths
}

/// The path "Open Config" points the user at: the first existing config
/// file, or the standard location when none exists yet.
pub fn preferred_config_path() -> Option<PathBuf> {
    let paths = config_paths();
    paths
        .iter()
        .find(|p| p.exists())
        .cloned()
        .or_else(|| paths.into_iter().next())
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.hotkeys.toggle, "win+alt+d");
        assert_eq!(config.behavior.log_level, "info");
        assert!(!config.behavior.focus_after_restore);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.hotkeys.toggle, config.hotkeys.toggle);
        assert_eq!(parsed.behavior.log_level, config.behavior.log_level);
    }

    #[test]
    fn test_config_partial_parse() {
        // Config with only some fields should use defaults for the rest
        let toml_str = r#"
            [hotkeys]
            toggle = "win+grave"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.hotkeys.toggle, "win+grave");
        assert_eq!(config.behavior.log_level, "info"); // default
    }

    #[test]
    fn test_behavior_parse() {
        let toml_str = r#"
            [behavior]
            log_level = "debug"
            focus_after_restore = true
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.behavior.log_level, "debug");
        assert!(config.behavior.focus_after_restore);
    }

    #[test]
    fn test_validate_default_is_clean() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn test_validate_flags_bad_hotkey() {
        let mut config = Config::default();
        config.hotkeys.toggle = "win+".to_string();
        let warnings = config.validate();
        assert!(warnings.iter().any(|w| w.field == "hotkeys.toggle"));
        // The effective hotkey falls back to the default.
        assert_eq!(config.effective_toggle_hotkey(), "win+alt+d");
    }

    #[test]
    fn test_validate_flags_bad_log_level() {
        let mut config = Config::default();
        config.behavior.log_level = "loud".to_string();
        let warnings = config.validate();
        assert!(warnings.iter().any(|w| w.field == "behavior.log_level"));
    }

    #[test]
    fn test_effective_hotkey_passes_valid_value_through() {
        let mut config = Config::default();
        config.hotkeys.toggle = "ctrl+shift+f5".to_string();
        assert_eq!(config.effective_toggle_hotkey(), "ctrl+shift+f5");
    }

    #[test]
    fn test_config_paths_not_empty() {
        let paths = config_paths();
        assert!(!paths.is_empty());
        assert!(paths
            .last()
            .unwrap()
            .to_str()
            .unwrap()
            .ends_with("config.toml"));
    }
}
