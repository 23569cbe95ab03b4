// ABOUTME: Configuration loading for lucidia.
// ABOUTME: Reads ~/.lucidia/config.toml, falling back to defaults for anything missing.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub screenshot: ScreenshotConfig,
}

/// Diagnostic log configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Screen capture configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScreenshotConfig {
    /// Explicit capture program and leading arguments. The output path is
    /// appended as the final argument.
    pub command: Option<Vec<String>>,
}

impl Config {
    /// Load config from ~/.lucidia/config.toml, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path, falling back to defaults if it is absent.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".lucidia")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert!(config.screenshot.command.is_none());
    }

    #[test]
    fn parse_config_toml() {
        let toml_str = r#"
[logging]
level = "debug"

[screenshot]
command = ["scrot", "--silent"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.screenshot.command,
            Some(vec!["scrot".to_string(), "--silent".to_string()])
        );
    }

    #[test]
    fn parse_partial_config_uses_defaults() {
        let toml_str = r#"
[screenshot]
command = ["grim"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.screenshot.command, Some(vec!["grim".to_string()]));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_from(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn malformed_file_is_a_startup_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[logging\nlevel = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"), "{err:#}");
    }

    #[test]
    fn wrong_field_type_is_a_startup_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[screenshot]\ncommand = \"grim\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn config_path_ends_with_lucidia_dir() {
        let path = Config::config_path();
        assert!(path.ends_with(".lucidia/config.toml"));
    }
}
