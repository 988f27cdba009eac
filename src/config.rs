use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration loaded from `~/.secure-cam.toml`
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Recording behavior
    pub recording: RecordingConfig,
    /// Telemetry and crash logging
    pub telemetry: TelemetryConfig,
}

/// Recording behavior settings
#[derive(Debug, Deserialize, Clone)]
pub struct RecordingConfig {
    /// Start a fresh capture session whenever the previous recording finishes
    pub restart_on_finish: bool,
}

/// Telemetry settings
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    /// Enable file-based logging
    pub enabled: bool,
    /// Log file path (supports ~ expansion)
    pub log_path: String,
}

impl Config {
    /// Load config from ~/.secure-cam.toml, creating it with defaults on first run
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default(&config_path).context("failed to create default config")?;
        }

        let contents = fs::read_to_string(&config_path).context("failed to read config file")?;

        let config: Self = toml::from_str(&contents).context("failed to parse config TOML")?;

        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".secure-cam.toml"))
    }

    fn create_default(path: &Path) -> Result<()> {
        fs::write(path, DEFAULT_CONFIG).context("failed to write default config")?;
        Ok(())
    }

    /// Expand ~ in paths to home directory
    ///
    /// # Errors
    /// Returns error if HOME is not set
    pub fn expand_path(path: &str) -> Result<PathBuf> {
        if let Some(stripped) = path.strip_prefix("~/") {
            let home = std::env::var("HOME").context("HOME environment variable not set")?;
            Ok(PathBuf::from(home).join(stripped))
        } else {
            Ok(PathBuf::from(path))
        }
    }
}

const DEFAULT_CONFIG: &str = r#"[recording]
restart_on_finish = true

[telemetry]
enabled = true
log_path = "~/.secure-cam/crash.log"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert!(config.recording.restart_on_finish);
        assert!(config.telemetry.enabled);
        assert_eq!(config.telemetry.log_path, "~/.secure-cam/crash.log");
    }

    #[test]
    fn test_restart_on_finish_can_be_disabled() {
        let toml = r#"
[recording]
restart_on_finish = false

[telemetry]
enabled = false
log_path = "/tmp/secure-cam.log"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.recording.restart_on_finish);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let home = std::env::var("HOME").expect("HOME not set");
        let result = Config::expand_path("~/recordings").unwrap();
        assert_eq!(result, PathBuf::from(home).join("recordings"));
    }

    #[test]
    fn test_expand_path_absolute() {
        let result = Config::expand_path("/var/log/secure-cam.log").unwrap();
        assert_eq!(result, PathBuf::from("/var/log/secure-cam.log"));
    }
}
