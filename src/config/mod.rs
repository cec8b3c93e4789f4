use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::connection::{ConnectionDefinition, ConnectionRegistry, RegistryError};
use crate::domain::simulation::{DriverOptions, Timing};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub open_delay_ms: u64,
    pub success_delay_ms: u64,
    pub close_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            open_delay_ms: 100,
            success_delay_ms: 2000,
            close_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Popup width in terminal cells
    pub width: u16,
    /// Popup height in terminal cells
    pub height: u16,
    pub blocked: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 56,
            height: 9,
            blocked: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log_level: Option<String>,

    #[serde(default)]
    pub events_path: Option<String>,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub surface: SurfaceConfig,

    #[serde(default)]
    pub connections: Vec<ConnectionDefinition>,
}

impl Config {
    /// Configured connections, or the built-in set when none are listed.
    pub fn registry(&self) -> Result<ConnectionRegistry, RegistryError> {
        if self.connections.is_empty() {
            return Ok(ConnectionRegistry::default());
        }
        ConnectionRegistry::new(self.connections.clone())
    }

    pub fn driver_options(&self) -> DriverOptions {
        DriverOptions {
            timing: Timing {
                open_delay: Duration::from_millis(self.timing.open_delay_ms),
                success_delay: Duration::from_millis(self.timing.success_delay_ms),
                close_delay: Duration::from_millis(self.timing.close_delay_ms),
            },
            surface_width: self.surface.width.max(20),
            surface_height: self.surface.height.max(5),
        }
    }

    pub fn events_path(&self) -> Option<PathBuf> {
        self.events_path.as_deref().and_then(expand_path)
    }
}

/// Load from `path`, or from the default location. A missing file is not an error.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let Some(path) = path.map(Path::to_path_buf).or_else(config_path) else {
        return Ok(Config::default());
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    toml::from_str::<Config>(&content).map_err(|source| ConfigError::Parse { path, source })
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("SOULBOARD_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("soulboard").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("soulboard").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "soulboard", "soulboard")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("soulboard"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("soulboard"));
    }
    directories::ProjectDirs::from("io", "soulboard", "soulboard")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn expand_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            return Some(home.join(rest));
        }
    }
    Some(PathBuf::from(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.timing, TimingConfig::default());
        assert_eq!(config.registry().unwrap().len(), 4);
        let options = config.driver_options();
        assert_eq!(options.timing, Timing::default());
        assert!(!config.surface.blocked);
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            log_level = "debug"
            events_path = "/tmp/soul.jsonl"

            [timing]
            open_delay_ms = 10
            success_delay_ms = 50

            [surface]
            blocked = true

            [[connections]]
            id = "github"
            name = "GitHub"
            soul_points = 40
            url = "https://github.com/login/oauth"
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.events_path(), Some(PathBuf::from("/tmp/soul.jsonl")));
        assert_eq!(config.timing.open_delay_ms, 10);
        assert_eq!(config.timing.close_delay_ms, 2000);
        assert!(config.surface.blocked);
        assert_eq!(config.surface.width, 56);

        let registry = config.registry().unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("github").map(|d| d.soul_points), Some(40));
    }

    #[test]
    fn test_duplicate_connections_rejected() {
        let config: Config = toml::from_str(
            r#"
            [[connections]]
            id = "a"
            name = "A"
            [[connections]]
            id = "a"
            name = "A again"
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.registry(),
            Err(RegistryError::DuplicateId(id)) if id == "a"
        ));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(config.connections.is_empty());
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "timing = 3").unwrap();
        assert!(matches!(load(Some(&path)), Err(ConfigError::Parse { .. })));
    }
}
