use crate::documents::SortKey;
use crate::theme::Theme;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DATABASE_FILE: &str = "markpad.db";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Serde(serde_json::Error),
    ProjectDir,
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "config io error: {err}"),
            Self::Serde(err) => write!(f, "invalid config: {err}"),
            Self::ProjectDir => write!(f, "could not resolve a home directory"),
        }
    }
}

impl std::error::Error for ConfigError {}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default = "default_debounce_ms")]
    pub autosave_debounce_ms: u64,
    #[serde(default)]
    pub default_sort: SortKey,
    #[serde(default)]
    pub default_theme: Theme,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            autosave_debounce_ms: DEFAULT_DEBOUNCE_MS,
            default_sort: SortKey::default(),
            default_theme: Theme::default(),
        }
    }
}

impl AppConfig {
    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    /// Explicit `data_dir` wins, otherwise the platform data directory.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = self.data_dir.as_deref() {
            return Ok(PathBuf::from(dir).join(DATABASE_FILE));
        }
        let project_dirs = project_dirs()?;
        Ok(project_dirs.data_dir().join(DATABASE_FILE))
    }
}

fn project_dirs() -> Result<ProjectDirs, ConfigError> {
    ProjectDirs::from("app", "markpad", "Markpad").ok_or(ConfigError::ProjectDir)
}

pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn default_store() -> Result<Self, ConfigError> {
        let project_dirs = project_dirs()?;
        let config_dir = project_dirs.config_dir();
        Ok(Self::new(config_dir.join("config.json")))
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.config_path.exists() {
            return Ok(AppConfig::default());
        }
        let raw = fs::read_to_string(&self.config_path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_defaults_when_missing_file() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().join("config.json"));

        let config = store.load().expect("load config");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.autosave_debounce(), Duration::from_millis(500));
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().join("nested").join("config.json"));
        let config = AppConfig {
            data_dir: Some("/tmp/markpad".to_string()),
            autosave_debounce_ms: 250,
            default_sort: SortKey::Title,
            default_theme: Theme::Dark,
        };

        store.save(&config).expect("save");
        assert_eq!(store.load().expect("load"), config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "default_sort": "title" }"#).expect("write");

        let config = ConfigStore::new(path).load().expect("load");
        assert_eq!(config.default_sort, SortKey::Title);
        assert_eq!(config.autosave_debounce_ms, DEFAULT_DEBOUNCE_MS);
        assert_eq!(config.default_theme, Theme::Light);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").expect("write");

        let error = ConfigStore::new(path).load().err();
        assert!(matches!(error, Some(ConfigError::Serde(_))));
    }

    #[test]
    fn explicit_data_dir_sets_database_path() {
        let config = AppConfig {
            data_dir: Some("/data/notes".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(
            config.database_path().expect("path"),
            PathBuf::from("/data/notes").join("markpad.db")
        );
    }
}
