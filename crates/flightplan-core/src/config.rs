use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

pub const DEFAULT_API_BASE: &str = "https://flightplanbackendsa01.azurewebsites.net";
pub const API_BASE_ENV: &str = "FLIGHTPLAN_API_BASE";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub api_base: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Backend base address: env var first, then config file, then the default
    pub fn api_base(&self) -> String {
        let from_env = std::env::var(API_BASE_ENV).ok();
        Self::resolve_api_base(from_env.as_deref(), self.api_base.as_deref())
    }

    fn resolve_api_base(from_env: Option<&str>, from_file: Option<&str>) -> String {
        [from_env, from_file]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("flightplan").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            api_base: Some("http://localhost:7071".to_string()),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn api_base_resolution_order() {
        assert_eq!(Config::resolve_api_base(None, None), DEFAULT_API_BASE);
        assert_eq!(
            Config::resolve_api_base(None, Some("http://file:1/")),
            "http://file:1"
        );
        assert_eq!(
            Config::resolve_api_base(Some("http://env:2"), Some("http://file:1")),
            "http://env:2"
        );
        assert_eq!(
            Config::resolve_api_base(Some("  "), Some("http://file:1")),
            "http://file:1"
        );
    }
}
