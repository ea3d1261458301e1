//! Server configuration.

use anyhow::Result;
use scoopdeck_core::{default_interpreter, default_scoop_root, ScoopPaths};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_interpreter")]
    pub interpreter_path: PathBuf,
    #[serde(default = "default_scoop_root")]
    pub scoop_root: PathBuf,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8765
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("./frontend/dist")
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scoopdeck")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            interpreter_path: default_interpreter(),
            scoop_root: default_scoop_root(),
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Load config from a specific file path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from default location (config/default.toml) or fall back to defaults.
    pub fn load() -> Result<Self> {
        let config_path = PathBuf::from("config/default.toml");
        if config_path.exists() {
            return Self::load_from(&config_path);
        }

        Ok(Config::default())
    }

    /// Interpreter and Scoop root used to build command lines.
    pub fn scoop_paths(&self) -> ScoopPaths {
        ScoopPaths::new(&self.interpreter_path, &self.scoop_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scoopdeck.toml");
        std::fs::write(&path, "port = 9000\nscoop_root = 'D:/scoop'\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.scoop_root, PathBuf::from("D:/scoop"));
        assert!(config.interpreter_path.ends_with("powershell.exe"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scoopdeck.toml");
        std::fs::write(&path, "port = 'not a number'").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_scoop_paths() {
        let config = Config {
            interpreter_path: PathBuf::from("pwsh"),
            scoop_root: PathBuf::from("/scoop"),
            ..Config::default()
        };
        let paths = config.scoop_paths();
        assert_eq!(paths.interpreter, PathBuf::from("pwsh"));
        assert!(paths.scoop_script().ends_with("scoop.ps1"));
    }
}
