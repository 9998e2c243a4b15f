use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

pub const CONFIG_FILENAME: &str = "vidjob.ron";
pub const CONFIG_PATH_ENV: &str = "VIDJOB_CONFIG";
pub const API_BASE_ENV: &str = "VIDJOB_API_BASE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Host settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base: String,
    pub download_dir: PathBuf,
    /// Holds `session.ron` and the log file.
    pub state_dir: PathBuf,
    pub jobs_per_page: u32,
    pub dashboard_jobs: u32,
    pub log_destination: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080/api".to_string(),
            download_dir: PathBuf::from("downloads"),
            state_dir: default_state_dir(),
            jobs_per_page: vidjob_core::JOBS_PER_PAGE,
            dashboard_jobs: vidjob_core::DASHBOARD_JOBS,
            log_destination: LogDestination::File,
        }
    }
}

impl AppConfig {
    /// Loads `$VIDJOB_CONFIG` (or `./vidjob.ron`) and applies environment
    /// overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
        let config = Self::load_from(&path)?;
        Ok(config.with_api_base_override(std::env::var(API_BASE_ENV).ok()))
    }

    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let mut config: Self = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.jobs_per_page = config.jobs_per_page.max(1);
        config.dashboard_jobs = config.dashboard_jobs.max(1);
        Ok(config)
    }

    pub fn with_api_base_override(mut self, api_base: Option<String>) -> Self {
        if let Some(api_base) = api_base.filter(|value| !value.trim().is_empty()) {
            self.api_base = api_base.trim().to_string();
        }
        self
    }
}

fn default_state_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .map(|dir| dir.join("vidjob"))
        .unwrap_or_else(|| PathBuf::from(".vidjob"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load_from(&temp.path().join("absent.ron")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api_base, "http://localhost:8080/api");
        assert_eq!(config.jobs_per_page, 10);
        assert_eq!(config.dashboard_jobs, 5);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"(api_base: "https://frames.example/api", jobs_per_page: 0, log_destination: Both)"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.api_base, "https://frames.example/api");
        assert_eq!(config.jobs_per_page, 1);
        assert_eq!(config.dashboard_jobs, 5);
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.download_dir, PathBuf::from("downloads"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "(api_base: ").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn environment_override_replaces_api_base() {
        let config = AppConfig::default()
            .with_api_base_override(Some(" http://10.0.0.2:8080/api ".to_string()));
        assert_eq!(config.api_base, "http://10.0.0.2:8080/api");

        let unchanged = AppConfig::default().with_api_base_override(Some("  ".to_string()));
        assert_eq!(unchanged.api_base, "http://localhost:8080/api");
    }
}
