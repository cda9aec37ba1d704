use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ParleyError;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_TITLE: &str = "Instalily Case Study";
pub const BASE_URL_ENV: &str = "PARLEY_BASE_URL";

#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub base_url: Option<String>,
    pub title: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// Effective settings after layering CLI, environment and config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub title: String,
    pub log_file: PathBuf,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("parley").join("config.toml"))
}

fn default_log_file() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("parley")
        .join("parley.log")
}

/// Loads the config file. A missing file yields the defaults.
pub fn load_config() -> Result<Config, ParleyError> {
    let Some(path) = config_path() else {
        return Ok(Config::default());
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<Config, ParleyError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(e.into()),
    };

    toml::from_str(&content).map_err(|source| ParleyError::Config {
        path: path.to_path_buf(),
        source,
    })
}

impl Settings {
    /// Precedence: CLI flag, then environment, then config file, then default.
    /// Empty values count as unset.
    pub fn resolve(
        config: Config,
        cli_base_url: Option<String>,
        env_base_url: Option<String>,
    ) -> Self {
        let base_url = [cli_base_url, env_base_url, config.base_url]
            .into_iter()
            .flatten()
            .find(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let title = config
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let log_file = config.log_file.unwrap_or_else(default_log_file);

        Self {
            base_url,
            title,
            log_file,
        }
    }
}
