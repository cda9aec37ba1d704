use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParleyError {
    #[error("Config error in {path}: {source}")]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Nothing to ask: the query is empty")]
    EmptyQuery,
}
