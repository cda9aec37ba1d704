use std::path::Path;
use std::sync::Mutex;

use crate::error::ParleyError;

/// Sends tracing output to `path`. The terminal belongs to the chat surface.
pub fn init(path: &Path) -> Result<(), ParleyError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| ParleyError::LogFile {
            path: path.to_path_buf(),
            source,
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley_tool=info,parley_core=info,parley_client=info".into()),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();

    Ok(())
}
