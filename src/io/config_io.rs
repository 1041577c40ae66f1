use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::config::BoardConfig;

pub const CONFIG_FILE: &str = "config.toml";

/// Error type for reading `config.toml`
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Read `<data_dir>/config.toml`. A missing file yields the defaults.
pub fn read_config(data_dir: &Path) -> Result<BoardConfig, ConfigError> {
    let path = data_dir.join(CONFIG_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BoardConfig::default()),
        Err(source) => return Err(ConfigError::ReadError { path, source }),
    };
    Ok(toml::from_str(&text)?)
}
