//! Optional RON config file for the CLI.
//!
//! ```ron
//! (
//!     base_url: "http://raspberrypi.local:8000",
//!     request_timeout_secs: 20,
//!     concurrency_limit: 2,
//! )
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use encore_engine::{ApiSettings, EngineConfig};
use engine_logging::{engine_info, engine_warn};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILENAME: &str = "encore.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// File layout; missing fields take the [`EngineConfig::default`] values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    base_url: String,
    connect_timeout_secs: u64,
    request_timeout_secs: u64,
    max_bytes: u64,
    concurrency_limit: usize,
    featured_tour: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        let defaults = EngineConfig::default();
        Self {
            base_url: defaults.api.base_url,
            connect_timeout_secs: defaults.api.connect_timeout.as_secs(),
            request_timeout_secs: defaults.api.request_timeout.as_secs(),
            max_bytes: defaults.api.max_bytes,
            concurrency_limit: defaults.concurrency_limit,
            featured_tour: defaults.featured_tour,
        }
    }
}

impl From<FileConfig> for EngineConfig {
    fn from(file: FileConfig) -> Self {
        Self {
            api: ApiSettings {
                base_url: file.base_url,
                connect_timeout: Duration::from_secs(file.connect_timeout_secs),
                request_timeout: Duration::from_secs(file.request_timeout_secs),
                max_bytes: file.max_bytes,
            },
            concurrency_limit: file.concurrency_limit,
            featured_tour: file.featured_tour,
        }
    }
}

/// Values given on the command line; they win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub concurrency_limit: Option<usize>,
}

/// Loads `path` (or `./encore.ron`), applies CLI overrides and validates.
///
/// A missing file is not an error; a file that exists but does not parse is.
pub fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<EngineConfig, ConfigError> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME));

    let mut config = match fs::read_to_string(&path) {
        Ok(text) => {
            let file: FileConfig =
                ron::from_str(&text).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?;
            engine_info!("loaded config from {:?}", path);
            EngineConfig::from(file)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            engine_warn!("no config at {:?}; using defaults", path);
            EngineConfig::default()
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    if let Some(base_url) = overrides.base_url {
        config.api.base_url = base_url;
    }
    if let Some(limit) = overrides.concurrency_limit {
        config.concurrency_limit = limit;
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.concurrency_limit == 0 {
        return Err(ConfigError::Invalid(
            "concurrency_limit must be at least 1".to_string(),
        ));
    }
    if config.api.connect_timeout.is_zero() {
        return Err(ConfigError::Invalid(
            "connect_timeout_secs must be at least 1".to_string(),
        ));
    }
    if config.api.request_timeout.is_zero() {
        return Err(ConfigError::Invalid(
            "request_timeout_secs must be at least 1".to_string(),
        ));
    }
    Ok(())
}
