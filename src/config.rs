use std::path::Path;

use serde::Deserialize;

use crate::cli::OutputFormat;
use crate::error::ConfigError;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "sbom-rdeps.toml";

/// Root node of RPM SBOM graphs; it depends on every package and is never reported.
pub const DEFAULT_ROOT_SENTINEL: &str = "RPM-Packages";

/// Configuration loaded from `sbom-rdeps.toml`.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct RdepsConfig {
    /// Synthetic root node to exclude. Unset means `RPM-Packages`; empty disables exclusion.
    pub root_sentinel: Option<String>,
    /// Default depth bound when `--depth` is not given.
    pub max_depth: Option<i64>,
    /// Default output format when `--format` is not given.
    pub format: Option<OutputFormat>,
}

impl RdepsConfig {
    /// Load configuration from `sbom-rdeps.toml` in the given directory.
    ///
    /// Returns a default (empty) configuration if the file does not exist or cannot be parsed.
    pub fn load(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Self::default();
        }

        match Self::load_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                let cause = std::error::Error::source(&err)
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                tracing::warn!("{err}: {cause}. Using defaults.");
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit path. Unlike [`RdepsConfig::load`], a missing or
    /// malformed file is an error.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str::<Self>(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Effective root sentinel name, or `None` when exclusion is disabled.
    pub fn root_sentinel(&self) -> Option<&str> {
        match self.root_sentinel.as_deref() {
            None => Some(DEFAULT_ROOT_SENTINEL),
            Some("") => None,
            Some(name) => Some(name),
        }
    }
}
