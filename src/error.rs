//! Error types.
//!
//! `QueryError` is the only error the dependents search raises. Everything else (reading
//! the input, DOT syntax, configuration) happens before the search runs and is reported
//! as-is by the binary.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the reverse-dependency search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// No node's canonical name equals the requested package (exact, case-sensitive).
    #[error("{name} package is Not Found in your SBOM DOT File.")]
    NotFound { name: String },
}

/// Errors loading an explicitly requested configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
