//! Configuration errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot encode configuration: {0}")]
    Encode(#[from] toml::ser::Error),

    /// A `TOXCLIENT_*` variable holds a value of the wrong type
    #[error("{var}={value:?}: {reason}")]
    InvalidVar {
        var: String,
        value: String,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    ValidationFailed(String),
}
