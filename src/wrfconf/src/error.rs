// wrfconf/src/error.rs

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use wrfnml::{ExpandError, NamelistError};

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: unrecognized configuration format (expected .json, .yaml or .yml)", path.display())]
    UnknownFormat { path: PathBuf },

    #[error("error parsing {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid include {}: {reason}", path.display())]
    InvalidInclude { path: PathBuf, reason: String },

    #[error("include cycle: {}", chain.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(" -> "))]
    IncludeCycle { chain: Vec<PathBuf> },

    #[error(transparent)]
    Expand(#[from] ExpandError),

    #[error("invalid flag '{0}': expected --key or --key=value")]
    InvalidFlag(String),

    #[error("invalid time '{value}': {reason}")]
    InvalidTime { value: String, reason: String },

    #[error(transparent)]
    Namelist(#[from] NamelistError),
}

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        ConfigError::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
