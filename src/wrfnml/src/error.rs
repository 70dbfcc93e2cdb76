// wrfnml/src/error.rs

//! Error types for namelist parsing, expansion and mutation.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for namelist operations.
pub type Result<T> = std::result::Result<T, NamelistError>;

/// Errors raised while resolving `${NAME}` / `%(NAME)` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// A `%(NAME)` placeholder named a sub-tree or sequence.
    #[error("cannot substitute non-scalar variable '{name}' into a string")]
    NonScalar { name: String },

    /// A placeholder resolved, directly or transitively, back to itself.
    #[error("expansion cycle detected: {}", chain.join(" -> "))]
    Cycle { chain: Vec<String> },
}

/// Errors raised by the namelist model's update API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// A new key was written without naming the section it belongs to.
    #[error("'{key}' is not in the namelist and no section was given for it")]
    MissingSection { key: String },
}

/// Errors that can occur when reading, parsing or writing a namelist.
#[derive(Debug, Error)]
pub enum NamelistError {
    /// I/O error when reading or writing files
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A `key = value` line appeared before any `&section` header
    #[error("line {line}: '{key}' is assigned before any section is declared")]
    NoSection { line: usize, key: String },

    /// Malformed section header or key/value line
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A `{...}` literal map value without its closing brace
    #[error("line {line}: unterminated literal map in the value of '{key}'")]
    UnterminatedMap { line: usize, key: String },

    /// File already exists (when force=false)
    #[error("file already exists: {}", .0.display())]
    FileAlreadyExists(PathBuf),

    #[error(transparent)]
    Expand(#[from] ExpandError),

    #[error(transparent)]
    Value(#[from] ValueError),
}

impl NamelistError {
    /// Create a new syntax error.
    pub fn syntax<S: Into<String>>(line: usize, message: S) -> Self {
        NamelistError::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Line number the error refers to, when it came from the parser.
    pub fn line(&self) -> Option<usize> {
        match self {
            NamelistError::NoSection { line, .. }
            | NamelistError::Syntax { line, .. }
            | NamelistError::UnterminatedMap { line, .. } => Some(*line),
            _ => None,
        }
    }
}
