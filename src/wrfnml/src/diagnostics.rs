// wrfnml/src/diagnostics.rs

//! Notes recorded while resolving settings.
//!
//! Parsers and loaders own a [`Diagnostics`] value and hand it back to the
//! caller, who decides whether to forward it to a logger with [`Diagnostics::emit`].

use log::Level;
use std::fmt;

/// A single recorded note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Ordered collection of notes produced by one parse or load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a note at the given level.
    pub fn push<S: Into<String>>(&mut self, level: Level, message: S) {
        self.entries.push(Diagnostic {
            level,
            message: message.into(),
        });
    }

    pub fn debug<S: Into<String>>(&mut self, message: S) {
        self.push(Level::Debug, message);
    }

    pub fn warn<S: Into<String>>(&mut self, message: S) {
        self.push(Level::Warn, message);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Notes at `Warn` or more severe.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.level <= Level::Warn)
    }

    /// Move the notes of `other` to the end of this collection.
    pub fn append(&mut self, other: &mut Diagnostics) {
        self.entries.append(&mut other.entries);
    }

    /// Forward every note to the `log` facade under `target`.
    pub fn emit(&self, target: &str) {
        for entry in &self.entries {
            log::log!(target: target, entry.level, "{}", entry.message);
        }
    }
}
