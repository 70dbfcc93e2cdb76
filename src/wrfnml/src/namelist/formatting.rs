// wrfnml/src/namelist/formatting.rs

//! Namelist text output.

use super::core::NamelistDocument;
use std::fmt;

/// Options for controlling namelist output formatting.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Force overwrite existing files
    pub force: bool,
    /// Prefix written before every key
    pub indent: String,
    /// Fixed key column width; `None` pads to the widest key of each section
    pub key_width: Option<usize>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            force: false,
            indent: " ".to_string(),
            key_width: None,
        }
    }
}

impl WriteOptions {
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

impl NamelistDocument {
    /// Render the document as namelist text.
    ///
    /// One `&section` block per section in insertion order, keys in the order
    /// recorded for the section, every entry terminated by a comma, and each
    /// block closed by `/` and a blank line.
    pub fn to_text(&self, options: &WriteOptions) -> String {
        Rendered { doc: self, options }.to_string()
    }
}

/// A document paired with the options used to print it.
struct Rendered<'a> {
    doc: &'a NamelistDocument,
    options: &'a WriteOptions,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (section, keys) in self.doc.sections() {
            let width = self
                .options
                .key_width
                .unwrap_or_else(|| keys.iter().map(|k| k.len()).max().unwrap_or(0));

            writeln!(f, "&{}", section)?;
            for key in keys {
                if let Some(value) = self.doc.get(key) {
                    writeln!(
                        f,
                        "{}{:<width$} = {},",
                        self.options.indent,
                        key,
                        value.to_namelist_string(),
                        width = width
                    )?;
                }
            }
            f.write_str("/\n\n")?;
        }
        Ok(())
    }
}

impl fmt::Display for NamelistDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = WriteOptions::default();
        write!(f, "{}", Rendered { doc: self, options: &options })
    }
}

/// Render `doc` with default options.
pub fn to_text(doc: &NamelistDocument) -> String {
    doc.to_text(&WriteOptions::default())
}
