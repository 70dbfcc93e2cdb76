// wrfnml/src/lib.rs

//! Reading, editing and writing the namelist files consumed by WRF and WPS.
//!
//! This library provides functionality to:
//! - Parse `&section key = value, ... /` text into an ordered [`NamelistDocument`]
//! - Expand `${ENV}` and `%(key)` placeholders while parsing
//! - Update, insert and remove settings while keeping section membership consistent
//! - Write the document back out in the layout the model executables expect

pub mod diagnostics;
pub mod error;
pub mod expand;
pub mod namelist;
pub mod parser;
pub mod value;

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{ExpandError, NamelistError, Result, ValueError};
pub use expand::{expand, process_env, Env, Expander, Lookup, Scope};
pub use namelist::{normalize_section, to_text, NamelistDocument, WriteOptions};
pub use parser::Parser;
pub use value::{HyphenPolicy, Scalar, Value};

/// Parse a namelist from a file path, expanding `${NAME}` from the process environment.
///
/// # Examples
///
/// ```no_run
/// fn main() -> Result<(), wrfnml::NamelistError> {
///     let nml = wrfnml::read("namelist.input")?;
///     println!("{}", nml);
///     Ok(())
/// }
/// ```
pub fn read<P: AsRef<Path>>(path: P) -> Result<NamelistDocument> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Parser::from_process_env().parse(&contents)
}

/// Parse a namelist from a string with an empty environment.
///
/// # Examples
///
/// ```
/// fn main() -> Result<(), wrfnml::NamelistError> {
///     let nml = wrfnml::reads("&domains\n max_dom = 2\n")?;
///     assert_eq!(nml.get("max_dom"), Some(&wrfnml::Value::from(2)));
///     Ok(())
/// }
/// ```
pub fn reads(content: &str) -> Result<NamelistDocument> {
    Parser::default().parse(content)
}

/// Parse a namelist from a string, expanding `${NAME}` from `env`.
pub fn reads_with_env(content: &str, env: &Env) -> Result<NamelistDocument> {
    Parser::new(env.clone()).parse(content)
}

/// Write a namelist to a file.
pub fn write<P: AsRef<Path>>(nml: &NamelistDocument, path: P) -> Result<()> {
    write_with_options(nml, path, &WriteOptions::default())
}

/// Write a namelist to a file with specific options.
pub fn write_with_options<P: AsRef<Path>>(
    nml: &NamelistDocument,
    path: P,
    options: &WriteOptions,
) -> Result<()> {
    let path = path.as_ref();

    if !options.force && path.exists() {
        return Err(NamelistError::FileAlreadyExists(path.to_path_buf()));
    }

    let mut file = File::create(path)?;
    write_to_writer(nml, &mut file, options)
}

/// Write a namelist to any writer implementing the Write trait.
pub fn write_to_writer<W: Write>(
    nml: &NamelistDocument,
    writer: &mut W,
    options: &WriteOptions,
) -> Result<()> {
    writer.write_all(nml.to_text(options).as_bytes())?;
    Ok(())
}

#[cfg(feature = "json")]
/// Convert a namelist to a JSON string.
pub fn to_json(nml: &NamelistDocument) -> std::result::Result<String, serde_json::Error> {
    serde_json::to_string_pretty(nml)
}
