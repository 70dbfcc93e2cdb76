// wrfnml/src/namelist/mod.rs

//! Namelist document model and its text serializer.

pub mod core;
pub mod formatting;

pub use self::core::{normalize_section, NamelistDocument};
pub use self::formatting::{to_text, WriteOptions};
