// wrfconf/src/lib.rs

pub mod apply;
pub mod cli;
pub mod datetime;
pub mod error;
pub mod loader;
pub mod merge;
pub mod tree;

pub use apply::apply_tree;
pub use datetime::{parse_lead, parse_time, sub_date, ForecastTimes};
pub use error::{ConfigError, Result};
pub use loader::{load, ConfigFormat, ConfigLoader};
pub use merge::{merge, parse_cli_value, parse_flags};
pub use tree::{ConfigTree, ConfigValue};
