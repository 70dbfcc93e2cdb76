// wrfconf/src/merge.rs

//! Command-line flags and their merge with a loaded configuration tree.

use crate::error::{ConfigError, Result};
use crate::tree::{ConfigTree, ConfigValue};

/// Turn pass-through tokens into a tree.
///
/// `--key=value` yields a string (or a sequence/map for `[...]`/`{...}`),
/// a bare `--key` yields `true`. Leading dashes are stripped and a later
/// flag overrides an earlier one.
pub fn parse_flags<I, S>(args: I) -> Result<ConfigTree>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut flags = ConfigTree::new();
    for arg in args {
        let arg = arg.as_ref();
        let Some(stripped) = arg.strip_prefix('-') else {
            return Err(ConfigError::InvalidFlag(arg.to_string()));
        };
        let stripped = stripped.trim_start_matches('-');
        let (key, value) = match stripped.split_once('=') {
            Some((key, raw)) => (key, parse_cli_value(raw)),
            None => (stripped, ConfigValue::Bool(true)),
        };
        if key.is_empty() {
            return Err(ConfigError::InvalidFlag(arg.to_string()));
        }
        flags.set(key, value);
    }
    Ok(flags)
}

/// Command-line values are strings unless they look like a list or map literal.
pub fn parse_cli_value(raw: &str) -> ConfigValue {
    let trimmed = raw.trim();
    let is_literal = (trimmed.starts_with('[') && trimmed.ends_with(']'))
        || (trimmed.starts_with('{') && trimmed.ends_with('}'));
    if is_literal {
        if let Ok(parsed) = serde_yaml::from_str::<serde_yaml::Value>(trimmed) {
            return ConfigValue::from_yaml(parsed);
        }
    }
    ConfigValue::Str(raw.to_string())
}

/// Combine command-line values with file values.
///
/// A truthy command-line value wins; otherwise the file value is used.
/// Command-line keys come first, in their order, then file-only keys.
pub fn merge(cli: &ConfigTree, file: &ConfigTree) -> ConfigTree {
    let mut merged = ConfigTree::new();

    for (key, value) in cli.iter() {
        let chosen = match file.get(key) {
            Some(from_file) if !value.is_truthy() => from_file,
            _ => value,
        };
        merged.set(key, chosen.clone());
    }

    for (key, value) in file.iter() {
        if !cli.contains_key(key) {
            merged.set(key, value.clone());
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(pairs: Vec<(&str, ConfigValue)>) -> ConfigTree {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_parse_flags() {
        let flags = parse_flags(["--start=2013-06-14", "--dry-run", "-v", "--domains=[1, 2]"]).unwrap();
        assert_eq!(flags.get("start"), Some(&ConfigValue::from("2013-06-14")));
        assert_eq!(flags.get("dry-run"), Some(&ConfigValue::Bool(true)));
        assert_eq!(flags.get("v"), Some(&ConfigValue::Bool(true)));
        assert_eq!(
            flags.get("domains"),
            Some(&ConfigValue::List(vec![ConfigValue::Int(1), ConfigValue::Int(2)]))
        );
    }

    #[test]
    fn test_parse_flags_rejects_positionals() {
        assert!(matches!(
            parse_flags(["--a=1", "stray"]),
            Err(ConfigError::InvalidFlag(f)) if f == "stray"
        ));
        assert!(parse_flags(["--=x"]).is_err());
    }

    #[test]
    fn test_parse_cli_value() {
        assert_eq!(parse_cli_value("5"), ConfigValue::from("5"));
        assert_eq!(parse_cli_value("[unclosed"), ConfigValue::from("[unclosed"));
        let map = parse_cli_value("{a: 1, b: x}");
        let map = map.as_tree().unwrap();
        assert_eq!(map.get("a"), Some(&ConfigValue::Int(1)));
        assert_eq!(map.get("b"), Some(&ConfigValue::from("x")));
    }

    #[test]
    fn test_truthy_cli_value_wins() {
        let cli = tree(vec![("model", ConfigValue::from("GFS"))]);
        let file = tree(vec![("model", ConfigValue::from("NAM"))]);
        assert_eq!(merge(&cli, &file).get("model"), Some(&ConfigValue::from("GFS")));
    }

    #[test]
    fn test_falsy_cli_value_falls_back_to_file() {
        for falsy in [
            ConfigValue::Null,
            ConfigValue::from(""),
            ConfigValue::from(false),
            ConfigValue::List(vec![]),
        ] {
            let cli = tree(vec![("model", falsy)]);
            let file = tree(vec![("model", ConfigValue::from("NAM"))]);
            assert_eq!(merge(&cli, &file).get("model"), Some(&ConfigValue::from("NAM")));
        }
    }

    #[test]
    fn test_merge_key_order_and_union() {
        let cli = tree(vec![("b", ConfigValue::from(1)), ("only_cli", ConfigValue::Null)]);
        let file = tree(vec![("a", ConfigValue::from(2)), ("b", ConfigValue::from(3))]);
        let merged = merge(&cli, &file);
        assert_eq!(merged.keys().collect::<Vec<_>>(), vec!["b", "only_cli", "a"]);
        assert_eq!(merged.get("b"), Some(&ConfigValue::Int(1)));
        assert_eq!(merged.get("only_cli"), Some(&ConfigValue::Null));
    }
}
