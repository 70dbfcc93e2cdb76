// wrfconf/src/loader.rs

//! Loads JSON/YAML configuration files into a [`ConfigTree`].
//!
//! Loading happens in three steps:
//! 1. `${NAME}` is expanded over the raw file text
//! 2. the text is parsed according to the file extension and every string
//!    leaf of the form `%(<file>.json|yaml|yml)` is replaced by the loaded
//!    contents of that file, nested or flattened into the parent
//! 3. `%(name)` is expanded in every string leaf against the top level of
//!    the finished tree, so references do not depend on declaration order.
//!    Each included file gets this pass against its own top level first;
//!    whatever it leaves is retried by the including file

use crate::error::{ConfigError, Result};
use crate::tree::{ConfigTree, ConfigValue};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use wrfnml::{Diagnostics, Env, Expander, Scope};

lazy_static! {
    static ref INCLUDE: Regex =
        Regex::new(r"^%\((?P<path>[^()]+\.(?i:json|ya?ml))\)$").unwrap();
}

/// Structured formats recognized by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(ConfigFormat::Json),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            _ => Err(ConfigError::UnknownFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Parse `text`; the top level must be a mapping (an empty YAML file is an empty tree).
    pub fn parse(self, text: &str, path: &Path) -> Result<ConfigTree> {
        let root = match self {
            ConfigFormat::Json => serde_json::from_str::<serde_json::Value>(text)
                .map(ConfigValue::from_json)
                .map_err(|e| ConfigError::parse(path, e))?,
            ConfigFormat::Yaml => serde_yaml::from_str::<serde_yaml::Value>(text)
                .map(ConfigValue::from_yaml)
                .map_err(|e| ConfigError::parse(path, e))?,
        };
        match root {
            ConfigValue::Tree(tree) => Ok(tree),
            ConfigValue::Null => Ok(ConfigTree::new()),
            other => Err(ConfigError::parse(
                path,
                format!("expected a mapping at the top level, found '{}'", other),
            )),
        }
    }
}

/// If `text` is an include reference, the referenced path.
pub fn include_target(text: &str) -> Option<&str> {
    INCLUDE
        .captures(text)
        .and_then(|caps| caps.name("path"))
        .map(|m| m.as_str().trim())
}

pub struct ConfigLoader {
    expander: Expander,
    flatten: bool,
    loading: Vec<PathBuf>,
}

impl ConfigLoader {
    pub fn new(env: Env) -> Self {
        Self {
            expander: Expander::new(env),
            flatten: false,
            loading: Vec::new(),
        }
    }

    pub fn from_process_env() -> Self {
        Self {
            expander: Expander::from_process_env(),
            flatten: false,
            loading: Vec::new(),
        }
    }

    /// Merge included trees into their parent instead of nesting them.
    pub fn flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        self.expander.diagnostics()
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        self.expander.take_diagnostics()
    }

    /// Load `path` with its includes, then resolve `%(name)` references.
    pub fn load(&mut self, path: &Path) -> Result<ConfigTree> {
        self.loading.clear();
        let mut tree = self.load_file(path)?;
        let scope = tree.clone();
        self.expand_tree(&mut tree, &scope)?;
        Ok(tree)
    }

    fn load_file(&mut self, path: &Path) -> Result<ConfigTree> {
        let format = ConfigFormat::from_path(path)?;
        let canonical = std::fs::canonicalize(path).map_err(|e| ConfigError::io(path, e))?;

        if self.loading.contains(&canonical) {
            let mut chain = self.loading.clone();
            chain.push(canonical);
            return Err(ConfigError::IncludeCycle { chain });
        }

        let raw = std::fs::read_to_string(&canonical).map_err(|e| ConfigError::io(path, e))?;
        let text = self.expander.expand_env(&raw)?;
        let tree = format.parse(&text, path)?;

        let dir = canonical
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.loading.push(canonical);
        let resolved = self.resolve_includes(tree, &dir);
        self.loading.pop();
        resolved
    }

    fn resolve_includes(&mut self, tree: ConfigTree, dir: &Path) -> Result<ConfigTree> {
        let mut out = ConfigTree::new();

        for (key, value) in tree {
            match value {
                ConfigValue::Str(text) => match include_target(&text) {
                    Some(target) => {
                        let included = self.load_include(dir, target)?;
                        if self.flatten {
                            for (k, v) in included {
                                out.set(k, v);
                            }
                        } else {
                            out.set(key, included);
                        }
                    }
                    None => out.set(key, text),
                },
                ConfigValue::Tree(sub) => {
                    let sub = self.resolve_includes(sub, dir)?;
                    out.set(key, sub);
                }
                other => out.set(key, other),
            }
        }

        Ok(out)
    }

    fn load_include(&mut self, dir: &Path, target: &str) -> Result<ConfigTree> {
        let path = dir.join(target);
        if !path.is_file() {
            return Err(ConfigError::InvalidInclude {
                path,
                reason: "no such file".to_string(),
            });
        }
        self.expander
            .diagnostics_mut()
            .debug(format!("including {}", path.display()));
        let mut included = self.load_file(&path)?;
        let scope = included.clone();
        self.expand_tree(&mut included, &scope)?;
        Ok(included)
    }

    fn expand_tree<S: Scope>(&mut self, tree: &mut ConfigTree, scope: &S) -> Result<()> {
        for (_, value) in tree.iter_mut() {
            self.expand_value(value, scope)?;
        }
        Ok(())
    }

    fn expand_value<S: Scope>(&mut self, value: &mut ConfigValue, scope: &S) -> Result<()> {
        match value {
            ConfigValue::Str(text) => {
                if text.contains("%(") {
                    *text = self.expander.expand_local(text, scope)?;
                }
            }
            ConfigValue::List(items) => {
                for item in items.iter_mut() {
                    self.expand_value(item, scope)?;
                }
            }
            ConfigValue::Tree(sub) => self.expand_tree(sub, scope)?,
            _ => {}
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(Env::new())
    }
}

/// Load a configuration file, expanding `${NAME}` from the process environment.
pub fn load<P: AsRef<Path>>(path: P, flatten: bool) -> Result<ConfigTree> {
    ConfigLoader::from_process_env()
        .flatten(flatten)
        .load(path.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")).unwrap(), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.YML")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.yaml")).unwrap(), ConfigFormat::Yaml);
        assert!(matches!(
            ConfigFormat::from_path(Path::new("a.toml")),
            Err(ConfigError::UnknownFormat { .. })
        ));
        assert!(ConfigFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_include_target() {
        assert_eq!(include_target("%(domains.yaml)"), Some("domains.yaml"));
        assert_eq!(include_target("%(../common/paths.json)"), Some("../common/paths.json"));
        assert_eq!(include_target("%(base)/grb"), None);
        assert_eq!(include_target("%(notes.txt)"), None);
        assert_eq!(include_target("x %(a.yaml)"), None);
    }

    #[test]
    fn test_parse_rejects_non_mapping() {
        let path = Path::new("x.yaml");
        assert!(ConfigFormat::Yaml.parse("", path).unwrap().is_empty());
        assert!(matches!(
            ConfigFormat::Yaml.parse("- 1\n- 2\n", path),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            ConfigFormat::Json.parse("{not json", Path::new("x.json")),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_local_references_are_order_independent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "grb_dir: '%(base)/grb'\nbase: /home/x\nlist: ['%(base)', 2]\n")
            .unwrap();

        let tree = ConfigLoader::default().load(&path).unwrap();
        assert_eq!(tree.get("grb_dir"), Some(&ConfigValue::from("/home/x/grb")));
        assert_eq!(
            tree.get("list"),
            Some(&ConfigValue::List(vec![ConfigValue::from("/home/x"), ConfigValue::from(2)]))
        );
    }

    #[test]
    fn test_env_expanded_before_parsing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("conus.yaml"), "max_dom: 2\n").unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "domain: '%(${CASE}.yaml)'\n").unwrap();

        let mut env = Env::new();
        env.insert("CASE".into(), "conus".into());
        let tree = ConfigLoader::new(env).load(&path).unwrap();
        assert_eq!(tree.get_path("domain.max_dom"), Some(&ConfigValue::Int(2)));
    }
}
