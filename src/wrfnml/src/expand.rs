// wrfnml/src/expand.rs

//! Placeholder expansion shared by the namelist parser and the config loader.
//!
//! Two placeholder forms are recognised:
//! - `${NAME}` is looked up in an environment snapshot ([`Env`])
//! - `%(NAME)` is looked up in a [`Scope`] of already-resolved settings
//!
//! Unknown names are left verbatim. Replacements are themselves expanded, and
//! a name that resolves back to itself is reported as [`ExpandError::Cycle`].

use crate::diagnostics::Diagnostics;
use crate::error::ExpandError;
use lazy_static::lazy_static;
use linked_hash_map::LinkedHashMap;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\$\{(?P<env>[A-Za-z_][A-Za-z0-9_]*)\}|%\((?P<local>[^()${}]+)\)").unwrap();
}

/// Environment snapshot used for `${NAME}` lookups.
pub type Env = HashMap<String, String>;

/// Capture the current process environment.
pub fn process_env() -> Env {
    std::env::vars().collect()
}

/// Result of looking a name up in a [`Scope`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// The name holds a scalar with this textual form.
    Scalar(Cow<'a, str>),
    /// The name holds a sequence, map or sub-tree.
    Compound,
    /// The name is not defined.
    Missing,
}

/// Anything that can answer `%(NAME)` lookups.
pub trait Scope {
    fn lookup(&self, name: &str) -> Lookup<'_>;
}

impl Scope for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Lookup<'_> {
        match self.get(name) {
            Some(v) => Lookup::Scalar(Cow::Borrowed(v.as_str())),
            None => Lookup::Missing,
        }
    }
}

impl Scope for LinkedHashMap<String, String> {
    fn lookup(&self, name: &str) -> Lookup<'_> {
        match self.get(name) {
            Some(v) => Lookup::Scalar(Cow::Borrowed(v.as_str())),
            None => Lookup::Missing,
        }
    }
}

/// Scope with no entries, for environment-only passes.
pub struct EmptyScope;

impl Scope for EmptyScope {
    fn lookup(&self, _name: &str) -> Lookup<'_> {
        Lookup::Missing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Env,
    Local,
    Both,
}

impl Mode {
    fn env(self) -> bool {
        matches!(self, Mode::Env | Mode::Both)
    }

    fn local(self) -> bool {
        matches!(self, Mode::Local | Mode::Both)
    }
}

/// Expands placeholders against an owned environment snapshot.
#[derive(Debug, Clone, Default)]
pub struct Expander {
    env: Env,
    diagnostics: Diagnostics,
}

impl Expander {
    pub fn new(env: Env) -> Self {
        Self {
            env,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Expander over the current process environment.
    pub fn from_process_env() -> Self {
        Self::new(process_env())
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    /// Expand only `${NAME}` placeholders.
    pub fn expand_env(&mut self, text: &str) -> Result<String, ExpandError> {
        self.run(text, &EmptyScope, Mode::Env)
    }

    /// Expand only `%(NAME)` placeholders against `scope`.
    pub fn expand_local<S: Scope + ?Sized>(
        &mut self,
        text: &str,
        scope: &S,
    ) -> Result<String, ExpandError> {
        self.run(text, scope, Mode::Local)
    }

    /// Expand `${NAME}` placeholders, then `%(NAME)` placeholders.
    pub fn expand<S: Scope + ?Sized>(
        &mut self,
        text: &str,
        scope: &S,
    ) -> Result<String, ExpandError> {
        let text = self.run(text, &EmptyScope, Mode::Env)?;
        self.run(&text, scope, Mode::Both)
    }

    fn run<S: Scope + ?Sized>(
        &mut self,
        text: &str,
        scope: &S,
        mode: Mode,
    ) -> Result<String, ExpandError> {
        if !text.contains("${") && !text.contains("%(") {
            return Ok(text.to_string());
        }
        let mut stack = Vec::new();
        self.expand_inner(text, scope, mode, &mut stack)
    }

    fn expand_inner<S: Scope + ?Sized>(
        &mut self,
        text: &str,
        scope: &S,
        mode: Mode,
        stack: &mut Vec<String>,
    ) -> Result<String, ExpandError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);
            last = whole.end();

            let replacement = if let Some(name) = caps.name("env").filter(|_| mode.env()) {
                let name = name.as_str();
                match self.env.get(name).cloned() {
                    Some(value) => Some((format!("${{{}}}", name), value)),
                    None => {
                        self.diagnostics
                            .warn(format!("environment variable '{}' is not set", name));
                        None
                    }
                }
            } else if let Some(name) = caps.name("local").filter(|_| mode.local()) {
                let name = name.as_str();
                match scope.lookup(name) {
                    Lookup::Scalar(value) => Some((format!("%({})", name), value.into_owned())),
                    Lookup::Compound => {
                        return Err(ExpandError::NonScalar {
                            name: name.to_string(),
                        })
                    }
                    Lookup::Missing => {
                        self.diagnostics
                            .warn(format!("local variable '{}' is not defined", name));
                        None
                    }
                }
            } else {
                None
            };

            match replacement {
                Some((marker, value)) => {
                    if stack.contains(&marker) {
                        let mut chain = stack.clone();
                        chain.push(marker);
                        return Err(ExpandError::Cycle { chain });
                    }
                    stack.push(marker);
                    let resolved = self.expand_inner(&value, scope, mode, stack)?;
                    stack.pop();
                    out.push_str(&resolved);
                }
                None => out.push_str(whole.as_str()),
            }
        }

        out.push_str(&text[last..]);
        Ok(out)
    }
}

/// Expand `${NAME}` from `env` and `%(NAME)` from `scope` in one pass.
pub fn expand<S: Scope + ?Sized>(text: &str, env: &Env, scope: &S) -> Result<String, ExpandError> {
    Expander::new(env.clone()).expand(text, scope)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Env {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn scope(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        env(pairs)
    }

    struct TreeLike;

    impl Scope for TreeLike {
        fn lookup(&self, name: &str) -> Lookup<'_> {
            match name {
                "domain" => Lookup::Compound,
                "root" => Lookup::Scalar(Cow::Borrowed("/data")),
                _ => Lookup::Missing,
            }
        }
    }

    #[test]
    fn test_env_and_local() {
        let out = expand(
            "${HOME}/runs/%(case)",
            &env(&[("HOME", "/home/wrf")]),
            &scope(&[("case", "conus")]),
        )
        .unwrap();
        assert_eq!(out, "/home/wrf/runs/conus");
    }

    #[test]
    fn test_missing_names_are_left_verbatim() {
        let mut expander = Expander::new(Env::new());
        let out = expander
            .expand("${NOPE}/%(unknown)", &scope(&[]))
            .unwrap();
        assert_eq!(out, "${NOPE}/%(unknown)");
        let warned = |needle: &str| {
            expander
                .diagnostics()
                .warnings()
                .any(|d| d.message.contains(needle))
        };
        assert!(warned("'NOPE'"));
        assert!(warned("'unknown'"));
    }

    #[test]
    fn test_transitive_expansion() {
        let s = scope(&[
            ("base", "${ROOT}/x"),
            ("grb_dir", "%(base)/grb"),
        ]);
        let out = expand("%(grb_dir)/gfs", &env(&[("ROOT", "/home")]), &s).unwrap();
        assert_eq!(out, "/home/x/grb/gfs");
    }

    #[test]
    fn test_cycle_is_an_error() {
        let s = scope(&[("a", "%(b)/1"), ("b", "%(a)/2")]);
        let err = expand("%(a)", &Env::new(), &s).unwrap_err();
        match err {
            ExpandError::Cycle { chain } => {
                assert_eq!(chain, vec!["%(a)", "%(b)", "%(a)"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let s = scope(&[("a", "x%(a)")]);
        assert!(matches!(
            expand("%(a)", &Env::new(), &s),
            Err(ExpandError::Cycle { .. })
        ));
    }

    #[test]
    fn test_non_scalar_lookup_fails() {
        let err = expand("%(domain)/x", &Env::new(), &TreeLike).unwrap_err();
        assert_eq!(
            err,
            ExpandError::NonScalar {
                name: "domain".into()
            }
        );
        assert_eq!(expand("%(root)/x", &Env::new(), &TreeLike).unwrap(), "/data/x");
    }

    #[test]
    fn test_env_only_pass_leaves_local_placeholders() {
        let mut expander = Expander::new(env(&[("CASE", "conus")]));
        let out = expander.expand_env("%(${CASE}.yaml)").unwrap();
        assert_eq!(out, "%(conus.yaml)");
    }

    #[test]
    fn test_local_only_pass_leaves_env_placeholders() {
        let mut expander = Expander::new(env(&[("X", "1")]));
        let out = expander
            .expand_local("${X}-%(y)", &scope(&[("y", "2")]))
            .unwrap();
        assert_eq!(out, "${X}-2");
    }

    #[test]
    fn test_resolved_text_is_unchanged() {
        let text = "/home/x/grb/2013-06-14_00:00:00 100%";
        let out = expand(text, &env(&[("HOME", "/h")]), &scope(&[("a", "b")])).unwrap();
        assert_eq!(out, text);
    }
}
