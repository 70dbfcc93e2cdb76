// wrfnml/src/parser.rs

//! Line-oriented parser for `&section key = value, ... /` namelist text.
//!
//! Processing order for each input:
//! 1. `#` starts a comment running to end of line; blank lines are dropped
//! 2. a trailing `\` joins a line with the next one
//! 3. `&name` opens a section that lasts until the next `&`; `/` is skipped
//! 4. `key = value` is split on the first `=`; the value is expanded
//!    (`${ENV}` first, then `%(key)` against the keys parsed so far)
//! 5. the value is typed as a literal map, a list or a single scalar

use crate::diagnostics::Diagnostics;
use crate::error::{NamelistError, Result};
use crate::expand::{Env, Expander};
use crate::namelist::{normalize_section, NamelistDocument};
use crate::value::{infer_scalar, strip_quotes, HyphenPolicy, Scalar, Value};
use linked_hash_map::LinkedHashMap;

/// One logical line after comment stripping and continuation joining.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogicalLine {
    /// 1-based number of the first physical line
    number: usize,
    text: String,
}

/// Namelist parser holding the environment used for `${NAME}` placeholders.
pub struct Parser {
    expander: Expander,
    hyphen_policy: HyphenPolicy,
}

impl Parser {
    /// Create a parser that expands `${NAME}` from `env`.
    pub fn new(env: Env) -> Self {
        Self {
            expander: Expander::new(env),
            hyphen_policy: HyphenPolicy::default(),
        }
    }

    /// Parser over the current process environment.
    pub fn from_process_env() -> Self {
        Self {
            expander: Expander::from_process_env(),
            hyphen_policy: HyphenPolicy::default(),
        }
    }

    /// Choose how tokens containing `-` are typed.
    pub fn with_hyphen_policy(mut self, policy: HyphenPolicy) -> Self {
        self.hyphen_policy = policy;
        self
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        self.expander.diagnostics()
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        self.expander.take_diagnostics()
    }

    /// Parse namelist text into a document.
    pub fn parse(&mut self, input: &str) -> Result<NamelistDocument> {
        let mut doc = NamelistDocument::new();
        let mut section: Option<String> = None;

        for line in logical_lines(input) {
            let text = line.text.trim();

            if let Some(name) = text.strip_prefix('&') {
                let name = normalize_section(name);
                if name.is_empty() || name.contains(char::is_whitespace) || name.contains('=') {
                    return Err(NamelistError::syntax(
                        line.number,
                        format!("malformed section header '{}'", text),
                    ));
                }
                section = Some(name);
                continue;
            }

            if text == "/" {
                continue;
            }

            let Some((raw_key, raw_value)) = text.split_once('=') else {
                return Err(NamelistError::syntax(
                    line.number,
                    format!("expected 'key = value', found '{}'", text),
                ));
            };
            let key = raw_key.trim();
            if key.is_empty() || key.contains(char::is_whitespace) {
                return Err(NamelistError::syntax(
                    line.number,
                    format!("malformed key in '{}'", text),
                ));
            }
            let Some(current) = section.as_deref() else {
                return Err(NamelistError::NoSection {
                    line: line.number,
                    key: key.to_string(),
                });
            };

            let expanded = self.expander.expand(raw_value, &doc)?;
            let value = parse_value(&expanded, self.hyphen_policy).map_err(|message| {
                if message == UNTERMINATED_MAP {
                    NamelistError::UnterminatedMap {
                        line: line.number,
                        key: key.to_string(),
                    }
                } else {
                    NamelistError::syntax(line.number, message)
                }
            })?;

            if doc.contains_key(key) {
                self.expander
                    .diagnostics_mut()
                    .debug(format!("line {}: '{}' redeclared, overwriting", line.number, key));
            }
            doc.update(key, value, Some(current))?;
        }

        Ok(doc)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(Env::new())
    }
}

/// Strip comments, drop blank lines and join `\` continuations.
fn logical_lines(input: &str) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    let mut pending: Option<LogicalLine> = None;

    for (idx, raw) in input.lines().enumerate() {
        let stripped = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let stripped = stripped.trim_end();

        let (body, continues) = match stripped.strip_suffix('\\') {
            Some(body) => (body, true),
            None => (stripped, false),
        };

        let mut current = pending.take().unwrap_or(LogicalLine {
            number: idx + 1,
            text: String::new(),
        });
        current.text.push_str(body);

        if continues {
            pending = Some(current);
        } else if !current.text.trim().is_empty() {
            lines.push(current);
        }
    }

    if let Some(last) = pending {
        if !last.text.trim().is_empty() {
            lines.push(last);
        }
    }
    lines
}

const UNTERMINATED_MAP: &str = "unterminated literal map";

/// Type the (already expanded) value side of an assignment.
///
/// Tried in order: a `{...}` literal map, a comma-separated list, one scalar.
/// Trailing commas are ignored, so `dx = 3000.0,` is a scalar.
pub fn parse_value(text: &str, policy: HyphenPolicy) -> std::result::Result<Value, String> {
    let text = text.trim().trim_end_matches(',').trim_end();

    if let Some(inner) = text.strip_prefix('{') {
        let Some(inner) = inner.strip_suffix('}') else {
            return Err(UNTERMINATED_MAP.to_string());
        };
        return parse_map(inner, policy).map(Value::Map);
    }

    if text.contains(',') {
        let items: Vec<Scalar> = text
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| infer_scalar(t, policy))
            .collect();
        return Ok(match items.len() {
            1 => Value::Scalar(items.into_iter().next().unwrap_or(Scalar::Str(String::new()))),
            _ => Value::List(items),
        });
    }

    Ok(Value::Scalar(infer_scalar(text, policy)))
}

fn parse_map(
    inner: &str,
    policy: HyphenPolicy,
) -> std::result::Result<LinkedHashMap<String, Scalar>, String> {
    let mut map = LinkedHashMap::new();
    for item in inner.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let Some((k, v)) = item.split_once(':') else {
            return Err(format!("literal map entry '{}' has no ':'", item));
        };
        let key = strip_quotes(k.trim()).to_string();
        if key.is_empty() {
            return Err(format!("literal map entry '{}' has an empty key", item));
        }
        map.insert(key, infer_scalar(v, policy));
    }
    Ok(map)
}
