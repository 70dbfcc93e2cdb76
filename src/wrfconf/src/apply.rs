// wrfconf/src/apply.rs

//! Writing merged settings into a namelist template.

use crate::datetime::ForecastTimes;
use crate::tree::{ConfigTree, ConfigValue};
use wrfnml::value::infer_scalar;
use wrfnml::{normalize_section, HyphenPolicy, NamelistDocument, Scalar, Value};

/// Update `doc` from `tree` and return how many keys were written.
///
/// Top-level scalars and sequences replace settings the template already
/// has. A sub-tree named like one of the template's sections writes all of
/// its scalar/sequence entries with that section, so new keys land there
/// and existing ones keep their place. Strings get date substitution when
/// `dates` is given and are then typed the way the namelist parser types a
/// token, so `"3"` from the command line is written as `3`.
pub fn apply_tree(
    doc: &mut NamelistDocument,
    tree: &ConfigTree,
    dates: Option<&ForecastTimes>,
) -> wrfnml::Result<usize> {
    let mut written = 0;

    for (key, value) in tree.iter() {
        match value {
            ConfigValue::Tree(sub) => {
                let section = normalize_section(key);
                if !doc.has_section(&section) {
                    continue;
                }
                for (sub_key, sub_value) in sub.iter() {
                    let Some(value) = namelist_value(sub_value, dates) else {
                        continue;
                    };
                    doc.update(sub_key, value, Some(&section))?;
                    written += 1;
                }
            }
            other => {
                if !doc.contains_key(key) {
                    continue;
                }
                if let Some(value) = namelist_value(other, dates) {
                    doc.update(key, value, None)?;
                    written += 1;
                }
            }
        }
    }

    Ok(written)
}

fn namelist_value(value: &ConfigValue, dates: Option<&ForecastTimes>) -> Option<Value> {
    let mut value = value.to_namelist_value()?;
    match &mut value {
        Value::Scalar(scalar) => retype(scalar, dates),
        Value::List(items) => items.iter_mut().for_each(|s| retype(s, dates)),
        Value::Map(_) => {}
    }
    Some(value)
}

fn retype(scalar: &mut Scalar, dates: Option<&ForecastTimes>) {
    if let Scalar::Str(text) = scalar {
        let text = match dates {
            Some(dates) => dates.substitute(text),
            None => text.clone(),
        };
        *scalar = infer_scalar(&text, HyphenPolicy::default());
    }
}
