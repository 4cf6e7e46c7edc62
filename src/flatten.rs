//! Benchmark config flattening
//!
//! Turns a nested YAML benchmark config into the flat `prefix_key_subkey`
//! form Crucible expects for run parameters, and produces a matching
//! template whose leaves reference those flat names. Lists cannot be
//! flattened and are rejected; an empty document flattens to nothing.

use std::fs;
use std::path::Path;

use serde_json::json;
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

pub fn load_yaml(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Text of a scalar key or leaf, spelled the way Crucible params carry it.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "None".to_string(),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        // Not reachable for leaves; keys that are collections get their YAML text
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// The top-level mapping, `None` for an empty or scalar document.
fn as_mapping<'a>(doc: &'a Value, prefix: &str) -> Result<Option<&'a Mapping>> {
    match doc {
        Value::Mapping(map) => Ok(Some(map)),
        Value::Sequence(_) => Err(Error::Flatten(format!("'{}' is a list", prefix))),
        Value::Tagged(tagged) => as_mapping(&tagged.value, prefix),
        _ => Ok(None),
    }
}

fn child_key(prefix: &str, key: &Value) -> String {
    format!("{}_{}", prefix, scalar_text(key))
}

/// Flatten `doc` into `(prefix_key_subkey, value)` pairs in document order.
pub fn flatten(doc: &Value, prefix: &str) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    if let Some(map) = as_mapping(doc, prefix)? {
        flatten_into(map, prefix, &mut out)?;
    }
    Ok(out)
}

fn flatten_into(map: &Mapping, prefix: &str, out: &mut Vec<(String, String)>) -> Result<()> {
    for (key, value) in map {
        let name = child_key(prefix, key);
        match value {
            Value::Mapping(inner) => flatten_into(inner, &name, out)?,
            Value::Sequence(_) => return Err(Error::Flatten(format!("'{}' is a list", name))),
            leaf => out.push((name, scalar_text(leaf))),
        }
    }
    Ok(())
}

/// Same shape as `doc`, every leaf replaced by `{{ prefix_key_subkey }}`.
pub fn template(doc: &Value, prefix: &str) -> Result<Value> {
    let mut out = Mapping::new();
    let Some(map) = as_mapping(doc, prefix)? else {
        return Ok(Value::Mapping(out));
    };
    for (key, value) in map {
        let name = child_key(prefix, key);
        let templated = match value {
            Value::Mapping(_) => template(value, &name)?,
            Value::Sequence(_) => return Err(Error::Flatten(format!("'{}' is a list", name))),
            _ => Value::String(format!("{{{{ {} }}}}", name)),
        };
        out.insert(key.clone(), templated);
    }
    Ok(Value::Mapping(out))
}

/// Crucible run-file params: `{"params": [{"arg": k, "vals": [v]}, ...]}`
pub fn crucible_params(flat: &[(String, String)]) -> serde_json::Value {
    let params: Vec<serde_json::Value> = flat
        .iter()
        .map(|(arg, val)| json!({ "arg": arg, "vals": [val] }))
        .collect();
    json!({ "params": params })
}

fn single_quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// `dict(` block of `key = 'value',` lines for Crucible scripts.
pub fn script_vars(flat: &[(String, String)]) -> String {
    let lines: Vec<String> = flat
        .iter()
        .map(|(k, v)| format!("{} = {},", k, single_quote(v)))
        .collect();
    format!("dict(\n\t{}\n)", lines.join("\n\t"))
}
