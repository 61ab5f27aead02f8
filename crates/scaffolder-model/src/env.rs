//! `${VAR}` interpolation over a raw metadata document.
//!
//! Variables resolve from the document's own `env` table first, then from the
//! process environment. Values are expanded recursively; a variable that
//! refers back to itself is an error. Strings under `preset_matrix` are left
//! alone since `${preset}` there is filled in at generation time.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::error::{ModelError, Result};

const PRESET_MATRIX_KEY: &str = "preset_matrix";

/// Extract the `env` table of a document.
///
/// Accepts an object of string values or an array of `{name, value}` entries.
/// Non-string values and incomplete entries are skipped.
pub fn env_table(value: &Value) -> BTreeMap<String, String> {
    let mut table = BTreeMap::new();
    match value {
        Value::Object(map) => {
            for (name, v) in map {
                if let Value::String(s) = v {
                    table.insert(name.clone(), s.clone());
                }
            }
        }
        Value::Array(entries) => {
            for entry in entries {
                if let (Some(Value::String(name)), Some(Value::String(v))) =
                    (entry.get("name"), entry.get("value"))
                {
                    table.insert(name.clone(), v.clone());
                }
            }
        }
        _ => {}
    }
    table
}

/// Expands `${NAME}` references.
#[derive(Debug, Clone, Default)]
pub struct EnvExpander {
    table: BTreeMap<String, String>,
}

impl EnvExpander {
    pub fn new(table: BTreeMap<String, String>) -> Self {
        Self { table }
    }

    /// Build an expander from the `env` section of a raw document.
    pub fn from_document(doc: &Value) -> Self {
        Self::new(doc.get("env").map(env_table).unwrap_or_default())
    }

    fn lookup(&self, name: &str) -> Result<String> {
        if let Some(v) = self.table.get(name) {
            return Ok(v.clone());
        }
        std::env::var(name).map_err(|_| ModelError::EnvExpand {
            detail: format!("environment variable '{name}' not found (not in env nor system)"),
        })
    }

    /// Expand every reference in `value`.
    pub fn expand(&self, value: &str) -> Result<String> {
        if !value.contains("${") {
            return Ok(value.to_string());
        }
        let mut expanding = BTreeSet::new();
        self.expand_inner(value, &mut expanding)
    }

    fn expand_inner(&self, value: &str, expanding: &mut BTreeSet<String>) -> Result<String> {
        let mut out = String::with_capacity(value.len());
        let mut rest = value;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| ModelError::EnvExpand {
                detail: format!("unclosed ${{...}} in: {value}"),
            })?;
            let name = &after[..end];
            if name.is_empty() {
                return Err(ModelError::EnvExpand {
                    detail: "empty variable name in ${}".into(),
                });
            }
            if !expanding.insert(name.to_string()) {
                return Err(ModelError::EnvExpand {
                    detail: format!("circular reference in environment variable: {name}"),
                });
            }
            let raw = self.lookup(name)?;
            let expanded = self.expand_inner(&raw, expanding)?;
            expanding.remove(name);
            out.push_str(&expanded);
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Expand every string of a raw document in place.
    pub fn expand_document(&self, doc: &mut Value) -> Result<()> {
        match doc {
            Value::String(s) => {
                if s.contains("${") {
                    *s = self.expand(s)?;
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.expand_document(item)?;
                }
            }
            Value::Object(map) => {
                for (key, v) in map.iter_mut() {
                    if key != PRESET_MATRIX_KEY {
                        self.expand_document(v)?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}
