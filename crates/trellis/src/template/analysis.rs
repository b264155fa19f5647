//! Static analysis export: which fields each view reads.
//!
//! The summary is a JSON object keyed by view key:
//!
//! ```json
//! {
//!   "app/dashboard.html": ["data.name", "lang", "@type:Dashboard,User"]
//! }
//! ```
//!
//! Type hints come from template comments such as `{# @type Dashboard User #}`
//! and are meant for editor tooling; they have no effect on rendering.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::functions::Namespace;
use super::unit::CompiledUnit;
use crate::error::ParseError;

static TYPE_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{#-?\s*@type\s+([^#]*?)\s*-?#\}").expect("type hint pattern compiles")
});

/// Fields referenced per view key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Summary {
    views: BTreeMap<String, Vec<String>>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the fields `unit` references, minus namespace globals, plus
    /// any type hints found in `sources`.
    pub fn record(&mut self, unit: &CompiledUnit, sources: &[&str], namespace: &Namespace) {
        let mut fields: Vec<String> = unit
            .referenced_variables()
            .into_iter()
            .filter(|field| !namespace.contains(root_name(field)))
            .collect();

        let types = type_hints(sources);
        if !types.is_empty() {
            fields.push(format!("@type:{}", types.join(",")));
        }

        self.views.insert(unit.key().to_string(), fields);
    }

    /// Fields recorded for `key`.
    pub fn fields(&self, key: &str) -> Option<&[String]> {
        self.views.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Writes the summary as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> Result<(), ParseError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| ParseError::StaticAnalysis {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        fs::write(path, json).map_err(|source| ParseError::StaticAnalysis {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn root_name(field: &str) -> &str {
    field.split('.').next().unwrap_or(field)
}

/// Type names declared by `{# @type A B #}` comments, in order of appearance.
fn type_hints(sources: &[&str]) -> Vec<String> {
    let mut names = Vec::new();
    for source in sources {
        for caps in TYPE_HINT.captures_iter(source) {
            let declared = caps.get(1).map_or("", |m| m.as_str());
            for name in declared.split(|c: char| c.is_whitespace() || c == ',') {
                if !name.is_empty() && !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
    }
    names
}
