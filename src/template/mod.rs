//! Path-template resolution.
//!
//! Endpoint paths in the catalog carry `:name` placeholders
//! (e.g. `/v1/files/:file_key/comments/:comment_id`). Resolution substitutes
//! each occurrence from the caller-supplied placeholder map; a missing or
//! empty value substitutes the sentinel `missing-<name>` instead, so the
//! request still goes out and the remote API answers with a meaningful 4xx.

use std::collections::HashMap;

/// Placeholder name → resolved value. Supplied by the config layer; the
/// core only reads it.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderMap {
    values: HashMap<String, String>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// A value is only usable if present and non-empty.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

impl From<HashMap<String, String>> for PlaceholderMap {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

fn is_placeholder_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Substitute every `:name` occurrence in `template`. Substituted text is
/// emitted directly and never re-scanned, so values containing `:` cannot
/// trigger a second substitution. Resolution never fails.
pub fn resolve(template: &str, placeholders: &PlaceholderMap) -> String {
    let mut resolved = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(idx) = rest.find(':') {
        resolved.push_str(&rest[..idx]);
        let after = &rest[idx + 1..];
        let name_len = after
            .find(|c: char| !is_placeholder_char(c))
            .unwrap_or(after.len());

        if name_len == 0 {
            // A lone `:` is not a placeholder.
            resolved.push(':');
            rest = after;
            continue;
        }

        let name = &after[..name_len];
        match placeholders.get(name) {
            Some(value) => resolved.push_str(value),
            None => {
                resolved.push_str("missing-");
                resolved.push_str(name);
            }
        }
        rest = &after[name_len..];
    }

    resolved.push_str(rest);
    resolved
}
