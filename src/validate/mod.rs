//! Shallow response-schema validation.
//!
//! An expected schema is an allow-list of `(field, type tag)` assertions
//! checked against the top level of a decoded 2xx response. Fields not named
//! in the schema are never inspected; a definition without a schema passes
//! unconditionally.

use std::collections::BTreeMap;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Expected primitive shape of one response field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Null,
    Date,
    /// Catch-all for labels a custom catalog declares that this tool does
    /// not know. Fails closed: it never matches any value.
    #[serde(other)]
    Unknown,
}

/// Field name → expected tag. BTreeMap keeps iteration deterministic.
pub type ExpectedSchema = BTreeMap<String, TypeTag>;

/// Check `response` against an optional schema. Absence of a schema means
/// there is no contract to enforce, so the check passes. Otherwise every
/// declared field must exist and match its tag (AND semantics).
pub fn validate(response: &Value, schema: Option<&ExpectedSchema>) -> bool {
    let Some(schema) = schema else {
        return true;
    };

    let Some(fields) = response.as_object() else {
        return false;
    };

    schema.iter().all(|(name, tag)| {
        fields
            .get(name)
            .is_some_and(|value| matches_tag(value, *tag))
    })
}

fn matches_tag(value: &Value, tag: TypeTag) -> bool {
    match tag {
        TypeTag::String => value.is_string(),
        TypeTag::Number => value.is_number(),
        TypeTag::Boolean => value.is_boolean(),
        TypeTag::Array => value.is_array(),
        TypeTag::Object => value.is_object(),
        TypeTag::Null => value.is_null(),
        // JSON has no native date; accept an RFC 3339 timestamp string.
        TypeTag::Date => value
            .as_str()
            .is_some_and(|raw| DateTime::parse_from_rfc3339(raw).is_ok()),
        TypeTag::Unknown => false,
    }
}
