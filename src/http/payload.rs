use serde_json::Value;

use super::method::ProbeMethod;
use crate::catalog::RequestDefinition;

/// Wire payload derived from a definition's body spec: query parameters for
/// reads, a JSON body for writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Payload {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Derive the payload for one definition. Reads turn every non-null declared
/// value into a string query parameter; writes pass the body spec through
/// unchanged. Definitions without a body spec yield an empty payload.
pub fn build(definition: &RequestDefinition) -> Payload {
    let Some(spec) = &definition.body_spec else {
        return Payload::empty();
    };

    match definition.method {
        ProbeMethod::Read => Payload {
            query: query_params(spec),
            body: None,
        },
        ProbeMethod::Write => Payload {
            query: Vec::new(),
            body: Some(spec.clone()),
        },
    }
}

/// Null values are dropped rather than stringified; everything else is
/// rendered the way it would appear in a URL.
fn query_params(spec: &Value) -> Vec<(String, String)> {
    let Some(fields) = spec.as_object() else {
        return Vec::new();
    };

    fields
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), stringify(value)))
        .collect()
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}
