//! Endpoint catalog.
//!
//! The built-in catalog is the static, ordered list of endpoints the probe
//! exercises; declaration order is load-bearing because it becomes the report
//! row order. A custom catalog can also be loaded from a JSON file of the
//! same shape.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::http::method::ProbeMethod;
use crate::validate::{ExpectedSchema, TypeTag};

/// One immutable endpoint definition: what to call, with what payload spec,
/// and what shape a successful response is expected to have.
#[derive(Debug, Clone)]
pub struct RequestDefinition {
    pub method: ProbeMethod,
    pub path_template: String,
    pub body_spec: Option<Value>,
    pub expected_schema: Option<ExpectedSchema>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file `{path}`: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse catalog file `{path}`: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("unsupported method `{label}` for endpoint `{path_template}`")]
    UnsupportedMethod { label: String, path_template: String },
}

/// On-disk shape of one custom catalog entry. The method arrives as a raw
/// label so an unsupported verb can be rejected per entry instead of failing
/// the whole file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDefinition {
    method: String,
    path: String,
    #[serde(default)]
    body: Option<Value>,
    #[serde(default)]
    expected_schema: Option<BTreeMap<String, TypeTag>>,
}

/// The built-in endpoint set, in report row order.
pub fn builtin() -> Vec<RequestDefinition> {
    vec![
        // File reads
        RequestDefinition {
            method: ProbeMethod::Read,
            path_template: "/v1/files/:file_key".to_string(),
            body_spec: None,
            expected_schema: Some(BTreeMap::from([
                ("name".to_string(), TypeTag::String),
                ("document".to_string(), TypeTag::Object),
                ("lastModified".to_string(), TypeTag::Date),
            ])),
        },
        RequestDefinition {
            method: ProbeMethod::Read,
            path_template: "/v1/files/:file_key/comments".to_string(),
            body_spec: None,
            expected_schema: Some(BTreeMap::from([(
                "comments".to_string(),
                TypeTag::Array,
            )])),
        },
        RequestDefinition {
            method: ProbeMethod::Read,
            path_template: "/v1/files/:file_key/comments/:comment_id/reactions".to_string(),
            body_spec: None,
            expected_schema: None,
        },
        RequestDefinition {
            method: ProbeMethod::Read,
            path_template: "/v1/files/:file_key/images".to_string(),
            body_spec: Some(json!({"ids": "0:1"})),
            expected_schema: None,
        },
        RequestDefinition {
            method: ProbeMethod::Read,
            path_template: "/v1/files/:file_key/nodes".to_string(),
            body_spec: Some(json!({"ids": "0:1"})),
            expected_schema: Some(BTreeMap::from([("nodes".to_string(), TypeTag::Object)])),
        },
        RequestDefinition {
            method: ProbeMethod::Read,
            path_template: "/v1/files/:file_key/versions".to_string(),
            body_spec: None,
            expected_schema: Some(BTreeMap::from([(
                "versions".to_string(),
                TypeTag::Array,
            )])),
        },
        RequestDefinition {
            method: ProbeMethod::Read,
            path_template: "/v1/images/:file_key".to_string(),
            body_spec: Some(json!({"ids": "0:1"})),
            expected_schema: None,
        },
        // Writes with their required parameters
        RequestDefinition {
            method: ProbeMethod::Write,
            path_template: "/v1/files/:file_key/comments".to_string(),
            body_spec: Some(json!({
                "message": "Test comment",
                "client_meta": {
                    "node_id": "1:1",
                    "node_offset": {"x": 0, "y": 0},
                },
            })),
            expected_schema: None,
        },
        RequestDefinition {
            method: ProbeMethod::Write,
            path_template: "/v1/files/:file_key/comments/:comment_id/reactions".to_string(),
            body_spec: Some(json!({"reaction_type": ":+1:"})),
            expected_schema: None,
        },
        RequestDefinition {
            method: ProbeMethod::Write,
            path_template: "/v1/dev_resources".to_string(),
            body_spec: Some(json!({
                "dev_resources": [{
                    "name": "Test Resource",
                    "url": "https://example.com",
                    "node_id": "1:1",
                }],
            })),
            expected_schema: None,
        },
        RequestDefinition {
            method: ProbeMethod::Write,
            path_template: "/v2/webhooks".to_string(),
            body_spec: Some(json!({
                "team_id": ":team_id",
                "event_type": "FILE_UPDATE",
                "endpoint": "https://example.com/webhook",
            })),
            expected_schema: None,
        },
        RequestDefinition {
            method: ProbeMethod::Write,
            path_template: "/v1/files/:file_key/variables".to_string(),
            body_spec: Some(json!({
                "variables": [{
                    "name": "Test Variable",
                    "type": "STRING",
                    "value": "test",
                }],
            })),
            expected_schema: None,
        },
    ]
}

/// Definitions of one access class, in catalog order.
pub fn list_by_method(
    definitions: &[RequestDefinition],
    method: ProbeMethod,
) -> Vec<&RequestDefinition> {
    definitions
        .iter()
        .filter(|definition| definition.method == method)
        .collect()
}

/// Load a custom catalog file. An entry with an unsupported method label is
/// reported and skipped; the remaining entries still load.
pub fn load_custom(path: &Path) -> Result<Vec<RequestDefinition>, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let entries: Vec<RawDefinition> =
        serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
            path: path.display().to_string(),
            source,
        })?;

    let mut definitions = Vec::with_capacity(entries.len());
    for entry in entries {
        match ProbeMethod::from_label(&entry.method) {
            Some(method) => definitions.push(RequestDefinition {
                method,
                path_template: entry.path,
                body_spec: entry.body,
                expected_schema: entry.expected_schema,
            }),
            None => {
                let skipped = CatalogError::UnsupportedMethod {
                    label: entry.method,
                    path_template: entry.path,
                };
                tracing::warn!("skipping catalog entry: {skipped}");
            }
        }
    }
    Ok(definitions)
}
