use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::runner::Outcome;

/// Per-role entry within one endpoint group of the detail log.
#[derive(Debug, Serialize)]
struct DetailEntry {
    role: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<DetailError>,
}

#[derive(Debug, Serialize)]
struct DetailError {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    message: String,
}

/// Render the grouped detail log as YAML. Outcomes are grouped under a
/// `METHOD /resolved/path` key in first-seen order; each group lists its
/// per-role outcomes in pair-iteration order with full error detail. This is
/// the audit trail counterpart to the matrix summary.
pub fn detail_document(outcomes: &[Outcome]) -> Result<String, serde_yaml::Error> {
    // serde_yaml's Mapping preserves insertion order, which keeps the group
    // order deterministic.
    let mut groups = Mapping::new();

    for outcome in outcomes {
        let key = Value::String(format!("{} {}", outcome.method, outcome.resolved_path));
        let entry = serde_yaml::to_value(DetailEntry {
            role: outcome.role.clone(),
            status: if outcome.succeeded { "success" } else { "failed" },
            error: outcome.error.as_ref().map(|error| DetailError {
                status: error.status,
                message: error.message.clone(),
            }),
        })?;

        let group = groups
            .entry(key)
            .or_insert_with(|| Value::Sequence(Vec::new()));
        if let Value::Sequence(entries) = group {
            entries.push(entry);
        }
    }

    let mut root = Mapping::new();
    root.insert(
        Value::String("results".to_string()),
        Value::Mapping(groups),
    );
    serde_yaml::to_string(&Value::Mapping(root))
}
