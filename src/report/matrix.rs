use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::http::method::ProbeMethod;
use crate::runner::Outcome;

const PASS_GLYPH: &str = "✅";
const FAIL_GLYPH: &str = "❌";
const NOT_ATTEMPTED: &str = "N/A";

/// Render the permission matrix as CSV: one row per `(method, resolved
/// path)` in the supplied order, one column per role in credential order.
/// Cells show a pass glyph, a fail glyph annotated with the HTTP status when
/// one was observed, or an explicit not-attempted marker. When duplicate
/// outcomes exist for a cell, the latest one wins.
pub fn matrix_document(
    outcomes: &[Outcome],
    rows: &[(ProbeMethod, String)],
    roles: &[String],
    generated_at: DateTime<Utc>,
) -> String {
    let cells = cell_map(outcomes);

    // Rows are distinct resolved paths; the first occurrence fixes the row
    // position and the method shown.
    let mut seen = HashSet::new();
    let mut distinct_rows = Vec::with_capacity(rows.len());
    for (method, path) in rows {
        if seen.insert(path.as_str()) {
            distinct_rows.push((method, path));
        }
    }

    let mut lines = Vec::with_capacity(distinct_rows.len() + 2);
    lines.push(format!("# Generated: {}", generated_at.to_rfc3339()));
    lines.push(format!("Method,Endpoint,{}", roles.join(",")));

    for (method, path) in distinct_rows {
        let mut row = vec![method.to_string(), path.clone()];
        for role in roles {
            let cell = cells
                .get(&(path.as_str(), role.as_str()))
                .map(|outcome| render_cell(outcome))
                .unwrap_or_else(|| NOT_ATTEMPTED.to_string());
            row.push(cell);
        }
        lines.push(row.join(","));
    }

    lines.join("\n")
}

fn cell_map<'a>(outcomes: &'a [Outcome]) -> HashMap<(&'a str, &'a str), &'a Outcome> {
    let mut cells = HashMap::new();
    for outcome in outcomes {
        // Later outcomes overwrite earlier ones for the same cell.
        cells.insert(
            (outcome.resolved_path.as_str(), outcome.role.as_str()),
            outcome,
        );
    }
    cells
}

fn render_cell(outcome: &Outcome) -> String {
    if outcome.succeeded {
        return PASS_GLYPH.to_string();
    }
    match outcome.error.as_ref().and_then(|error| error.status) {
        Some(status) => format!("{FAIL_GLYPH} {status}"),
        None => FAIL_GLYPH.to_string(),
    }
}
