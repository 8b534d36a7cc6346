//! Audit trail: human-readable log entries derived from edit diffs.
//!
//! DESIGN
//! ======
//! Entries are derived, never hand-written at call sites: the store hands the
//! before/after edit to [`diff_edit`], which compares geometry at integer
//! precision (sub-unit jitter from drags never spams the log) and every
//! kind-specific field by JSON value equality. Lifecycle operations (create,
//! delete, reorder, ...) use [`AuditContext::entry`] directly.

#[cfg(test)]
#[path = "audit_test.rs"]
mod audit_test;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::doc::Edit;

/// What kind of change an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Place,
    Move,
    Resize,
    Rotate,
    Update,
    Duplicate,
    Delete,
    Reorder,
    MoveToFloorplan,
    CopyToPages,
    Undo,
    Redo,
}

/// One audit log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: Uuid,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
    pub user_id: String,
    pub action: AuditAction,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Who is acting and when, stamped onto every entry produced in one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditContext {
    pub user_id: String,
    pub timestamp: i64,
}

impl AuditContext {
    /// Context stamped with the current wall-clock time.
    #[must_use]
    pub fn now(user_id: &str) -> Self {
        Self { user_id: user_id.to_string(), timestamp: now_ms() }
    }

    #[must_use]
    pub fn entry(&self, action: AuditAction, description: String, details: Option<Value>) -> AuditLogEntry {
        AuditLogEntry {
            id: Uuid::new_v4(),
            timestamp: self.timestamp,
            user_id: self.user_id.clone(),
            action,
            description,
            details,
        }
    }
}

fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

/// Produce one entry per observable difference between `before` and `after`.
///
/// Identical edits produce nothing.
#[must_use]
pub fn diff_edit(before: &Edit, after: &Edit, ctx: &AuditContext) -> Vec<AuditLogEntry> {
    let mut entries = Vec::new();
    let name = before.display_name();
    let id = after.id();
    let (b, a) = (&before.frame, &after.frame);

    if b.page_index != a.page_index {
        let description = match (b.page_index, a.page_index) {
            (None, Some(p)) => format!("Placed {name} on page {}", p + 1),
            (Some(from), Some(to)) => format!("Moved {name} from page {} to page {}", from + 1, to + 1),
            (Some(from), None) => format!("Unplaced {name} from page {}", from + 1),
            (None, None) => String::new(),
        };
        entries.push(ctx.entry(AuditAction::Place, description, Some(json!({ "editId": id }))));
    }

    if rounded(b.x) != rounded(a.x) || rounded(b.y) != rounded(a.y) {
        entries.push(ctx.entry(
            AuditAction::Move,
            format!(
                "Moved {name} from ({}, {}) to ({}, {})",
                rounded(b.x),
                rounded(b.y),
                rounded(a.x),
                rounded(a.y)
            ),
            Some(json!({ "editId": id, "from": [b.x, b.y], "to": [a.x, a.y] })),
        ));
    }

    if rounded(b.width) != rounded(a.width) || rounded(b.height) != rounded(a.height) {
        entries.push(ctx.entry(
            AuditAction::Resize,
            format!(
                "Resized {name} from {}×{} to {}×{}",
                rounded(b.width),
                rounded(b.height),
                rounded(a.width),
                rounded(a.height)
            ),
            Some(json!({ "editId": id, "from": [b.width, b.height], "to": [a.width, a.height] })),
        ));
    }

    if rounded(b.rotation) != rounded(a.rotation) {
        entries.push(ctx.entry(
            AuditAction::Rotate,
            format!("Rotated {name} from {}° to {}°", rounded(b.rotation), rounded(a.rotation)),
            Some(json!({ "editId": id, "from": b.rotation, "to": a.rotation })),
        ));
    }

    let (Ok(before_kind), Ok(after_kind)) = (serde_json::to_value(&before.kind), serde_json::to_value(&after.kind))
    else {
        return entries;
    };
    let (Some(before_kind), Some(after_kind)) = (before_kind.as_object(), after_kind.as_object()) else {
        return entries;
    };

    for (key, new_value) in after_kind {
        if key == "data" {
            let empty = Map::new();
            let old_data = before_kind.get("data").and_then(Value::as_object).unwrap_or(&empty);
            if let Some(new_data) = new_value.as_object() {
                diff_fields(old_data, new_data, &name, id, ctx, &mut entries);
            }
            continue;
        }
        diff_field(key, before_kind.get(key), new_value, &name, id, ctx, &mut entries);
    }

    entries
}

fn diff_fields(
    old: &Map<String, Value>,
    new: &Map<String, Value>,
    name: &str,
    id: Uuid,
    ctx: &AuditContext,
    out: &mut Vec<AuditLogEntry>,
) {
    for (key, new_value) in new {
        diff_field(key, old.get(key), new_value, name, id, ctx, out);
    }
}

fn diff_field(
    key: &str,
    old_value: Option<&Value>,
    new_value: &Value,
    name: &str,
    id: Uuid,
    ctx: &AuditContext,
    out: &mut Vec<AuditLogEntry>,
) {
    if old_value == Some(new_value) {
        return;
    }
    let field = humanize_field(key);
    let from = old_value.map_or_else(|| "(empty)".to_string(), format_value);
    let to = format_value(new_value);
    out.push(ctx.entry(
        AuditAction::Update,
        format!("Changed {field} on {name} from {from} to {to}"),
        Some(json!({ "editId": id, "field": key, "from": old_value, "to": new_value })),
    ));
}

#[allow(clippy::cast_possible_truncation)]
fn rounded(v: f64) -> i64 {
    v.round() as i64
}

/// Render a JSON value for a description: strings quoted, numbers trimmed.
#[must_use]
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "(empty)".to_string(),
        Value::String(s) => format!("\"{s}\""),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() != 0.0 => {
                let s = format!("{f:.2}");
                s.trim_end_matches('0').trim_end_matches('.').to_string()
            }
            _ => n.to_string(),
        },
        Value::Bool(b) => (if *b { "yes" } else { "no" }).to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// `fieldOfViewAngle` → `Field Of View Angle`, `stroke_width` → `Stroke Width`.
#[must_use]
pub fn humanize_field(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in key.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if ch.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
            current.push(ch);
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
