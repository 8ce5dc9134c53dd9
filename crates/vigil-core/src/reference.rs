//! Placeholders for "the remote id of resource X".
//!
//! A desired payload names another resource by embedding
//! `{"$ref": "<tracking id>"}` wherever the remote id belongs. The object
//! form keeps references apart from ordinary strings, so no pattern
//! matching on payload text is needed.

use serde_json::{Map, Value};

use crate::error::{UnresolvedReason, ValidationError};
use crate::ids::TrackingId;
use crate::table::{IdTable, Resolution};

pub const REF_KEY: &str = "$ref";

/// Placeholder value pointing at `target`.
pub fn reference(target: &TrackingId) -> Value {
    let mut map = Map::new();
    map.insert(REF_KEY.to_string(), Value::from(target.as_str()));
    Value::Object(map)
}

/// The tracking id if `value` is a placeholder.
pub fn as_reference(value: &Value) -> Option<TrackingId> {
    let obj = value.as_object()?;
    if obj.len() != 1 {
        return None;
    }
    obj.get(REF_KEY)?.as_str().map(TrackingId::new)
}

/// Every placeholder inside `value`, with its field path, in document order.
pub fn references(value: &Value) -> Vec<(String, TrackingId)> {
    let mut found = Vec::new();
    collect(value, String::new(), &mut found);
    found
}

fn collect(value: &Value, path: String, found: &mut Vec<(String, TrackingId)>) {
    if let Some(target) = as_reference(value) {
        found.push((path, target));
        return;
    }
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                collect(child, child_path(&path, key), found);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                collect(child, format!("{path}[{i}]"), found);
            }
        }
        _ => {}
    }
}

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

/// True when every placeholder maps to a concrete remote id.
pub fn is_resolved(value: &Value, table: &IdTable) -> bool {
    references(value)
        .iter()
        .all(|(_, target)| matches!(table.get(target), Some(Resolution::Existing(_))))
}

/// Explain the first placeholder that does not map to a concrete id.
pub fn resolve_or_explain(
    owner: &TrackingId,
    value: &Value,
    table: &IdTable,
) -> Result<(), ValidationError> {
    for (field, target) in references(value) {
        let reason = match table.get(&target) {
            Some(Resolution::Existing(_)) => continue,
            Some(Resolution::Pending) => UnresolvedReason::Pending,
            None => UnresolvedReason::Unknown,
        };
        return Err(ValidationError {
            owner: owner.clone(),
            field,
            target,
            reason,
        });
    }
    Ok(())
}

/// Replace placeholders with concrete ids where the table has one.
///
/// Pending placeholders stay in place so they can be resolved once the
/// referenced resource is created. A reference to something the table has
/// never heard of is an error.
pub fn rewrite(
    owner: &TrackingId,
    value: &mut Value,
    table: &IdTable,
) -> Result<(), ValidationError> {
    rewrite_at(owner, value, String::new(), table)
}

fn rewrite_at(
    owner: &TrackingId,
    value: &mut Value,
    path: String,
    table: &IdTable,
) -> Result<(), ValidationError> {
    if let Some(target) = as_reference(value) {
        match table.get(&target) {
            Some(Resolution::Existing(id)) => *value = id.to_value(),
            Some(Resolution::Pending) => {}
            None => {
                return Err(ValidationError {
                    owner: owner.clone(),
                    field: path,
                    target,
                    reason: UnresolvedReason::Unknown,
                });
            }
        }
        return Ok(());
    }
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                rewrite_at(owner, child, child_path(&path, key), table)?;
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter_mut().enumerate() {
                rewrite_at(owner, child, format!("{path}[{i}]"), table)?;
            }
        }
        _ => {}
    }
    Ok(())
}
