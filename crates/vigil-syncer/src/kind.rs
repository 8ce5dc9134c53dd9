use std::fmt;

use serde_json::{Map, Value};
use vigil_core::{json_diff, reference, FieldDiff, IdTable, RemoteId, TrackingId, ValidationError};

use crate::tracking;

/// Handle to one of the registered resource kinds.
pub type Kind = &'static dyn ResourceKind;

/// Kinds that may reference others are deleted before the kinds they
/// reference: dashboards show monitors and SLOs, SLOs are built from
/// monitors.
pub const DELETE_ORDER: [&str; 3] = ["dashboard", "slo", "monitor"];

/// Fields the remote service manages itself on every kind.
const READ_ONLY: &[&str] = &[
    "id",
    "created",
    "created_at",
    "creator",
    "deleted",
    "modified",
    "modified_at",
    "org_id",
];

/// One impl per remote resource type.
///
/// Holds everything kind-specific the engine needs: how a definition
/// becomes a payload, where the tracking id lives, how references are
/// resolved and how drift is computed.
pub trait ResourceKind: Send + Sync + fmt::Debug {
    /// Collection name in the API path, e.g. "monitor".
    fn api_resource(&self) -> &'static str;

    /// Text field carrying the tracking marker.
    fn tracking_field(&self) -> &'static str;

    /// Server-managed fields ignored when diffing, on top of the common ones.
    fn read_only_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// Extra query params when listing.
    fn list_params(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// List payloads are partial and need a `show` per item before diffing.
    fn needs_details(&self) -> bool {
        false
    }

    /// Web UI path of a resource, relative to the service root.
    fn url_path(&self, id: &RemoteId) -> String;

    /// Turn a declared definition into the wire payload, backfilling the
    /// defaults the remote fills in so they do not show up as drift.
    fn render(&self, definition: Value) -> Value {
        definition
    }

    fn parse_tracking_id(&self, payload: &Value) -> Option<TrackingId> {
        payload
            .get(self.tracking_field())
            .and_then(Value::as_str)
            .and_then(tracking::parse)
    }

    fn add_tracking_id(&self, payload: &mut Value, tracking_id: &TrackingId) {
        let field = self.tracking_field();
        let current = payload.get(field).and_then(Value::as_str).unwrap_or_default();
        let stamped = tracking::stamp(current, tracking_id);
        set_field(payload, field, Value::from(stamped));
    }

    fn remove_tracking_id(&self, payload: &mut Value) {
        let field = self.tracking_field();
        if let Some(current) = payload.get(field).and_then(Value::as_str) {
            let stripped = tracking::strip(current);
            set_field(payload, field, Value::from(stripped));
        }
    }

    /// Replace references that already have a remote id. Pending ones stay
    /// as placeholders until their target is created.
    fn rewrite_references(
        &self,
        owner: &TrackingId,
        payload: &mut Value,
        ids: &IdTable,
    ) -> Result<(), ValidationError> {
        reference::rewrite(owner, payload, ids)
    }

    /// Drift from `actual` to `desired`, ignoring server-managed fields.
    fn diff(&self, desired: &Value, actual: &Value) -> Vec<FieldDiff> {
        let mut actual = actual.clone();
        if let Value::Object(map) = &mut actual {
            for field in READ_ONLY.iter().chain(self.read_only_fields()) {
                map.remove(*field);
            }
        }
        let mut desired = desired.clone();
        if let Value::Object(map) = &mut desired {
            map.remove("id");
        }
        json_diff(&actual, &desired)
    }
}

/// Position of `kind` in [`DELETE_ORDER`].
pub fn delete_rank(kind: Kind) -> usize {
    DELETE_ORDER
        .iter()
        .position(|name| *name == kind.api_resource())
        .unwrap_or(DELETE_ORDER.len())
}

pub fn same_kind(a: Kind, b: Kind) -> bool {
    a.api_resource() == b.api_resource()
}

/// Set `field` on an object payload; a non-object payload becomes one.
pub(crate) fn set_field(payload: &mut Value, field: &str, value: Value) {
    if !payload.is_object() {
        *payload = Value::Object(Map::new());
    }
    if let Value::Object(map) = payload {
        map.insert(field.to_string(), value);
    }
}

/// Insert `default` under `field` unless the definition sets it.
pub(crate) fn backfill(payload: &mut Value, field: &str, default: Value) {
    if let Value::Object(map) = payload {
        map.entry(field.to_string()).or_insert(default);
    }
}
