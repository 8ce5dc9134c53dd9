use serde_json::{json, Value};
use vigil_core::{reference, IdTable, RemoteId, TrackingId, ValidationError};

use crate::kind::{backfill, ResourceKind};

#[derive(Debug)]
pub struct Monitor;

impl ResourceKind for Monitor {
    fn api_resource(&self) -> &'static str {
        "monitor"
    }

    fn tracking_field(&self) -> &'static str {
        "message"
    }

    fn read_only_fields(&self) -> &'static [&'static str] {
        &["overall_state", "overall_state_modified", "matching_downtimes", "multi"]
    }

    // Downtimes are not part of the definition; skip them to keep lists small.
    fn list_params(&self) -> &'static [(&'static str, &'static str)] {
        &[("with_downtimes", "false")]
    }

    fn url_path(&self, id: &RemoteId) -> String {
        format!("/monitors/{id}")
    }

    fn render(&self, mut definition: Value) -> Value {
        backfill(&mut definition, "message", json!(""));
        backfill(&mut definition, "tags", json!([]));
        backfill(&mut definition, "options", json!({}));
        definition
    }

    /// Composite monitors may give `query` as a list of segments mixing text
    /// and references, e.g. `["(", {"$ref": "a:b"}, " && ", {"$ref": "a:c"}, ")"]`.
    /// Once every segment is concrete the list is joined into the query
    /// string the API expects.
    fn rewrite_references(
        &self,
        owner: &TrackingId,
        payload: &mut Value,
        ids: &IdTable,
    ) -> Result<(), ValidationError> {
        reference::rewrite(owner, payload, ids)?;

        let Some(Value::Array(segments)) = payload.get("query") else {
            return Ok(());
        };
        let joined: Option<String> = segments
            .iter()
            .map(|segment| match segment {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect();
        if let (Some(query), Value::Object(map)) = (joined, payload) {
            map.insert("query".into(), Value::from(query));
        }
        Ok(())
    }
}
