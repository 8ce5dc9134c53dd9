use serde_json::{json, Value};
use vigil_core::RemoteId;

use crate::kind::{backfill, ResourceKind};

#[derive(Debug)]
pub struct Dashboard;

impl ResourceKind for Dashboard {
    fn api_resource(&self) -> &'static str {
        "dashboard"
    }

    fn tracking_field(&self) -> &'static str {
        "description"
    }

    fn read_only_fields(&self) -> &'static [&'static str] {
        &["author_handle", "author_name", "url", "is_read_only"]
    }

    // The list endpoint omits widgets.
    fn needs_details(&self) -> bool {
        true
    }

    fn url_path(&self, id: &RemoteId) -> String {
        format!("/dashboard/{id}")
    }

    fn render(&self, mut definition: Value) -> Value {
        backfill(&mut definition, "description", json!(""));
        backfill(&mut definition, "template_variables", json!([]));
        backfill(&mut definition, "widgets", json!([]));
        definition
    }
}
