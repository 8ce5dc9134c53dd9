use serde_json::{json, Value};
use vigil_core::RemoteId;

use crate::kind::{backfill, ResourceKind};

#[derive(Debug)]
pub struct Slo;

impl ResourceKind for Slo {
    fn api_resource(&self) -> &'static str {
        "slo"
    }

    fn tracking_field(&self) -> &'static str {
        "description"
    }

    fn read_only_fields(&self) -> &'static [&'static str] {
        &["monitor_tags", "configured_alert_ids", "sli_specification"]
    }

    fn url_path(&self, id: &RemoteId) -> String {
        format!("/slo?slo_id={id}")
    }

    fn render(&self, mut definition: Value) -> Value {
        backfill(&mut definition, "description", json!(""));
        backfill(&mut definition, "tags", json!([]));
        definition
    }
}
