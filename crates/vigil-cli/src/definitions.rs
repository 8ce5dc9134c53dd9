//! Loading declared resources from a definitions file.
//!
//! ```json
//! { "projects": [
//!     { "id": "teamA", "resources": [
//!         { "kind": "monitor", "id": "cpu", "payload": { "name": "CPU high" } },
//!         { "kind": "slo", "id": "latency", "remote_id": "abc123", "payload": {} }
//!     ] }
//! ] }
//! ```

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use vigil_core::{RemoteId, TrackingId};
use vigil_syncer::{kinds, DesiredResource};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DefinitionsFile {
    projects: Vec<ProjectDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectDef {
    id: String,
    #[serde(default)]
    resources: Vec<ResourceDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResourceDef {
    kind: String,
    id: String,
    /// Pins the definition to a resource that already exists remotely.
    #[serde(default)]
    remote_id: Option<RemoteId>,
    payload: Value,
}

pub fn load(path: &Path) -> eyre::Result<Vec<DesiredResource>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read definitions at {}: {e}", path.display()))?;
    parse(&contents)
        .map_err(|e| eyre::eyre!("invalid definitions in {}: {e}", path.display()))
}

pub fn parse(contents: &str) -> eyre::Result<Vec<DesiredResource>> {
    let file: DefinitionsFile = serde_json::from_str(contents)?;
    let mut desired = Vec::new();
    for project in file.projects {
        check_segment("project id", &project.id)?;
        for resource in project.resources {
            check_segment("resource id", &resource.id)?;
            let tracking_id = TrackingId::from_parts(&project.id, &resource.id);
            let kind = kinds::by_name(&resource.kind).ok_or_else(|| {
                let known: Vec<_> = kinds::all().iter().map(|k| k.api_resource()).collect();
                eyre::eyre!(
                    "{tracking_id}: unknown kind {:?}, expected one of {}",
                    resource.kind,
                    known.join(", ")
                )
            })?;
            if !resource.payload.is_object() {
                eyre::bail!("{tracking_id}: payload must be a JSON object");
            }

            let mut d = DesiredResource::from_payload(kind, tracking_id, resource.payload);
            if let Some(id) = resource.remote_id {
                d = d.with_id(id);
            }
            desired.push(d);
        }
    }
    tracing::debug!(count = desired.len(), "definitions loaded");
    Ok(desired)
}

/// Tracking ids are `project:name` and must survive embedding in free text.
fn check_segment(what: &str, value: &str) -> eyre::Result<()> {
    if value.is_empty() || value.contains(':') || value.chars().any(char::is_whitespace) {
        eyre::bail!("{what} {value:?} must be non-empty without ':' or whitespace");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;

    #[test]
    fn parses_projects_and_resources() {
        let desired = parse(
            &json!({
                "projects": [
                    {"id": "teamA", "resources": [
                        {"kind": "monitor", "id": "cpu", "payload": {"name": "cpu"}},
                        {"kind": "slo", "id": "latency", "remote_id": "abc", "payload": {}},
                    ]},
                    {"id": "teamB", "resources": [
                        {"kind": "dashboard", "id": "overview", "remote_id": null, "payload": {"title": "o"}},
                    ]},
                ]
            })
            .to_string(),
        )
        .unwrap();

        let summary: Vec<_> = desired
            .iter()
            .map(|d| (d.kind().api_resource(), d.tracking_id().to_string(), d.id().cloned()))
            .collect();
        assert_eq!(
            summary,
            [
                ("monitor", "teamA:cpu".to_string(), None),
                ("slo", "teamA:latency".to_string(), Some(RemoteId::from("abc"))),
                ("dashboard", "teamB:overview".to_string(), None),
            ]
        );
        assert_eq!(desired[0].payload()["name"], json!("cpu"));
    }

    #[test]
    fn numeric_remote_id() {
        let desired = parse(
            r#"{"projects": [{"id": "a", "resources": [
                {"kind": "monitor", "id": "m", "remote_id": 42, "payload": {}}
            ]}]}"#,
        )
        .unwrap();
        assert_eq!(desired[0].id(), Some(&RemoteId::Int(42)));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = parse(
            r#"{"projects": [{"id": "a", "resources": [
                {"kind": "synthetic", "id": "s", "payload": {}}
            ]}]}"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "a:s: unknown kind \"synthetic\", expected one of dashboard, slo, monitor"
        );
    }

    #[test]
    fn colon_in_ids_is_rejected() {
        let err = parse(r#"{"projects": [{"id": "a:b", "resources": []}]}"#).unwrap_err();
        assert!(err.to_string().contains("project id"));
    }

    #[test]
    fn payload_must_be_object() {
        let err = parse(
            r#"{"projects": [{"id": "a", "resources": [
                {"kind": "monitor", "id": "m", "payload": [1]}
            ]}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "a:m: payload must be a JSON object");
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"projects": [{{"id": "a", "resources": []}}]}}"#).unwrap();
        assert!(load(file.path()).unwrap().is_empty());
    }

    #[test]
    fn load_reports_path_on_missing_file() {
        let err = load(Path::new("/nonexistent/vigil.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/vigil.json"));
    }
}
