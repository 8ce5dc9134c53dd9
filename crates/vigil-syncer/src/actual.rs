use serde_json::Value;
use vigil_api::ApiError;
use vigil_core::{RemoteId, TrackingId};

use crate::kind::Kind;

/// A resource as it currently exists on the remote service.
#[derive(Debug, Clone)]
pub struct RemoteResource {
    pub kind: Kind,
    pub id: RemoteId,
    /// Set when the resource carries a tracking marker, i.e. it is managed.
    pub tracking_id: Option<TrackingId>,
    pub payload: Value,
}

impl RemoteResource {
    /// Wrap a listed payload, reading its id and tracking marker.
    pub fn annotate(kind: Kind, payload: Value) -> Result<Self, ApiError> {
        let id = RemoteId::of(&payload).ok_or_else(|| ApiError::UnexpectedResponse {
            path: format!("/api/v1/{}", kind.api_resource()),
            detail: "listed resource without id".into(),
        })?;
        let tracking_id = kind.parse_tracking_id(&payload);
        Ok(Self {
            kind,
            id,
            tracking_id,
            payload,
        })
    }

    /// Managed resources outside `project` are not ours to touch.
    pub fn in_scope(&self, project: &str) -> bool {
        self.tracking_id
            .as_ref()
            .is_none_or(|tid| tid.belongs_to(project))
    }
}
