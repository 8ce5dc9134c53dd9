use std::fmt;
use std::sync::OnceLock;

use serde_json::Value;
use vigil_core::{RemoteId, TrackingId};

use crate::kind::Kind;

type Definition = Box<dyn Fn() -> Value + Send + Sync>;

/// A resource the user wants to exist.
///
/// The payload is produced lazily by the definition closure and then passed
/// through the kind's `render`; the result is memoized, so rendering runs at
/// most once per instance however often the engine asks for it.
pub struct DesiredResource {
    kind: Kind,
    tracking_id: TrackingId,
    id: Option<RemoteId>,
    definition: Definition,
    rendered: OnceLock<Value>,
}

impl DesiredResource {
    pub fn new<F>(kind: Kind, tracking_id: TrackingId, definition: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self {
            kind,
            tracking_id,
            id: None,
            definition: Box::new(definition),
            rendered: OnceLock::new(),
        }
    }

    /// Definition given as a ready JSON value.
    pub fn from_payload(kind: Kind, tracking_id: TrackingId, payload: Value) -> Self {
        Self::new(kind, tracking_id, move || payload.clone())
    }

    /// Pin the resource to an existing remote id. A pinned resource is
    /// never created; it must already exist.
    pub fn with_id(mut self, id: RemoteId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn tracking_id(&self) -> &TrackingId {
        &self.tracking_id
    }

    pub fn id(&self) -> Option<&RemoteId> {
        self.id.as_ref()
    }

    pub fn project(&self) -> &str {
        self.tracking_id.project()
    }

    /// Rendered payload, without tracking marker or resolved references.
    pub fn payload(&self) -> &Value {
        self.rendered
            .get_or_init(|| self.kind.render((self.definition)()))
    }
}

impl fmt::Debug for DesiredResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesiredResource")
            .field("kind", &self.kind.api_resource())
            .field("tracking_id", &self.tracking_id)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
