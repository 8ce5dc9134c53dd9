use std::sync::Arc;

use serde_json::Value;
use vigil_core::{FieldDiff, RemoteId, TrackingId};

use crate::actual::RemoteResource;
use crate::desired::DesiredResource;
use crate::kind::Kind;

/// A desired resource with no remote counterpart.
#[derive(Debug, Clone)]
pub struct Create {
    pub desired: Arc<DesiredResource>,
    /// Stamped payload; may still hold references to resources created
    /// earlier in the same run.
    pub payload: Value,
}

/// A matched pair whose payloads differ.
#[derive(Debug, Clone)]
pub struct Update {
    pub id: RemoteId,
    pub desired: Arc<DesiredResource>,
    pub actual: RemoteResource,
    pub diff: Vec<FieldDiff>,
    /// Payload sent on apply.
    pub payload: Value,
}

/// A managed resource no longer declared.
#[derive(Debug, Clone)]
pub struct Delete {
    pub id: RemoteId,
    pub kind: Kind,
    pub tracking_id: TrackingId,
}

/// Everything needed to bring the remote in line with the definitions.
///
/// Deletes are kept in kind order: dashboards, then SLOs, then monitors.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub create: Vec<Create>,
    pub update: Vec<Update>,
    pub delete: Vec<Delete>,
}

/// Borrowed view of one planned action, in apply order.
#[derive(Debug, Clone, Copy)]
pub enum PlanEntry<'a> {
    Create(&'a Create),
    Update(&'a Update),
    Delete(&'a Delete),
}

impl PlanEntry<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Create(c) => c.desired.kind(),
            Self::Update(u) => u.desired.kind(),
            Self::Delete(d) => d.kind,
        }
    }

    pub fn tracking_id(&self) -> &TrackingId {
        match self {
            Self::Create(c) => c.desired.tracking_id(),
            Self::Update(u) => u.desired.tracking_id(),
            Self::Delete(d) => &d.tracking_id,
        }
    }
}

impl Plan {
    pub fn is_noop(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }

    pub fn len(&self) -> usize {
        self.create.len() + self.update.len() + self.delete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_noop()
    }

    /// Creates, then updates, then deletes.
    pub fn entries(&self) -> impl Iterator<Item = PlanEntry<'_>> {
        self.create
            .iter()
            .map(PlanEntry::Create)
            .chain(self.update.iter().map(PlanEntry::Update))
            .chain(self.delete.iter().map(PlanEntry::Delete))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::kinds;

    #[test]
    fn entries_follow_apply_order() {
        let desired = Arc::new(DesiredResource::from_payload(
            &kinds::MONITOR,
            "a:new".into(),
            json!({}),
        ));
        let plan = Plan {
            create: vec![Create {
                payload: desired.payload().clone(),
                desired,
            }],
            update: vec![],
            delete: vec![Delete {
                id: RemoteId::Int(1),
                kind: &kinds::DASHBOARD,
                tracking_id: "a:old".into(),
            }],
        };

        assert!(!plan.is_noop());
        assert_eq!(plan.len(), 2);
        let names: Vec<_> = plan.entries().map(|e| e.tracking_id().to_string()).collect();
        assert_eq!(names, ["a:new", "a:old"]);
    }

    #[test]
    fn default_plan_is_noop() {
        assert!(Plan::default().is_noop());
    }
}
