use std::collections::HashMap;

use crate::ids::{RemoteId, TrackingId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Existing(RemoteId),
    /// Declared in the desired set, not created yet.
    Pending,
}

/// Tracking id -> remote id (or pending) for every resource known in a run.
///
/// Built once from actual and desired resources before diffing. During
/// apply it only grows: pending entries become concrete as creations land.
#[derive(Debug, Clone, Default)]
pub struct IdTable {
    entries: HashMap<TrackingId, Resolution>,
}

impl IdTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A live remote resource carries this tracking id.
    pub fn record_existing(&mut self, tracking_id: TrackingId, id: RemoteId) {
        self.entries.insert(tracking_id, Resolution::Existing(id));
    }

    /// A desired resource will exist once created; keeps any known id.
    pub fn declare_pending(&mut self, tracking_id: TrackingId) {
        self.entries.entry(tracking_id).or_insert(Resolution::Pending);
    }

    /// A creation completed during apply.
    pub fn insert_created(&mut self, tracking_id: TrackingId, id: RemoteId) {
        self.entries.insert(tracking_id, Resolution::Existing(id));
    }

    pub fn get(&self, tracking_id: &TrackingId) -> Option<&Resolution> {
        self.entries.get(tracking_id)
    }

    pub fn remote_id(&self, tracking_id: &TrackingId) -> Option<&RemoteId> {
        match self.entries.get(tracking_id) {
            Some(Resolution::Existing(id)) => Some(id),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
