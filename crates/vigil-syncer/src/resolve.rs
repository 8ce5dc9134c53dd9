//! Dependency-ordered processing of plan entries.
//!
//! A payload may reference resources created earlier in the same run.
//! The queue hands out entries whose references all resolve, and reports
//! the first stuck entry once a full pass makes no progress.

use std::collections::VecDeque;

use serde_json::Value;
use vigil_core::{reference, IdTable, TrackingId, ValidationError};

use crate::plan::{Create, Update};

/// An entry carrying a payload that may still hold references.
pub trait Resolvable {
    fn tracking_id(&self) -> &TrackingId;
    fn payload(&self) -> &Value;
}

impl Resolvable for Create {
    fn tracking_id(&self) -> &TrackingId {
        self.desired.tracking_id()
    }

    fn payload(&self) -> &Value {
        &self.payload
    }
}

impl Resolvable for Update {
    fn tracking_id(&self) -> &TrackingId {
        self.desired.tracking_id()
    }

    fn payload(&self) -> &Value {
        &self.payload
    }
}

#[derive(Debug)]
pub struct ResolutionQueue<T> {
    remaining: VecDeque<T>,
    /// Items inspected since something was last handed out.
    stalled: usize,
}

impl<T: Resolvable> ResolutionQueue<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            remaining: items.into_iter().collect(),
            stalled: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Next entry whose references are all concrete in `ids`.
    ///
    /// Scans in passes over the remaining entries, keeping their order.
    /// The caller may grow `ids` between calls (e.g. after a create), which
    /// can unblock entries skipped earlier. Returns `Ok(None)` once empty.
    /// When a whole pass finds nothing resolvable, the first remaining
    /// entry is explained as a [`ValidationError`].
    pub fn next_resolved(&mut self, ids: &IdTable) -> Result<Option<T>, ValidationError> {
        while let Some(item) = self.remaining.pop_front() {
            if reference::is_resolved(item.payload(), ids) {
                self.stalled = 0;
                return Ok(Some(item));
            }
            self.remaining.push_back(item);
            self.stalled += 1;

            if self.stalled >= self.remaining.len() {
                let stuck = &self.remaining[0];
                reference::resolve_or_explain(stuck.tracking_id(), stuck.payload(), ids)?;
                // Unreachable in practice: a resolvable head would have been
                // handed out during the pass.
                self.stalled = 0;
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use vigil_core::{reference::reference, RemoteId, UnresolvedReason};

    use super::*;

    #[derive(Debug)]
    struct Item {
        tid: TrackingId,
        payload: Value,
    }

    impl Resolvable for Item {
        fn tracking_id(&self) -> &TrackingId {
            &self.tid
        }

        fn payload(&self) -> &Value {
            &self.payload
        }
    }

    fn item(tid: &str, refs: &[&str]) -> Item {
        let refs: Vec<Value> = refs.iter().map(|r| reference(&TrackingId::from(*r))).collect();
        Item {
            tid: tid.into(),
            payload: json!({"refs": refs}),
        }
    }

    fn pending(ids: &mut IdTable, tids: &[&str]) {
        for tid in tids {
            ids.declare_pending((*tid).into());
        }
    }

    #[test]
    fn yields_in_dependency_order() {
        let mut ids = IdTable::new();
        pending(&mut ids, &["t:a", "t:b", "t:c"]);
        let mut queue = ResolutionQueue::new([
            item("t:c", &["t:b"]),
            item("t:b", &["t:a"]),
            item("t:a", &[]),
        ]);

        let mut order = Vec::new();
        let mut next_id = 1;
        while let Some(it) = queue.next_resolved(&ids).unwrap() {
            ids.insert_created(it.tid.clone(), RemoteId::Int(next_id));
            next_id += 1;
            order.push(it.tid.to_string());
        }

        assert_eq!(order, ["t:a", "t:b", "t:c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn two_cycle_is_reported() {
        let mut ids = IdTable::new();
        pending(&mut ids, &["t:a", "t:b"]);
        let mut queue = ResolutionQueue::new([item("t:a", &["t:b"]), item("t:b", &["t:a"])]);

        let err = queue.next_resolved(&ids).unwrap_err();
        assert_eq!(err.owner, TrackingId::from("t:a"));
        assert_eq!(err.target, TrackingId::from("t:b"));
        assert_eq!(err.field, "refs[0]");
        assert_eq!(err.reason, UnresolvedReason::Pending);
        assert!(err.to_string().contains("circular dependency"));
    }

    #[test]
    fn three_cycle_is_reported_after_free_items() {
        let mut ids = IdTable::new();
        pending(&mut ids, &["t:a", "t:b", "t:c", "t:free"]);
        let mut queue = ResolutionQueue::new([
            item("t:a", &["t:b"]),
            item("t:b", &["t:c"]),
            item("t:free", &[]),
            item("t:c", &["t:a"]),
        ]);

        let first = queue.next_resolved(&ids).unwrap().unwrap();
        assert_eq!(first.tid, TrackingId::from("t:free"));
        ids.insert_created(first.tid, RemoteId::Int(1));

        let err = queue.next_resolved(&ids).unwrap_err();
        assert_eq!(err.reason, UnresolvedReason::Pending);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn unknown_reference_is_reported() {
        let ids = IdTable::new();
        let mut queue = ResolutionQueue::new([item("t:a", &["t:ghost"])]);

        let err = queue.next_resolved(&ids).unwrap_err();
        assert_eq!(err.reason, UnresolvedReason::Unknown);
        assert_eq!(err.target, TrackingId::from("t:ghost"));
    }

    #[test]
    fn empty_queue_yields_none() {
        let mut queue = ResolutionQueue::<Item>::new([]);
        assert!(queue.next_resolved(&IdTable::new()).unwrap().is_none());
    }
}
