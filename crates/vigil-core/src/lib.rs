//! vigil-core
//!
//! Shared vocabulary of the vigil reconciler: tracking ids, remote ids, the
//! id resolution table, reference placeholders and field-level diffs.
//! No HTTP dependency; both the remote client and the syncer build on it.

pub mod diff;
pub mod error;
pub mod ids;
pub mod reference;
pub mod table;

pub use crate::diff::{json_diff, DiffOp, FieldDiff};
pub use crate::error::{UnresolvedReason, ValidationError};
pub use crate::ids::{RemoteId, TrackingId};
pub use crate::reference::REF_KEY;
pub use crate::table::{IdTable, Resolution};
