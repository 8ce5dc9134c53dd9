//! vigil-syncer
//!
//! Reconciliation engine: downloads live monitors, dashboards and SLOs,
//! matches them against the declared definitions, and produces an ordered
//! create/update/delete plan that it can render and apply.
//!
//! Public API:
//! - `Syncer::new()`: download actual state and compute the plan
//! - `Syncer::plan()`: render the plan to the output sink
//! - `Syncer::confirm()`: confirmation gate before mutating anything
//! - `Syncer::update()`: apply creates, updates, then deletes

pub mod actual;
pub mod apply;
pub mod desired;
pub mod error;
pub mod kind;
pub mod kinds;
pub mod plan;
pub mod render;
pub mod resolve;
pub mod syncer;
pub mod tracking;

pub use crate::actual::RemoteResource;
pub use crate::apply::confirm_with;
pub use crate::desired::DesiredResource;
pub use crate::error::SyncError;
pub use crate::kind::{Kind, ResourceKind, DELETE_ORDER};
pub use crate::plan::{Create, Delete, Plan, PlanEntry, Update};
pub use crate::resolve::{Resolvable, ResolutionQueue};
pub use crate::syncer::{SyncOptions, Syncer};
