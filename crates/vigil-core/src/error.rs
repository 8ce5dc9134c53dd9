use thiserror::Error;

use crate::ids::TrackingId;

/// Why a reference could not be turned into a concrete remote id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// Referenced resource is created by this run but has no id yet.
    Pending,
    /// Referenced resource is neither live nor declared.
    Unknown,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{owner} {field} references {target}: {}", .reason.describe())]
pub struct ValidationError {
    /// Tracking id of the resource holding the reference.
    pub owner: TrackingId,
    /// Path of the field inside the payload, e.g. `widgets[0].alert_id`.
    pub field: String,
    /// The tracking id that could not be resolved.
    pub target: TrackingId,
    pub reason: UnresolvedReason,
}

impl UnresolvedReason {
    fn describe(self) -> &'static str {
        match self {
            Self::Pending => {
                "it is also created by the current run and could not be created first \
                 because of a circular dependency, try creating only some of the resources"
            }
            Self::Unknown => {
                "it does not exist remotely and is not declared (it needs to be created first to link it)"
            }
        }
    }
}
