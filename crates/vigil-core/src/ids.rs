use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable logical name of a desired resource, `"<project>:<name>"`.
///
/// Embedded into the remote payload so a resource can be found again on the
/// next run, independent of the id the remote service assigned to it.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingId(String);

impl TrackingId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Build `"<project>:<name>"`.
    pub fn from_parts(project: &str, name: &str) -> Self {
        Self(format!("{project}:{name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The project segment (everything before the first `:`).
    pub fn project(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(p, _)| p)
    }

    pub fn belongs_to(&self, project: &str) -> bool {
        self.0
            .strip_prefix(project)
            .is_some_and(|rest| rest.starts_with(':'))
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackingId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Id assigned by the remote service: numeric for monitors, string for
/// dashboards and SLOs.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteId {
    Int(i64),
    Str(String),
}

impl RemoteId {
    /// Read an id out of a JSON value (`123` or `"abc-def"`).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Int),
            Value::String(s) if !s.is_empty() => Some(Self::Str(s.clone())),
            _ => None,
        }
    }

    /// The `id` field of a remote payload.
    pub fn of(payload: &Value) -> Option<Self> {
        payload.get("id").and_then(Self::from_value)
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(i) => Value::from(*i),
            Self::Str(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RemoteId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for RemoteId {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}
