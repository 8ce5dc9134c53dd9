//! The tracking marker embedded into a managed resource's text field.

use std::sync::LazyLock;

use regex::Regex;
use vigil_core::TrackingId;

const PREFIX: &str = "-- Managed by vigil";

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\n\n)?-- Managed by vigil (\S+:\S+)").expect("valid marker regex")
});

/// Tracking id embedded in `text`, if any.
pub fn parse(text: &str) -> Option<TrackingId> {
    MARKER
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| TrackingId::new(m.as_str()))
}

/// `text` with any marker replaced by one for `tracking_id`.
pub fn stamp(text: &str, tracking_id: &TrackingId) -> String {
    let base = strip(text);
    if base.is_empty() {
        format!("{PREFIX} {tracking_id}")
    } else {
        format!("{base}\n\n{PREFIX} {tracking_id}")
    }
}

/// `text` without its marker.
pub fn strip(text: &str) -> String {
    MARKER.replace_all(text, "").into_owned()
}
