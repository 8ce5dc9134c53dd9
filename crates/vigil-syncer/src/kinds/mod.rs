mod dashboard;
mod monitor;
mod slo;

pub use dashboard::Dashboard;
pub use monitor::Monitor;
pub use slo::Slo;

use crate::kind::Kind;

pub static DASHBOARD: Dashboard = Dashboard;
pub static SLO: Slo = Slo;
pub static MONITOR: Monitor = Monitor;

/// Every kind the engine manages, in download order.
pub fn all() -> [Kind; 3] {
    [&DASHBOARD, &SLO, &MONITOR]
}

pub fn by_name(api_resource: &str) -> Option<Kind> {
    all().into_iter().find(|k| k.api_resource() == api_resource)
}
