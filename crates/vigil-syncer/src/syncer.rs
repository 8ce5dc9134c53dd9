use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use serde_json::Value;
use vigil_api::{fill_details, parallel, ApiError, DetailCache, Remote};
use vigil_core::{IdTable, RemoteId, TrackingId};

use crate::actual::RemoteResource;
use crate::desired::DesiredResource;
use crate::error::SyncError;
use crate::kind::{delete_rank, same_kind, set_field, Kind};
use crate::kinds;
use crate::plan::{Create, Delete, Plan, Update};
use crate::render;
use crate::tracking;

/// Scope of a run.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Only consider definitions of this project, and only managed remote
    /// resources belonging to it.
    pub project: Option<String>,
}

/// Reconciles declared resources against the remote service.
///
/// Construction downloads the actual state and computes the plan; nothing
/// is mutated until [`Syncer::update`] runs. Plan text and progress lines go
/// to `out`.
pub struct Syncer<W: Write> {
    pub(crate) remote: Arc<dyn Remote>,
    pub(crate) plan: Plan,
    pub(crate) ids: IdTable,
    pub(crate) out: W,
}

/// How an actual resource finds its desired counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum LookupKey {
    Remote(&'static str, RemoteId),
    Tracking(TrackingId),
}

/// A desired resource waiting for a match, with its stamped payload.
struct Candidate {
    desired: Arc<DesiredResource>,
    payload: Value,
}

impl<W: Write> Syncer<W> {
    pub async fn new(
        remote: Arc<dyn Remote>,
        cache: &DetailCache,
        desired: Vec<DesiredResource>,
        options: SyncOptions,
        out: W,
    ) -> Result<Self, SyncError> {
        let mut actual = download(remote.as_ref()).await?;
        let desired = filter_desired(desired, options.project.as_deref())?;
        let ids = id_table(&actual, &desired);

        if let Some(project) = &options.project {
            actual.retain(|a| a.in_scope(project));
        }

        let mut candidates = Vec::with_capacity(desired.len());
        for d in desired {
            let kind = d.kind();
            let mut payload = d.payload().clone();
            kind.rewrite_references(d.tracking_id(), &mut payload, &ids)?;
            kind.add_tracking_id(&mut payload, d.tracking_id());
            candidates.push(Some(Candidate {
                desired: Arc::new(d),
                payload,
            }));
        }

        let lookup = lookup_table(&candidates)?;
        let mut matched = Vec::new();
        let mut unmatched = Vec::new();
        for a in actual {
            match take_match(&lookup, &mut candidates, &a) {
                Some(candidate) => matched.push((candidate, a)),
                None => unmatched.push(a),
            }
        }

        fill_matched_details(remote.as_ref(), cache, &mut matched).await?;

        let mut plan = Plan::default();
        for (candidate, a) in matched {
            let diff = candidate.desired.kind().diff(&candidate.payload, &a.payload);
            if diff.is_empty() {
                continue;
            }
            plan.update.push(Update {
                id: a.id.clone(),
                desired: candidate.desired,
                actual: a,
                diff,
                payload: candidate.payload,
            });
        }

        plan.delete = unmatched
            .into_iter()
            .filter_map(|a| {
                a.tracking_id.map(|tracking_id| Delete {
                    id: a.id,
                    kind: a.kind,
                    tracking_id,
                })
            })
            .collect();
        sort_deletes(&mut plan.delete);

        for candidate in candidates.into_iter().flatten() {
            if let Some(id) = candidate.desired.id() {
                return Err(SyncError::Configuration(format!(
                    "Unable to find existing {} with id {id}",
                    candidate.desired.kind().api_resource()
                )));
            }
            plan.create.push(Create {
                desired: candidate.desired,
                payload: candidate.payload,
            });
        }

        if options.project.is_some() {
            guard_partial_updates(&mut plan.update);
        }

        tracing::info!(
            creates = plan.create.len(),
            updates = plan.update.len(),
            deletes = plan.delete.len(),
            "plan computed"
        );

        Ok(Self {
            remote,
            plan,
            ids,
            out,
        })
    }

    /// Write the plan to the output sink.
    pub fn plan(&mut self) -> Result<(), SyncError> {
        render::render_plan(&self.plan, &mut self.out)?;
        Ok(())
    }

    pub fn changes(&self) -> &Plan {
        &self.plan
    }

    pub fn ids(&self) -> &IdTable {
        &self.ids
    }

    pub fn into_writer(self) -> W {
        self.out
    }
}

impl<W: Write> fmt::Debug for Syncer<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Syncer")
            .field("base_url", &self.remote.base_url())
            .field("plan", &self.plan)
            .field("ids", &self.ids)
            .finish_non_exhaustive()
    }
}

/// List every kind concurrently.
async fn download(remote: &dyn Remote) -> Result<Vec<RemoteResource>, SyncError> {
    let all = kinds::all();
    let per_kind = parallel(all, all.len(), |kind: Kind| async move {
        let items = remote.list(kind.api_resource(), kind.list_params()).await?;
        tracing::debug!(kind = kind.api_resource(), count = items.len(), "downloaded");
        items
            .into_iter()
            .map(|payload| RemoteResource::annotate(kind, payload))
            .collect::<Result<Vec<_>, ApiError>>()
    })
    .await?;
    Ok(per_kind.into_iter().flatten().collect())
}

fn filter_desired(
    desired: Vec<DesiredResource>,
    project: Option<&str>,
) -> Result<Vec<DesiredResource>, SyncError> {
    let Some(project) = project else {
        return Ok(desired);
    };
    let known: BTreeSet<String> = desired.iter().map(|d| d.project().to_string()).collect();
    let kept: Vec<_> = desired.into_iter().filter(|d| d.project() == project).collect();
    if kept.is_empty() {
        let known: Vec<_> = known.into_iter().collect();
        return Err(SyncError::Configuration(format!(
            "{project} does not match any projects, try any of: {}",
            known.join(", ")
        )));
    }
    Ok(kept)
}

/// Live tracking ids first; declared ones become pending unless already
/// known. A pinned id counts as existing.
fn id_table(actual: &[RemoteResource], desired: &[DesiredResource]) -> IdTable {
    let mut ids = IdTable::new();
    for a in actual {
        if let Some(tid) = &a.tracking_id {
            ids.record_existing(tid.clone(), a.id.clone());
        }
    }
    for d in desired {
        match d.id() {
            Some(id) if ids.get(d.tracking_id()).is_none() => {
                ids.record_existing(d.tracking_id().clone(), id.clone());
            }
            _ => ids.declare_pending(d.tracking_id().clone()),
        }
    }
    ids
}

fn lookup_table(candidates: &[Option<Candidate>]) -> Result<HashMap<LookupKey, usize>, SyncError> {
    let mut lookup = HashMap::new();
    let mut seen = HashSet::new();
    for (index, candidate) in candidates.iter().enumerate() {
        let Some(candidate) = candidate else { continue };
        let desired = &candidate.desired;
        let tid = desired.tracking_id();
        if !seen.insert(tid.clone()) {
            return Err(SyncError::Configuration(format!(
                "{tid} is defined more than once"
            )));
        }
        lookup.insert(LookupKey::Tracking(tid.clone()), index);

        if let Some(id) = desired.id() {
            let key = LookupKey::Remote(desired.kind().api_resource(), id.clone());
            if let Some(other) = lookup.insert(key, index) {
                let other = candidates[other]
                    .as_ref()
                    .map(|c| c.desired.tracking_id().to_string())
                    .unwrap_or_default();
                return Err(SyncError::Configuration(format!(
                    "{tid} and {other} both manage {} {id}",
                    desired.kind().api_resource()
                )));
            }
        }
    }
    Ok(lookup)
}

/// Remove and return the candidate matching `actual`: by remote id first,
/// then by tracking id when the kinds agree.
fn take_match(
    lookup: &HashMap<LookupKey, usize>,
    candidates: &mut [Option<Candidate>],
    actual: &RemoteResource,
) -> Option<Candidate> {
    let by_id = LookupKey::Remote(actual.kind.api_resource(), actual.id.clone());
    if let Some(&index) = lookup.get(&by_id) {
        if let Some(candidate) = candidates[index].take() {
            return Some(candidate);
        }
    }

    let tid = actual.tracking_id.clone()?;
    let &index = lookup.get(&LookupKey::Tracking(tid))?;
    let matches = candidates[index]
        .as_ref()
        .is_some_and(|c| same_kind(c.desired.kind(), actual.kind));
    if matches { candidates[index].take() } else { None }
}

/// Replace partial list payloads of matched resources with full ones.
async fn fill_matched_details(
    remote: &dyn Remote,
    cache: &DetailCache,
    matched: &mut [(Candidate, RemoteResource)],
) -> Result<(), SyncError> {
    for kind in kinds::all().into_iter().filter(|k| k.needs_details()) {
        let positions: Vec<usize> = matched
            .iter()
            .enumerate()
            .filter(|(_, (_, a))| same_kind(a.kind, kind))
            .map(|(i, _)| i)
            .collect();
        if positions.is_empty() {
            continue;
        }
        let items = positions
            .iter()
            .map(|&i| std::mem::take(&mut matched[i].1.payload))
            .collect();
        let full = fill_details(remote, cache, kind.api_resource(), items).await?;
        for (i, payload) in positions.into_iter().zip(full) {
            matched[i].1.payload = payload;
        }
    }
    Ok(())
}

/// Dashboards first, then SLOs, then monitors; stable within a kind.
fn sort_deletes(deletes: &mut [Delete]) {
    deletes.sort_by_key(|d| delete_rank(d.kind));
}

/// Never stamp a tracking marker onto a pinned resource during a
/// project-scoped run: a later full run would then delete it as a managed
/// resource that is no longer declared.
///
/// A pinned resource that already carries a marker keeps it and the
/// marker-field diff is hidden. One without a marker gets the marker removed
/// from the outgoing payload. Updates left without a diff are dropped.
fn guard_partial_updates(updates: &mut Vec<Update>) {
    for update in updates.iter_mut() {
        if update.desired.id().is_none() {
            continue;
        }
        let kind = update.desired.kind();
        let field = kind.tracking_field();
        if !update.diff.iter().any(|d| d.root_field() == field) {
            continue;
        }

        let already_tracked = update
            .actual
            .payload
            .get(field)
            .and_then(Value::as_str)
            .and_then(tracking::parse)
            .is_some();
        if already_tracked {
            // The live marker goes back unchanged.
            if let Some(live) = update.actual.payload.get(field).cloned() {
                set_field(&mut update.payload, field, live);
            }
            update.diff.retain(|d| d.root_field() != field);
        } else {
            kind.remove_tracking_id(&mut update.payload);
            update.diff = kind.diff(&update.payload, &update.actual.payload);
        }
    }
    updates.retain(|u| !u.diff.is_empty());
}
