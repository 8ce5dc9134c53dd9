use std::io::{IsTerminal, Write};

use inquire::{Confirm, InquireError};
use vigil_api::ApiError;
use vigil_core::RemoteId;

use crate::error::SyncError;
use crate::plan::Plan;
use crate::resolve::ResolutionQueue;
use crate::syncer::Syncer;

impl<W: Write> Syncer<W> {
    /// Ask whether to go ahead with the plan.
    ///
    /// An empty plan never asks. Under CI or without a terminal the plan is
    /// applied unattended.
    pub fn confirm(&self) -> Result<bool, SyncError> {
        confirm_with(
            &self.plan,
            std::env::var_os("CI").is_some(),
            std::io::stdin().is_terminal() && std::io::stderr().is_terminal(),
            || Confirm::new("Execute Plan ?").with_default(false).prompt(),
        )
    }

    /// Apply the plan: creates, then updates, then deletes.
    ///
    /// Creates and updates run in dependency order; every created id is
    /// recorded before the next entry is resolved. The first failing call
    /// aborts the run.
    pub async fn update(&mut self) -> Result<(), SyncError> {
        let base_url = self.remote.base_url().to_string();

        let mut creates = ResolutionQueue::new(self.plan.create.clone());
        while let Some(mut create) = creates.next_resolved(&self.ids)? {
            let kind = create.desired.kind();
            let tid = create.desired.tracking_id().clone();
            kind.rewrite_references(&tid, &mut create.payload, &self.ids)?;

            writeln!(self.out, "Creating {} {tid}", kind.api_resource())?;
            let reply = self.remote.create(kind.api_resource(), &create.payload).await?;
            let id = RemoteId::of(&reply).ok_or_else(|| ApiError::UnexpectedResponse {
                path: format!("/api/v1/{}", kind.api_resource()),
                detail: "created resource without id".into(),
            })?;
            writeln!(
                self.out,
                "Created {} {tid} {base_url}{}",
                kind.api_resource(),
                kind.url_path(&id)
            )?;
            tracing::info!(kind = kind.api_resource(), tracking_id = %tid, id = %id, "created");
            self.ids.insert_created(tid, id);
        }

        let mut updates = ResolutionQueue::new(self.plan.update.clone());
        while let Some(mut update) = updates.next_resolved(&self.ids)? {
            let kind = update.desired.kind();
            let tid = update.desired.tracking_id().clone();
            kind.rewrite_references(&tid, &mut update.payload, &self.ids)?;

            writeln!(self.out, "Updating {} {tid}", kind.api_resource())?;
            self.remote
                .update(kind.api_resource(), &update.id, &update.payload)
                .await?;
            writeln!(
                self.out,
                "Updated {} {tid} {base_url}{}",
                kind.api_resource(),
                kind.url_path(&update.id)
            )?;
            tracing::info!(kind = kind.api_resource(), tracking_id = %tid, id = %update.id, "updated");
        }

        for delete in &self.plan.delete {
            let api = delete.kind.api_resource();
            writeln!(self.out, "Deleting {api} {} {}", delete.tracking_id, delete.id)?;
            self.remote.delete(api, &delete.id).await?;
            writeln!(self.out, "Deleted {api} {} {}", delete.tracking_id, delete.id)?;
            tracing::info!(kind = api, tracking_id = %delete.tracking_id, id = %delete.id, "deleted");
        }

        self.out.flush()?;
        Ok(())
    }
}

/// Confirmation decision with the environment made explicit.
pub fn confirm_with<F>(
    plan: &Plan,
    ci: bool,
    interactive: bool,
    ask: F,
) -> Result<bool, SyncError>
where
    F: FnOnce() -> Result<bool, InquireError>,
{
    if plan.is_noop() {
        return Ok(false);
    }
    if ci || !interactive {
        tracing::warn!(ci, "not running interactively, applying without confirmation");
        return Ok(true);
    }
    Ok(ask()?)
}
