//! Sync command handler

use anyhow::Result;

use cancionero_core::{Error, GitClient, Store, SyncEngine, SyncOutcome};

use crate::output::Output;

/// Commit action for an explicit `cancionero sync`
pub const SYNC_ACTION: &str = "Sync songs";

/// Save every song and publish whatever is pending
pub fn sync(
    store: &mut Store,
    engine: Option<&mut SyncEngine<GitClient>>,
    output: &Output,
) -> Result<()> {
    publish(store, engine, SYNC_ACTION, output)
}

/// Persist the store, then commit and push unless running with `--local`.
///
/// A git failure is reported after the local save has already happened, so
/// the error returned here never means lost edits.
pub fn publish(
    store: &mut Store,
    engine: Option<&mut SyncEngine<GitClient>>,
    action: &str,
    output: &Output,
) -> Result<()> {
    let Some(engine) = engine else {
        let summary = store.persist()?;
        output.success(&format!(
            "Saved {} song(s) locally (not published)",
            summary.written
        ));
        return Ok(());
    };

    match engine.synchronize(store, action) {
        Ok(SyncOutcome::Pushed { message }) => {
            output.success(&format!(
                "Published to {}/{}: {}",
                engine.remote(),
                engine.branch(),
                message
            ));
            Ok(())
        }
        Ok(SyncOutcome::PushedPending) => {
            output.success(&format!(
                "No new changes; pushed earlier commits to {}/{}",
                engine.remote(),
                engine.branch()
            ));
            Ok(())
        }
        Ok(SyncOutcome::NoChanges) => {
            output.success("Saved - already up to date");
            Ok(())
        }
        Err(Error::Sync(e)) => {
            if e.local_data_safe() {
                output.message("Your local files were saved.");
            }
            Err(Error::Sync(e).into())
        }
        Err(e) => Err(e.into()),
    }
}
