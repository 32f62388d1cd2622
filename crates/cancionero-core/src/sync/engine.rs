//! Sync engine
//!
//! Drives one synchronization attempt:
//!
//! ```text
//! Idle -> Persisted -> Staged -> NoChanges
//!                             -> Committed -> Pushed
//!                             -> PushedPending
//!       (any step) -> Failed
//! ```
//!
//! Local durability comes first. Persisting must succeed before git is
//! touched, and a git failure never undoes what was written. A commit left
//! unpushed by a failed push is pushed by the next attempt even when nothing
//! new was staged.

use std::path::Path;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use super::vcs::{VcsError, VersionControl};
use crate::config::Config;
use crate::error::{Result, SyncError, SyncStep};
use crate::store::Store;

/// Where an attempt currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Persisted,
    Staged,
    NoChanges,
    Committed,
    Pushed,
    /// Nothing new to commit, but earlier unpushed commits were pushed
    PushedPending,
    Failed,
}

impl SyncPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SyncPhase::NoChanges | SyncPhase::Pushed | SyncPhase::PushedPending | SyncPhase::Failed
        )
    }
}

/// How a successful attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing staged and nothing waiting to be pushed
    NoChanges,
    /// A new commit was created and pushed
    Pushed { message: String },
    /// No new commit; earlier unpushed commits were pushed
    PushedPending,
}

/// Commit message: `"<action> (YYYY-MM-DD HH:MM)"`
pub fn commit_message(action: &str, now: NaiveDateTime) -> String {
    format!("{} ({})", action, now.format("%Y-%m-%d %H:%M"))
}

/// Persists a store and publishes it through a `VersionControl`
pub struct SyncEngine<V> {
    vcs: V,
    remote: String,
    branch: String,
    phase: SyncPhase,
}

impl<V: VersionControl> SyncEngine<V> {
    pub fn new(vcs: V, remote: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            vcs,
            remote: remote.into(),
            branch: branch.into(),
            phase: SyncPhase::Idle,
        }
    }

    /// Engine pushing to the configured remote and branch
    pub fn from_config(vcs: V, config: &Config) -> Self {
        Self::new(vcs, &config.remote, &config.branch)
    }

    /// Phase reached by the last attempt
    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    pub fn vcs_mut(&mut self) -> &mut V {
        &mut self.vcs
    }

    /// Persist `store` and publish it, stamping the commit with local time
    pub fn synchronize(&mut self, store: &mut Store, action: &str) -> Result<SyncOutcome> {
        self.synchronize_at(store, action, Local::now().naive_local())
    }

    /// Persist `store` and publish it, stamping the commit with `now`.
    ///
    /// Persist errors come back unchanged and mean git was never called.
    /// Git errors come back as `Error::Sync`; the files are already saved.
    pub fn synchronize_at(
        &mut self,
        store: &mut Store,
        action: &str,
        now: NaiveDateTime,
    ) -> Result<SyncOutcome> {
        self.transition(SyncPhase::Idle);

        if let Err(e) = store.persist() {
            warn!(error = %e, "persist failed, skipping git");
            self.transition(SyncPhase::Failed);
            return Err(e);
        }
        self.transition(SyncPhase::Persisted);

        let songs_dir = store.paths().songs_dir_relative().to_path_buf();
        Ok(self.publish(&songs_dir, action, now)?)
    }

    /// Steps 2-5: stage `path`, check, commit and push.
    ///
    /// Callers must have persisted already.
    pub fn publish(
        &mut self,
        path: &Path,
        action: &str,
        now: NaiveDateTime,
    ) -> std::result::Result<SyncOutcome, SyncError> {
        self.vcs
            .stage(&[path])
            .map_err(|e| self.fail(SyncStep::Stage, e))?;
        self.transition(SyncPhase::Staged);

        let pending = self
            .vcs
            .has_pending_changes()
            .map_err(|e| self.fail(SyncStep::Check, e))?;

        if !pending {
            let unpushed = self
                .vcs
                .has_unpushed_commits(&self.remote, &self.branch)
                .map_err(|e| self.fail(SyncStep::Check, e))?;
            if !unpushed {
                info!("nothing to synchronize");
                self.transition(SyncPhase::NoChanges);
                return Ok(SyncOutcome::NoChanges);
            }

            info!("no new changes, pushing earlier commits");
            self.push()?;
            self.transition(SyncPhase::PushedPending);
            return Ok(SyncOutcome::PushedPending);
        }

        let message = commit_message(action, now);
        self.vcs
            .commit(&message)
            .map_err(|e| self.fail(SyncStep::Commit, e))?;
        self.transition(SyncPhase::Committed);

        self.push()?;
        self.transition(SyncPhase::Pushed);
        info!(%message, "synchronized");
        Ok(SyncOutcome::Pushed { message })
    }

    fn push(&mut self) -> std::result::Result<(), SyncError> {
        self.vcs
            .push(&self.remote, &self.branch)
            .map_err(|e| self.fail(SyncStep::Push, e))
    }

    fn fail(&mut self, step: SyncStep, error: VcsError) -> SyncError {
        warn!(%step, error = %error, "sync step failed; local files are kept");
        self.transition(SyncPhase::Failed);
        SyncError::new(step, error)
    }

    fn transition(&mut self, phase: SyncPhase) {
        debug!(from = ?self.phase, to = ?phase, "sync phase");
        self.phase = phase;
    }
}
