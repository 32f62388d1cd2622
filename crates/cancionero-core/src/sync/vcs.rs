//! Version-control interface
//!
//! The sync engine only talks to this trait, so tests can plug in a fake
//! and no real tool runs during unit tests.

use std::io;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

/// Failure reported by a version-control call
#[derive(Error, Debug)]
pub enum VcsError {
    /// The tool could not be started
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The tool ran and reported an error
    #[error("'{command}' failed: {diagnostic}")]
    Failed { command: String, diagnostic: String },

    /// The tool did not finish in time and was killed
    #[error("'{command}' timed out after {}s", .timeout.as_secs())]
    TimedOut { command: String, timeout: Duration },
}

/// Operations the sync engine needs from a version-control tool
pub trait VersionControl {
    /// Add `paths` (relative to the working tree) to the pending change set
    fn stage(&mut self, paths: &[&Path]) -> Result<(), VcsError>;

    /// Whether anything is staged for the next commit
    fn has_pending_changes(&mut self) -> Result<bool, VcsError>;

    /// Commit staged changes
    fn commit(&mut self, message: &str) -> Result<(), VcsError>;

    /// Push the current branch to `remote`/`branch`
    fn push(&mut self, remote: &str, branch: &str) -> Result<(), VcsError>;

    /// Whether local commits exist that `remote`/`branch` does not have.
    ///
    /// Tools that cannot tell answer `false`.
    fn has_unpushed_commits(&mut self, _remote: &str, _branch: &str) -> Result<bool, VcsError> {
        Ok(false)
    }
}

impl<T: VersionControl + ?Sized> VersionControl for &mut T {
    fn stage(&mut self, paths: &[&Path]) -> Result<(), VcsError> {
        (**self).stage(paths)
    }

    fn has_pending_changes(&mut self) -> Result<bool, VcsError> {
        (**self).has_pending_changes()
    }

    fn commit(&mut self, message: &str) -> Result<(), VcsError> {
        (**self).commit(message)
    }

    fn push(&mut self, remote: &str, branch: &str) -> Result<(), VcsError> {
        (**self).push(remote, branch)
    }

    fn has_unpushed_commits(&mut self, remote: &str, branch: &str) -> Result<bool, VcsError> {
        (**self).has_unpushed_commits(remote, branch)
    }
}
