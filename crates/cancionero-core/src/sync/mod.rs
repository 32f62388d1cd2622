//! Git synchronization
//!
//! Publishes the local songs directory to a remote repository.
//!
//! ## Protocol
//!
//! 1. Persist: write song files and manifest, remove stale files
//! 2. Stage: add the songs directory to the index
//! 3. Check: stop if nothing is staged (never commit empty)
//! 4. Commit: `"<action> (YYYY-MM-DD HH:MM)"`
//! 5. Push: to the configured remote and branch
//!
//! A failure in step 1 stops everything before git is touched. A failure in
//! steps 2-5 leaves the local files as written.
//!
//! ## Usage
//!
//! ```ignore
//! let git = GitClient::discover(&config, &paths.root)?;
//! let mut engine = SyncEngine::new(git, &config.remote, &config.branch);
//! engine.synchronize(&mut store, "Update song")?;
//! ```

mod engine;
mod git;
mod vcs;

#[cfg(test)]
pub(crate) mod fake;

pub use engine::{commit_message, SyncEngine, SyncOutcome, SyncPhase};
pub use git::GitClient;
pub use vcs::{VcsError, VersionControl};
