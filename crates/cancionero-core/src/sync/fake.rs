//! In-memory stand-in for git used by tests
//!
//! Staging snapshots the files under the staged paths; a commit records the
//! snapshot, so "pending changes" means the staged snapshot differs from the
//! last commit, like `git diff --cached`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::vcs::{VcsError, VersionControl};
use crate::error::SyncStep;

#[derive(Debug, Default)]
pub(crate) struct FakeGit {
    workdir: PathBuf,
    staged: BTreeMap<String, String>,
    committed: BTreeMap<String, String>,
    /// Commits not yet pushed
    pub ahead: usize,
    /// Every call, in order, e.g. `"commit Update song (2024-06-01 14:32)"`
    pub calls: Vec<String>,
    /// Step that fails until cleared
    pub fail_on: Option<SyncStep>,
    pub commits: Vec<String>,
}

impl FakeGit {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            ..Self::default()
        }
    }

    /// Pretend everything currently on disk was committed and pushed already
    pub fn with_baseline(mut self, paths: &[&Path]) -> Self {
        self.snapshot(paths);
        self.committed = self.staged.clone();
        self
    }

    pub fn call_names(&self) -> Vec<&str> {
        self.calls
            .iter()
            .map(|c| c.split(' ').next().unwrap_or(""))
            .collect()
    }

    fn check(&self, step: SyncStep) -> Result<(), VcsError> {
        if self.fail_on == Some(step) {
            return Err(VcsError::Failed {
                command: format!("git {}", step),
                diagnostic: format!("simulated {} failure", step),
            });
        }
        Ok(())
    }

    fn snapshot(&mut self, paths: &[&Path]) {
        self.staged.clear();
        for path in paths {
            let dir = self.workdir.join(path);
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let name = entry.file_name().to_string_lossy().into_owned();
                if let Ok(content) = fs::read_to_string(entry.path()) {
                    self.staged
                        .insert(format!("{}/{}", path.display(), name), content);
                }
            }
        }
    }
}

impl VersionControl for FakeGit {
    fn stage(&mut self, paths: &[&Path]) -> Result<(), VcsError> {
        self.calls.push(format!(
            "stage {}",
            paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" ")
        ));
        self.check(SyncStep::Stage)?;
        self.snapshot(paths);
        Ok(())
    }

    fn has_pending_changes(&mut self) -> Result<bool, VcsError> {
        self.calls.push("check".to_string());
        self.check(SyncStep::Check)?;
        Ok(self.staged != self.committed)
    }

    fn commit(&mut self, message: &str) -> Result<(), VcsError> {
        self.calls.push(format!("commit {}", message));
        self.check(SyncStep::Commit)?;
        self.committed = self.staged.clone();
        self.commits.push(message.to_string());
        self.ahead += 1;
        Ok(())
    }

    fn push(&mut self, remote: &str, branch: &str) -> Result<(), VcsError> {
        self.calls.push(format!("push {} {}", remote, branch));
        self.check(SyncStep::Push)?;
        self.ahead = 0;
        Ok(())
    }

    fn has_unpushed_commits(&mut self, _remote: &str, _branch: &str) -> Result<bool, VcsError> {
        self.calls.push("unpushed".to_string());
        Ok(self.ahead > 0)
    }
}
