//! Git command-line client
//!
//! Runs `git` as a child process in the project root. Every command has a
//! deadline; output is drained on helper threads so a chatty command cannot
//! block on a full pipe while we wait for it.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::vcs::{VcsError, VersionControl};
use crate::config::Config;
use crate::error::{Error, Result};

/// Well-known install locations tried after `git` on PATH
const FALLBACK_GIT_PATHS: &[&str] = &[
    r"C:\Program Files\Git\cmd\git.exe",
    r"C:\Program Files\Git\bin\git.exe",
];

/// How long `git --version` may take during discovery
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// How often a running child is polled
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of a finished command
#[derive(Debug)]
struct CommandOutput {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

impl CommandOutput {
    /// Text to show when the command failed
    fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        format!("exited with {}", self.status)
    }
}

/// `VersionControl` backed by the git executable.
///
/// The pending check and the commit are limited to the paths of the last
/// `stage` call, so files staged elsewhere in the repository are left alone.
#[derive(Debug, Clone)]
pub struct GitClient {
    program: PathBuf,
    workdir: PathBuf,
    timeout: Duration,
    staged: Vec<String>,
}

impl GitClient {
    pub fn new(program: impl Into<PathBuf>, workdir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.into(),
            timeout,
            staged: Vec::new(),
        }
    }

    /// Find a working git executable.
    ///
    /// Tries `config.git_path` if set, otherwise `git` on PATH and then the
    /// usual Windows install locations.
    pub fn discover(config: &Config, workdir: &Path) -> Result<Self> {
        let candidates: Vec<PathBuf> = match &config.git_path {
            Some(path) => vec![path.clone()],
            None => std::iter::once(PathBuf::from("git"))
                .chain(FALLBACK_GIT_PATHS.iter().map(PathBuf::from))
                .collect(),
        };

        for candidate in &candidates {
            if probe(candidate, workdir) {
                info!(git = ?candidate, "using git executable");
                return Ok(Self::new(candidate, workdir, config.git_timeout()));
            }
        }

        Err(Error::ToolUnavailable {
            searched: candidates
                .iter()
                .map(|c| c.display().to_string())
                .collect(),
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run git and fail on a non-zero exit
    fn run(&self, args: &[&str]) -> std::result::Result<CommandOutput, VcsError> {
        let output = self.run_allow_fail(args)?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(VcsError::Failed {
                command: self.describe(args),
                diagnostic: output.diagnostic(),
            })
        }
    }

    fn run_allow_fail(&self, args: &[&str]) -> std::result::Result<CommandOutput, VcsError> {
        debug!(command = %self.describe(args), "running git");
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .current_dir(&self.workdir)
            // Never wait for credentials on a terminal nobody is watching
            .env("GIT_TERMINAL_PROMPT", "0");
        run_with_timeout(command, &self.describe(args), self.timeout)
    }

    /// `args` followed by `--` and the staged paths
    fn with_staged<'a>(&'a self, args: &[&'a str]) -> Vec<&'a str> {
        let mut full = args.to_vec();
        full.push("--");
        full.extend(self.staged.iter().map(String::as_str));
        full
    }

    fn describe(&self, args: &[&str]) -> String {
        let mut parts = vec!["git".to_string()];
        parts.extend(args.iter().map(|a| a.to_string()));
        parts.join(" ")
    }
}

impl VersionControl for GitClient {
    fn stage(&mut self, paths: &[&Path]) -> std::result::Result<(), VcsError> {
        self.staged = paths.iter().map(|p| p.display().to_string()).collect();
        self.run(&self.with_staged(&["add", "-A"])).map(|_| ())
    }

    fn has_pending_changes(&mut self) -> std::result::Result<bool, VcsError> {
        let output = self.run(&self.with_staged(&["diff", "--cached", "--name-only"]))?;
        Ok(!output.stdout.trim().is_empty())
    }

    fn commit(&mut self, message: &str) -> std::result::Result<(), VcsError> {
        self.run(&self.with_staged(&["commit", "-m", message]))
            .map(|_| ())
    }

    fn push(&mut self, remote: &str, branch: &str) -> std::result::Result<(), VcsError> {
        self.run(&["push", remote, branch]).map(|_| ())
    }

    fn has_unpushed_commits(
        &mut self,
        remote: &str,
        branch: &str,
    ) -> std::result::Result<bool, VcsError> {
        let range = format!("{}/{}..HEAD", remote, branch);
        let output = self.run_allow_fail(&["rev-list", "--count", &range])?;
        if !output.status.success() {
            // No remote-tracking ref yet (or no HEAD): nothing we can compare.
            debug!(range = %range, diagnostic = %output.diagnostic(), "cannot count unpushed commits");
            return Ok(false);
        }
        Ok(output.stdout.trim().parse::<u64>().unwrap_or(0) > 0)
    }
}

/// Check that `program --version` runs and succeeds
fn probe(program: &Path, workdir: &Path) -> bool {
    let mut command = Command::new(program);
    command.arg("--version");
    if workdir.is_dir() {
        command.current_dir(workdir);
    }
    match run_with_timeout(command, &format!("{} --version", program.display()), PROBE_TIMEOUT) {
        Ok(output) => output.status.success(),
        Err(e) => {
            debug!(error = %e, "git candidate unusable");
            false
        }
    }
}

/// Spawn `command`, wait up to `timeout`, and collect its output.
///
/// On timeout the child is killed and `VcsError::TimedOut` is returned.
fn run_with_timeout(
    mut command: Command,
    description: &str,
    timeout: Duration,
) -> std::result::Result<CommandOutput, VcsError> {
    let program = command.get_program().to_string_lossy().into_owned();
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| VcsError::Spawn { program, source })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let deadline = Instant::now() + timeout;

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                warn!(command = description, ?timeout, "command timed out, killing it");
                let _ = child.kill();
                let _ = child.wait();
                return Err(VcsError::TimedOut {
                    command: description.to_string(),
                    timeout,
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                let _ = child.kill();
                return Err(VcsError::Spawn {
                    program: description.to_string(),
                    source,
                });
            }
        }
    };

    Ok(CommandOutput {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    })
}

/// Read a pipe to the end on its own thread, decoding lossily
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncStep;
    use crate::models::SongDraft;
    use crate::project::ProjectPaths;
    use crate::store::Store;
    use crate::sync::{SyncEngine, SyncOutcome};
    use tempfile::TempDir;

    #[cfg(unix)]
    fn git(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?}: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    /// Working repo with a songbook, pushed once to a bare `origin`
    #[cfg(unix)]
    fn repo_with_remote() -> Option<(TempDir, ProjectPaths, GitClient)> {
        let temp_dir = TempDir::new().unwrap();
        let remote = temp_dir.path().join("remote.git");
        let work = temp_dir.path().join("work");
        std::fs::create_dir_all(work.join("songs")).unwrap();

        let config = Config::default();
        let client = GitClient::discover(&config, &work).ok()?;

        git(temp_dir.path(), &["init", "--bare", "remote.git"]);
        git(&work, &["init"]);
        git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(&work, &["config", "user.name", "Cancionero Tests"]);
        git(&work, &["config", "user.email", "tests@example.com"]);
        git(&work, &["config", "commit.gpgsign", "false"]);
        git(&work, &["remote", "add", "origin", remote.to_str().unwrap()]);

        std::fs::write(work.join("songs").join("index.json"), "[]\n").unwrap();
        git(&work, &["add", "-A"]);
        git(&work, &["commit", "-m", "Start songbook"]);
        git(&work, &["push", "origin", "main"]);

        Some((temp_dir, ProjectPaths::new(&work), client))
    }

    #[cfg(unix)]
    fn save(store: &mut Store, position: Option<usize>, title: &str) {
        let book = store.songbook_mut();
        let position = position.unwrap_or_else(|| book.create_song());
        let draft = SongDraft::parse("1", title, "la la la").unwrap();
        book.save_song(position, draft).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_sync_against_real_repository() {
        let Some((_temp_dir, paths, client)) = repo_with_remote() else {
            return; // git not installed
        };
        let work = paths.root.clone();
        let mut store = Store::open(paths).unwrap();
        let mut engine = SyncEngine::new(client.clone(), "origin", "main");

        save(&mut store, None, "Gloria");
        let outcome = engine.synchronize(&mut store, "Add song").unwrap();
        assert!(matches!(outcome, SyncOutcome::Pushed { .. }));
        assert_eq!(
            git(&work, &["rev-parse", "HEAD"]),
            git(&work, &["rev-parse", "origin/main"])
        );

        let outcome = engine.synchronize(&mut store, "Sync songs").unwrap();
        assert_eq!(outcome, SyncOutcome::NoChanges);

        // Push to a remote that does not exist; the commit stays local
        save(&mut store, Some(0), "Gloria Patri");
        let mut broken = SyncEngine::new(client.clone(), "missing", "main");
        match broken.synchronize(&mut store, "Update song") {
            Err(Error::Sync(e)) => assert_eq!(e.step, SyncStep::Push),
            other => panic!("expected push failure, got {:?}", other.map(|_| ())),
        }
        assert!(work.join("songs").join("001-gloria-patri.txt").is_file());
        assert_eq!(git(&work, &["rev-list", "--count", "origin/main..HEAD"]).trim(), "1");

        let outcome = engine.synchronize(&mut store, "Sync songs").unwrap();
        assert_eq!(outcome, SyncOutcome::PushedPending);
        assert_eq!(git(&work, &["rev-list", "--count", "origin/main..HEAD"]).trim(), "0");
    }

    #[cfg(unix)]
    #[test]
    fn test_sync_leaves_files_staged_outside_songs() {
        let Some((_temp_dir, paths, client)) = repo_with_remote() else {
            return; // git not installed
        };
        let work = paths.root.clone();
        std::fs::write(work.join("README"), "notes\n").unwrap();
        git(&work, &["add", "README"]);

        let mut store = Store::open(paths).unwrap();
        let mut engine = SyncEngine::new(client, "origin", "main");

        // Only README is staged: nothing of ours to commit
        let outcome = engine.synchronize(&mut store, "Sync songs").unwrap();
        assert_eq!(outcome, SyncOutcome::NoChanges);

        save(&mut store, None, "Aleluya");
        engine.synchronize(&mut store, "Add song").unwrap();

        let committed = git(&work, &["show", "--name-only", "--format=", "HEAD"]);
        assert!(committed.contains("songs/001-aleluya.txt"));
        assert!(!committed.contains("README"));
        assert_eq!(git(&work, &["diff", "--cached", "--name-only"]).trim(), "README");
    }

    #[test]
    fn test_describe() {
        let git = GitClient::new("/usr/bin/git", "/tmp", Duration::from_secs(1));
        assert_eq!(
            git.describe(&["commit", "-m", "Update song"]),
            "git commit -m Update song"
        );
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut git = GitClient::new(
            temp_dir.path().join("no-such-git"),
            temp_dir.path(),
            Duration::from_secs(5),
        );

        let err = git.commit("x").unwrap_err();
        assert!(matches!(err, VcsError::Spawn { .. }));
    }

    #[test]
    fn test_discover_with_bad_configured_path() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            git_path: Some(temp_dir.path().join("no-such-git")),
            ..Config::default()
        };

        let err = GitClient::discover(&config, temp_dir.path()).unwrap_err();
        match err {
            Error::ToolUnavailable { searched } => {
                assert_eq!(searched.len(), 1);
                assert!(searched[0].contains("no-such-git"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let mut command = Command::new("sleep");
        command.arg("5");

        let started = Instant::now();
        let err = run_with_timeout(command, "sleep 5", Duration::from_millis(100)).unwrap_err();

        assert!(matches!(err, VcsError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_uses_stderr_as_diagnostic() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo out; echo 'fatal: no remote' >&2; exit 3"]);

        let output = run_with_timeout(command, "sh", Duration::from_secs(5)).unwrap();
        assert!(!output.status.success());
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.diagnostic(), "fatal: no remote");
    }

    #[cfg(unix)]
    #[test]
    fn test_diagnostic_falls_back_to_stdout() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo 'nothing to commit'; exit 1"]);

        let output = run_with_timeout(command, "sh", Duration::from_secs(5)).unwrap();
        assert_eq!(output.diagnostic(), "nothing to commit");
    }
}
