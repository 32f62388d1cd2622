//! Project discovery
//!
//! A project is a directory containing `songs/index.json`. The root is found
//! once at startup and then handed to every component as `ProjectPaths`.

use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

/// Directory holding the song files, relative to the project root
pub const SONGS_DIR: &str = "songs";

/// Manifest filename inside the songs directory
pub const MANIFEST_FILE: &str = "index.json";

/// Resolved locations of one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub songs_dir: PathBuf,
    pub manifest_path: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let songs_dir = root.join(SONGS_DIR);
        let manifest_path = songs_dir.join(MANIFEST_FILE);
        Self {
            root,
            songs_dir,
            manifest_path,
        }
    }

    /// Songs directory relative to the root, as passed to git
    pub fn songs_dir_relative(&self) -> &Path {
        Path::new(SONGS_DIR)
    }

    /// Discover the project for the given configuration
    pub fn discover(config: &Config) -> Result<Self> {
        discover_root(&candidate_dirs(config)).map(Self::new)
    }
}

/// Check whether `dir` holds the manifest marker
pub fn is_project_root(dir: &Path) -> bool {
    dir.join(SONGS_DIR).join(MANIFEST_FILE).is_file()
}

/// Return the first candidate that is a project root.
///
/// Candidates are canonicalized and visited once each; ones that do not
/// exist are skipped.
pub fn discover_root(candidates: &[PathBuf]) -> Result<PathBuf> {
    let mut seen = HashSet::new();
    let mut searched = Vec::new();

    for candidate in candidates {
        let Ok(dir) = candidate.canonicalize() else {
            searched.push(candidate.display().to_string());
            continue;
        };
        if !seen.insert(dir.clone()) {
            continue;
        }
        searched.push(dir.display().to_string());
        if is_project_root(&dir) {
            debug!(root = ?dir, "found project root");
            return Ok(dir);
        }
    }

    Err(Error::Configuration(format!(
        "no {}/{} found (searched: {})",
        SONGS_DIR,
        MANIFEST_FILE,
        if searched.is_empty() {
            "nothing".to_string()
        } else {
            searched.join(", ")
        }
    )))
}

/// Directories to search, in order.
///
/// A configured root is the only candidate. Otherwise: the working
/// directory, then the executable's directory and its parent.
pub fn candidate_dirs(config: &Config) -> Vec<PathBuf> {
    if let Some(root) = &config.root {
        return vec![root.clone()];
    }

    let mut candidates = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        candidates.push(cwd);
    }
    if let Some(exe_dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        let parent = exe_dir.parent().map(Path::to_path_buf);
        candidates.push(exe_dir);
        candidates.extend(parent);
    }
    candidates
}
