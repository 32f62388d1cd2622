//! Manifest serialization
//!
//! The manifest is a pretty-printed JSON array, one entry per song in
//! songbook order:
//!
//! ```text
//! [
//!   {
//!     "id": 1,
//!     "number": 1,
//!     "title": "Amazing Grace",
//!     "file": "001-amazing-grace.txt"
//!   }
//! ]
//! ```
//!
//! Bodies never go into the manifest. Non-ASCII text is written as-is so
//! diffs stay readable under version control.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::files::atomic_write;
use crate::error::{Error, FsOp, Result};
use crate::models::Song;

/// One manifest entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    #[serde(default)]
    pub id: u32,
    pub number: u32,
    pub title: String,
    #[serde(default)]
    pub file: String,
}

impl ManifestEntry {
    /// Song for this entry with the given body
    pub fn into_song(self, body: String) -> Song {
        Song {
            id: self.id,
            number: self.number,
            title: self.title,
            file: self.file,
            body,
        }
    }
}

/// Reads and writes the manifest file
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
}

impl Manifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the entries in file order.
    ///
    /// A missing manifest is a configuration error and malformed JSON is a
    /// parse error; both are fatal for startup.
    pub fn load(&self) -> Result<Vec<ManifestEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::Configuration(format!(
                    "manifest not found at '{}'",
                    self.path.display()
                )));
            }
            Err(e) => return Err(Error::from_io(FsOp::Read, self.path.clone(), e)),
        };

        parse(&content).map_err(|source| Error::ManifestParse {
            path: self.path.clone(),
            source,
        })
    }

    /// Rewrite the manifest from songs already in songbook order.
    ///
    /// Ids are written as the 1-based position, whatever the songs carry.
    pub fn save(&self, songs: &[Song]) -> Result<()> {
        let content = render(songs);
        atomic_write(&self.path, content.as_bytes())?;
        debug!(entries = songs.len(), path = ?self.path, "wrote manifest");
        Ok(())
    }
}

/// Parse manifest JSON, ignoring a leading byte order mark
pub fn parse(content: &str) -> serde_json::Result<Vec<ManifestEntry>> {
    serde_json::from_str(content.trim_start_matches('\u{feff}'))
}

/// Render songs as manifest JSON with a trailing newline
pub fn render(songs: &[Song]) -> String {
    let entries: Vec<ManifestEntry> = songs
        .iter()
        .enumerate()
        .map(|(i, song)| ManifestEntry {
            id: (i + 1) as u32,
            number: song.number,
            title: song.title.clone(),
            file: song.file.clone(),
        })
        .collect();

    // Serializing plain structs of integers and strings cannot fail.
    let mut json = serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string());
    json.push('\n');
    json
}
