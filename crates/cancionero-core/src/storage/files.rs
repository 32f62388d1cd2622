//! Per-song text files
//!
//! Nothing is cached between calls: every operation goes straight to the
//! filesystem.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, FsOp, Result};
use crate::models::Song;

const BOM: char = '\u{feff}';

/// Reads and writes the song files of one songs directory
#[derive(Debug, Clone)]
pub struct SongFiles {
    dir: PathBuf,
}

impl SongFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Read a song body.
    ///
    /// Byte order marks and trailing whitespace are stripped. A missing file
    /// (or an empty filename) reads as an empty body.
    pub fn load(&self, file: &str) -> Result<String> {
        if file.is_empty() {
            return Ok(String::new());
        }

        let path = self.path(file);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(clean_body(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(Error::from_io(FsOp::Read, path, e)),
        }
    }

    /// Write one body as `body + "\n"`
    pub fn write(&self, file: &str, body: &str) -> Result<()> {
        let path = self.path(file);
        let mut content = body.trim_end().to_string();
        content.push('\n');
        atomic_write(&path, content.as_bytes())?;
        debug!(file, "wrote song file");
        Ok(())
    }

    /// Write the file of every song. Songs must already have filenames.
    pub fn write_all(&self, songs: &[Song]) -> Result<()> {
        create_dir(&self.dir)?;
        for song in songs {
            self.write(&song.file, &song.body)?;
        }
        Ok(())
    }

    /// Remove a file; removing a file that is already gone succeeds
    pub fn delete(&self, file: &str) -> Result<()> {
        if file.is_empty() {
            return Ok(());
        }

        let path = self.path(file);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(file, "removed song file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::from_io(FsOp::Delete, path, e)),
        }
    }

    /// Remove `old` once `new` exists on disk.
    ///
    /// Returns whether `old` was removed. Nothing happens when the names are
    /// equal or the new file was never written, so a failed write can never
    /// cost the only copy of a song.
    pub fn rename_cleanup(&self, old: &str, new: &str) -> Result<bool> {
        if old.is_empty() || old == new || !self.path(new).is_file() {
            return Ok(false);
        }
        self.delete(old)?;
        Ok(true)
    }

    /// List `.txt` files present in the directory, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::from_io(FsOp::Read, self.dir.clone(), e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::from_io(FsOp::Read, self.dir.clone(), e))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    files.push(name.to_string());
                }
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Strip byte order marks and trailing whitespace
fn clean_body(content: &str) -> String {
    content.replace(BOM, "").trim_end().to_string()
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::from_io(FsOp::CreateDirectory, dir, e))
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let write_temp = || -> io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()
    };

    if let Err(e) = write_temp() {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::from_io(FsOp::Write, path, e));
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::from_io(FsOp::Write, path, e)
    })
}
