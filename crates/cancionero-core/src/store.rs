//! Unified storage interface
//!
//! The `Store` owns the songbook of one project and coordinates between:
//! - `SongFiles` (one text file per song)
//! - `Manifest` (the ordered `index.json`)
//!
//! ## Usage
//!
//! ```ignore
//! let paths = ProjectPaths::discover(&config)?;
//! let mut store = Store::open(paths)?;
//!
//! let pos = store.songbook_mut().create_song();
//! let draft = SongDraft::parse("12", "Amazing Grace", "line1\nline2")?;
//! store.songbook_mut().save_song(pos, draft)?;
//!
//! store.persist()?;
//! ```

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::Song;
use crate::project::ProjectPaths;
use crate::songbook::{Songbook, StaleFile};
use crate::storage::{Manifest, SongFiles};

/// What a persist changed on disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistSummary {
    /// Song files written
    pub written: usize,
    /// Stale files removed
    pub removed: Vec<String>,
}

/// Songbook of one project plus its on-disk storage
pub struct Store {
    paths: ProjectPaths,
    files: SongFiles,
    manifest: Manifest,
    songbook: Songbook,
}

impl Store {
    /// Load the manifest and every song body.
    ///
    /// Fails if the manifest is missing or malformed. Songs whose file is
    /// missing load with an empty body.
    pub fn open(paths: ProjectPaths) -> Result<Self> {
        if !paths.songs_dir.is_dir() {
            return Err(Error::Configuration(format!(
                "songs directory not found at '{}'",
                paths.songs_dir.display()
            )));
        }

        let files = SongFiles::new(&paths.songs_dir);
        let manifest = Manifest::new(&paths.manifest_path);

        let mut songs = Vec::new();
        for entry in manifest.load()? {
            let body = files.load(&entry.file)?;
            songs.push(entry.into_song(body));
        }
        info!(songs = songs.len(), root = ?paths.root, "opened songbook");

        let mut songbook = Songbook::new(songs);
        for file in songbook.release_duplicate_files() {
            warn!(file = %file, "file shared by several songs, renaming on next save");
        }

        Ok(Self {
            paths,
            files,
            manifest,
            songbook,
        })
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    pub fn files(&self) -> &SongFiles {
        &self.files
    }

    pub fn songbook(&self) -> &Songbook {
        &self.songbook
    }

    pub fn songbook_mut(&mut self) -> &mut Songbook {
        &mut self.songbook
    }

    pub fn songs(&self) -> &[Song] {
        self.songbook.songs()
    }

    /// Make the disk match the songbook.
    ///
    /// 1. Give files to songs that have none and renumber ids
    /// 2. Write every song file
    /// 3. Rewrite the manifest
    /// 4. Remove stale files, renamed ones only once their new file exists
    ///
    /// Any error stops the persist and is returned as is; stale files that
    /// were not removed stay scheduled for the next attempt.
    pub fn persist(&mut self) -> Result<PersistSummary> {
        self.songbook.assign_missing_files();
        self.songbook.renumber();

        self.files.write_all(self.songbook.songs())?;
        self.manifest.save(self.songbook.songs())?;

        let mut removed = Vec::new();
        let mut pending = self.songbook.take_stale_files().into_iter();
        while let Some(stale) = pending.next() {
            match self.remove_stale(&stale) {
                Ok(true) => removed.push(stale.file),
                Ok(false) => self.songbook.restore_stale_files(vec![stale]),
                Err(e) => {
                    let mut left = vec![stale];
                    left.extend(pending);
                    self.songbook.restore_stale_files(left);
                    return Err(e);
                }
            }
        }

        let summary = PersistSummary {
            written: self.songbook.len(),
            removed,
        };
        debug!(?summary, "persisted songbook");
        Ok(summary)
    }

    fn remove_stale(&self, stale: &StaleFile) -> Result<bool> {
        match &stale.replaced_by {
            Some(new) => self.files.rename_cleanup(&stale.file, new),
            None => self.files.delete(&stale.file).map(|()| true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SongDraft;
    use crate::project::{MANIFEST_FILE, SONGS_DIR};
    use crate::storage::manifest::parse;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    fn empty_project() -> (TempDir, ProjectPaths) {
        let temp_dir = TempDir::new().unwrap();
        let songs = temp_dir.path().join(SONGS_DIR);
        fs::create_dir_all(&songs).unwrap();
        fs::write(songs.join(MANIFEST_FILE), "[]").unwrap();
        let paths = ProjectPaths::new(temp_dir.path());
        (temp_dir, paths)
    }

    fn add_song(store: &mut Store, number: &str, title: &str, body: &str) -> usize {
        let pos = store.songbook_mut().create_song();
        let draft = SongDraft::parse(number, title, body).unwrap();
        store.songbook_mut().save_song(pos, draft).unwrap().position
    }

    fn files_on_disk(paths: &ProjectPaths) -> Vec<String> {
        SongFiles::new(&paths.songs_dir).list().unwrap()
    }

    #[test]
    fn test_open_missing_manifest() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(SONGS_DIR)).unwrap();

        let result = Store::open(ProjectPaths::new(temp_dir.path()));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_open_missing_songs_dir() {
        let temp_dir = TempDir::new().unwrap();
        let result = Store::open(ProjectPaths::new(temp_dir.path()));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_open_tolerates_missing_song_file() {
        let (_temp_dir, paths) = empty_project();
        fs::write(
            &paths.manifest_path,
            r#"[{"id": 1, "number": 4, "title": "Ghost", "file": "004-ghost.txt"}]"#,
        )
        .unwrap();

        let store = Store::open(paths).unwrap();
        assert_eq!(store.songs().len(), 1);
        assert_eq!(store.songs()[0].body, "");
    }

    #[test]
    fn test_shared_file_in_manifest_is_split_on_persist() {
        let (_temp_dir, paths) = empty_project();
        fs::write(
            &paths.manifest_path,
            r#"[
                {"id": 1, "number": 1, "title": "Uno", "file": "001-uno.txt"},
                {"id": 2, "number": 2, "title": "Dos", "file": "001-uno.txt"}
            ]"#,
        )
        .unwrap();
        fs::write(paths.songs_dir.join("001-uno.txt"), "uno\n").unwrap();

        let mut store = Store::open(paths.clone()).unwrap();
        store.persist().unwrap();

        assert_eq!(files_on_disk(&paths), vec!["001-uno.txt", "002-dos.txt"]);
        let entries = parse(&fs::read_to_string(&paths.manifest_path).unwrap()).unwrap();
        let files: Vec<&str> = entries.iter().map(|e| e.file.as_str()).collect();
        assert_eq!(files, vec!["001-uno.txt", "002-dos.txt"]);
    }

    #[test]
    fn test_single_song_example() {
        let (_temp_dir, paths) = empty_project();
        let mut store = Store::open(paths.clone()).unwrap();
        add_song(&mut store, "1", "Amazing Grace", "line1\nline2");

        store.persist().unwrap();

        let content = fs::read_to_string(paths.songs_dir.join("001-amazing-grace.txt")).unwrap();
        assert_eq!(content, "line1\nline2\n");

        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&paths.manifest_path).unwrap()).unwrap();
        assert_eq!(
            manifest,
            serde_json::json!([
                {"id": 1, "number": 1, "title": "Amazing Grace", "file": "001-amazing-grace.txt"}
            ])
        );
    }

    #[test]
    fn test_persist_then_reload_round_trip() {
        let (_temp_dir, paths) = empty_project();
        let mut store = Store::open(paths.clone()).unwrap();
        add_song(&mut store, "3", "Gloria", "Gloria in excelsis");
        add_song(&mut store, "1", "Canción de cuna", "Duérmete niño\n\nya");
        add_song(&mut store, "3", "Aleluya", "");
        add_song(&mut store, "3", "Aleluya", "otra");
        store.persist().unwrap();

        let expected: Vec<(u32, String, String)> = store
            .songs()
            .iter()
            .map(|s| (s.number, s.title.clone(), s.body.clone()))
            .collect();

        let reloaded = Store::open(paths.clone()).unwrap();
        let actual: Vec<(u32, String, String)> = reloaded
            .songs()
            .iter()
            .map(|s| (s.number, s.title.clone(), s.body.clone()))
            .collect();
        assert_eq!(actual, expected);

        let ids: Vec<u32> = reloaded.songs().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        let files: HashSet<&str> = reloaded.songs().iter().map(|s| s.file.as_str()).collect();
        assert_eq!(files.len(), 4);
        assert_eq!(files_on_disk(&paths).len(), 4);
    }

    #[test]
    fn test_rename_leaves_only_new_file() {
        let (_temp_dir, paths) = empty_project();
        let mut store = Store::open(paths.clone()).unwrap();
        let pos = add_song(&mut store, "1", "Old Title", "body");
        store.persist().unwrap();
        assert_eq!(files_on_disk(&paths), vec!["001-old-title.txt"]);

        let draft = SongDraft::parse("1", "New Title", "body").unwrap();
        store.songbook_mut().save_song(pos, draft).unwrap();
        let summary = store.persist().unwrap();

        assert_eq!(summary.removed, vec!["001-old-title.txt".to_string()]);
        assert_eq!(files_on_disk(&paths), vec!["001-new-title.txt"]);
    }

    #[test]
    fn test_delete_removes_file_and_manifest_entry() {
        let (_temp_dir, paths) = empty_project();
        let mut store = Store::open(paths.clone()).unwrap();
        add_song(&mut store, "1", "Keep", "k");
        let pos = add_song(&mut store, "2", "Drop", "d");
        store.persist().unwrap();

        store.songbook_mut().remove_song(pos).unwrap();
        store.persist().unwrap();

        assert_eq!(files_on_disk(&paths), vec!["001-keep.txt"]);
        let entries = parse(&fs::read_to_string(&paths.manifest_path).unwrap()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Keep");
    }

    #[test]
    fn test_unsaved_new_song_gets_file_on_persist() {
        let (_temp_dir, paths) = empty_project();
        let mut store = Store::open(paths.clone()).unwrap();
        store.songbook_mut().create_song();
        store.persist().unwrap();

        assert_eq!(files_on_disk(&paths), vec!["001-new-song.txt"]);
        assert_eq!(store.songs()[0].file, "001-new-song.txt");
    }

    #[test]
    fn test_failed_write_keeps_stale_schedule() {
        let (_temp_dir, paths) = empty_project();
        let mut store = Store::open(paths.clone()).unwrap();
        let pos = add_song(&mut store, "1", "A", "a");
        store.persist().unwrap();

        let draft = SongDraft::parse("1", "B", "b").unwrap();
        store.songbook_mut().save_song(pos, draft).unwrap();

        // Block the new file's name with a directory so the write fails.
        fs::create_dir_all(paths.songs_dir.join("001-b.txt")).unwrap();
        assert!(store.persist().is_err());
        assert!(paths.songs_dir.join("001-a.txt").exists());
        assert_eq!(store.songbook().stale_files().len(), 1);

        fs::remove_dir_all(paths.songs_dir.join("001-b.txt")).unwrap();
        store.persist().unwrap();
        assert_eq!(files_on_disk(&paths), vec!["001-b.txt"]);
    }
}
