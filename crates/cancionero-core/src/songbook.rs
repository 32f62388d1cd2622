//! In-memory song collection
//!
//! The `Songbook` keeps its songs sorted by `(number, title)` after every
//! mutation. Saving or removing a song also records which files on disk have
//! become stale, so the next persist can clean them up after the new state
//! is written.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::filename::assign_filename;
use crate::models::{Song, SongDraft, NEW_SONG_TITLE};

/// Result of saving a song
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSong {
    /// Position of the song after re-sorting
    pub position: usize,
    /// Filename now assigned to the song
    pub file: String,
    /// Previous filename, if it changed
    pub previous_file: Option<String>,
}

/// A file on disk that no song claims anymore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleFile {
    pub file: String,
    /// Current name of the renamed song; `None` when the song was removed
    pub replaced_by: Option<String>,
}

impl StaleFile {
    fn removed(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            replaced_by: None,
        }
    }
}

/// Ordered collection of songs
#[derive(Debug, Clone, Default)]
pub struct Songbook {
    songs: Vec<Song>,
    stale_files: Vec<StaleFile>,
}

impl Songbook {
    /// Create a songbook from loaded songs, sorting them
    pub fn new(songs: Vec<Song>) -> Self {
        let mut book = Self {
            songs,
            stale_files: Vec::new(),
        };
        book.sort();
        book
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn get(&self, position: usize) -> Option<&Song> {
        self.songs.get(position)
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Files scheduled for removal on the next persist
    pub fn stale_files(&self) -> &[StaleFile] {
        &self.stale_files
    }

    /// Files currently assigned to songs
    pub fn files_in_use(&self) -> HashSet<&str> {
        self.songs
            .iter()
            .filter(|s| s.has_file())
            .map(|s| s.file.as_str())
            .collect()
    }

    /// Number suggested for a new song: one past the highest, capped at
    /// `u32::MAX`
    pub fn next_number(&self) -> u32 {
        self.songs
            .iter()
            .map(|s| s.number)
            .max()
            .unwrap_or(0)
            .saturating_add(1)
    }

    /// Append a placeholder song and return its position
    pub fn create_song(&mut self) -> usize {
        let mut song = Song::new(self.next_number(), NEW_SONG_TITLE);
        song.id = self
            .songs
            .iter()
            .map(|s| s.id)
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        self.songs.push(song);
        let position = self.songs.len() - 1;
        self.sort_tracking(position)
    }

    /// Apply a validated draft to the song at `position`.
    ///
    /// Only this song gets a new filename; every other song keeps the one it
    /// has. If the name changed, the previous file is scheduled for removal.
    pub fn save_song(
        &mut self,
        position: usize,
        draft: SongDraft,
    ) -> Result<SavedSong, ValidationError> {
        if position >= self.songs.len() {
            return Err(ValidationError::UnknownSong(position));
        }

        let file = {
            let others: HashSet<&str> = self
                .songs
                .iter()
                .enumerate()
                .filter(|(i, s)| *i != position && s.has_file())
                .map(|(_, s)| s.file.as_str())
                .collect();
            assign_filename(draft.number, &draft.title, &others)
        };

        let song = &mut self.songs[position];
        let previous = std::mem::replace(&mut song.file, file.clone());
        song.number = draft.number;
        song.title = draft.title;
        song.body = draft.body;

        let previous_file = if !previous.is_empty() && previous != file {
            // A rename of a rename still points at the newest name.
            for stale in &mut self.stale_files {
                if stale.replaced_by.as_deref() == Some(previous.as_str()) {
                    stale.replaced_by = Some(file.clone());
                }
            }
            self.stale_files.push(StaleFile {
                file: previous.clone(),
                replaced_by: Some(file.clone()),
            });
            Some(previous)
        } else {
            None
        };
        self.stale_files.retain(|s| s.file != file);

        let position = self.sort_tracking(position);
        Ok(SavedSong {
            position,
            file,
            previous_file,
        })
    }

    /// Remove the song at `position`, scheduling its file for deletion
    pub fn remove_song(&mut self, position: usize) -> Result<Song, ValidationError> {
        if position >= self.songs.len() {
            return Err(ValidationError::UnknownSong(position));
        }

        let song = self.songs.remove(position);
        if song.has_file() {
            for stale in &mut self.stale_files {
                if stale.replaced_by.as_deref() == Some(song.file.as_str()) {
                    stale.replaced_by = None;
                }
            }
            if !self.stale_files.iter().any(|s| s.file == song.file) {
                self.stale_files.push(StaleFile::removed(song.file.clone()));
            }
        }
        Ok(song)
    }

    /// Give a filename to every song that still has none
    pub fn assign_missing_files(&mut self) {
        for position in 0..self.songs.len() {
            if self.songs[position].has_file() {
                continue;
            }
            let file = {
                let in_use = self.files_in_use();
                let song = &self.songs[position];
                assign_filename(song.number, &song.title, &in_use)
            };
            self.stale_files.retain(|s| s.file != file);
            self.songs[position].file = file;
        }
    }

    /// Clear the file of every song whose file an earlier song already
    /// claims, returning the cleared names.
    ///
    /// Cleared songs get a fresh name from `assign_missing_files`.
    pub fn release_duplicate_files(&mut self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut released = Vec::new();
        for song in &mut self.songs {
            if !song.has_file() {
                continue;
            }
            if !seen.insert(song.file.clone()) {
                released.push(std::mem::take(&mut song.file));
            }
        }
        released
    }

    /// Set every id to the song's 1-based position
    pub fn renumber(&mut self) {
        for (i, song) in self.songs.iter_mut().enumerate() {
            song.id = (i + 1) as u32;
        }
    }

    /// Stale files that are not claimed by any song, draining the schedule
    pub(crate) fn take_stale_files(&mut self) -> Vec<StaleFile> {
        let stale = std::mem::take(&mut self.stale_files);
        let in_use = self.files_in_use();
        stale
            .into_iter()
            .filter(|s| !in_use.contains(s.file.as_str()))
            .collect()
    }

    /// Put back stale files that could not be removed
    pub(crate) fn restore_stale_files(&mut self, files: Vec<StaleFile>) {
        for stale in files {
            if !self.stale_files.iter().any(|s| s.file == stale.file) {
                self.stale_files.push(stale);
            }
        }
    }

    fn sort(&mut self) {
        self.songs.sort_by(Song::sort_cmp);
    }

    /// Sort and return where the song at `position` ended up
    fn sort_tracking(&mut self, position: usize) -> usize {
        let mut order: Vec<usize> = (0..self.songs.len()).collect();
        order.sort_by(|&a, &b| self.songs[a].sort_cmp(&self.songs[b]));

        let mut slots: Vec<Option<Song>> = self.songs.drain(..).map(Some).collect();
        self.songs = order
            .iter()
            .filter_map(|&i| slots[i].take())
            .collect();

        order.iter().position(|&i| i == position).unwrap_or(position)
    }
}
