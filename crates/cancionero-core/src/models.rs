//! Data models for Cancionero
//!
//! A `Song` is one record of the songbook: manifest metadata plus the body
//! text kept in its own file.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Title given to freshly created songs
pub const NEW_SONG_TITLE: &str = "New song";

/// A song in the songbook
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Song {
    /// 1-based position in sorted order, recomputed on every persist.
    /// Not stable across saves.
    pub id: u32,
    /// User-chosen ordering number (not unique)
    pub number: u32,
    /// Display title
    pub title: String,
    /// Filename relative to the songs directory; empty until assigned
    pub file: String,
    /// Lyrics, without a trailing newline
    pub body: String,
}

impl Song {
    /// Create a song that has no file yet
    pub fn new(number: u32, title: impl Into<String>) -> Self {
        Self {
            id: 0,
            number,
            title: title.into(),
            file: String::new(),
            body: String::new(),
        }
    }

    /// Check if a file has been assigned
    pub fn has_file(&self) -> bool {
        !self.file.is_empty()
    }

    /// `"{number}. {title}"`, as shown in listings
    pub fn label(&self) -> String {
        format!("{}. {}", self.number, self.title)
    }

    /// Songbook order: number, then title, then file.
    pub fn sort_cmp(&self, other: &Song) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.title.cmp(&other.title))
            .then_with(|| self.file.cmp(&other.file))
    }
}

/// Validated field edits for one song
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongDraft {
    pub number: u32,
    pub title: String,
    pub body: String,
}

impl SongDraft {
    /// Validate raw editor input.
    ///
    /// The number must be plain ASCII digits with a value of at least 1 and
    /// the trimmed title must not be empty. Trailing whitespace of the body
    /// is dropped.
    pub fn parse(number: &str, title: &str, body: &str) -> Result<Self, ValidationError> {
        let raw_number = number.trim();
        if raw_number.is_empty() || !raw_number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidNumber(raw_number.to_string()));
        }
        let number: u32 = raw_number
            .parse()
            .map_err(|_| ValidationError::InvalidNumber(raw_number.to_string()))?;
        if number == 0 {
            return Err(ValidationError::InvalidNumber(raw_number.to_string()));
        }

        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        Ok(Self {
            number,
            title: title.to_string(),
            body: body.trim_end().to_string(),
        })
    }

    /// Draft pre-filled with the current values of a song
    pub fn from_song(song: &Song) -> Self {
        Self {
            number: song.number,
            title: song.title.clone(),
            body: song.body.clone(),
        }
    }
}
