//! Song filename assignment
//!
//! Filenames look like `NNN-slug.txt`: the song number zero-padded to at
//! least three digits followed by the title slug. Collisions with files
//! already used by other songs get a `-2`, `-3`, ... suffix.

use std::collections::HashSet;

use crate::slug::slugify;

/// Extension of every song file
pub const SONG_EXTENSION: &str = "txt";

/// Base filename for a song, before collision handling
pub fn base_filename(number: u32, title: &str) -> String {
    format!("{:03}-{}.{}", number, slugify(title), SONG_EXTENSION)
}

/// Derive a filename that is not in `in_use`.
///
/// `in_use` must hold the files of every *other* song so a song being
/// re-saved never collides with its own previous name.
pub fn assign_filename(number: u32, title: &str, in_use: &HashSet<&str>) -> String {
    let stem = format!("{:03}-{}", number, slugify(title));
    let mut candidate = format!("{}.{}", stem, SONG_EXTENSION);
    let mut suffix = 2u32;

    while in_use.contains(candidate.as_str()) {
        candidate = format!("{}-{}.{}", stem, suffix, SONG_EXTENSION);
        suffix += 1;
    }

    candidate
}
