//! Storage layer
//!
//! Handles the on-disk form of the songbook.
//!
//! ## Layout
//!
//! - **Song files**: one UTF-8 text file per song, body plus one newline
//! - **Manifest**: `index.json`, the ordered list of `{id, number, title, file}`
//!
//! Both live in the songs directory of the project. Writes go through a
//! temp file and rename so no file is ever left half-written.

pub mod files;
pub mod manifest;

pub use files::SongFiles;
pub use manifest::{Manifest, ManifestEntry};
