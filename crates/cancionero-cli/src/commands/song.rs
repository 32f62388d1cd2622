//! Song command handlers

use anyhow::{Context, Result};
use clap::Args;

use cancionero_core::models::NEW_SONG_TITLE;
use cancionero_core::{
    Error, GitClient, Song, SongDraft, SongView, Store, SyncEngine, ValidationError,
};

use super::sync::publish;
use crate::editor::{confirm, is_interactive, LyricsEditor};
use crate::output::Output;

pub const ADD_ACTION: &str = "Add song";
pub const UPDATE_ACTION: &str = "Update song";
pub const DELETE_ACTION: &str = "Delete song";

/// Editable fields of a song
#[derive(Args, Debug, Clone, Default)]
pub struct SongFields {
    /// Song number (a positive integer)
    #[arg(short, long)]
    pub number: Option<String>,

    /// Song title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Lyrics; opens $EDITOR when omitted in a terminal
    #[arg(short, long)]
    pub body: Option<String>,
}

impl SongFields {
    fn is_empty(&self) -> bool {
        self.number.is_none() && self.title.is_none() && self.body.is_none()
    }

    /// Validate the fields, falling back to `current` for any left out
    fn into_draft(self, current: &SongDraft) -> Result<SongDraft, ValidationError> {
        let number = self.number.unwrap_or_else(|| current.number.to_string());
        let title = self.title.unwrap_or_else(|| current.title.clone());
        let body = self.body.unwrap_or_else(|| current.body.clone());
        SongDraft::parse(&number, &title, &body)
    }
}

/// List songs, optionally filtered
pub fn list(store: &Store, filter: Option<&str>, output: &Output) -> Result<()> {
    let view = SongView::filter(store.songbook(), filter.unwrap_or(""));
    output.print_songs(store.songs(), view.positions());
    Ok(())
}

/// Show one song
pub fn show(store: &Store, id: usize, output: &Output) -> Result<()> {
    let position = resolve(store, id)?;
    output.print_song(id, &store.songs()[position]);
    Ok(())
}

/// Create a song and publish it
pub fn create(
    store: &mut Store,
    fields: SongFields,
    engine: Option<&mut SyncEngine<GitClient>>,
    output: &Output,
) -> Result<()> {
    let open_editor = fields.body.is_none() && is_interactive();
    let defaults = SongDraft {
        number: store.songbook().next_number(),
        title: NEW_SONG_TITLE.to_string(),
        body: String::new(),
    };
    // Validate before the songbook changes
    let mut draft = fields.into_draft(&defaults).map_err(Error::from)?;
    if open_editor {
        draft = edit_lyrics(draft)?;
    }

    let songbook = store.songbook_mut();
    let position = songbook.create_song();
    let saved = songbook.save_song(position, draft).map_err(Error::from)?;
    let label = songbook.songs()[saved.position].label();

    publish(store, engine, ADD_ACTION, output)?;
    output.success(&format!("Added song {}: {}", saved.position + 1, label));
    Ok(())
}

/// Edit a song and publish the change
pub fn edit(
    store: &mut Store,
    id: usize,
    fields: SongFields,
    engine: Option<&mut SyncEngine<GitClient>>,
    output: &Output,
) -> Result<()> {
    let position = resolve(store, id)?;
    let current = SongDraft::from_song(&store.songs()[position]);

    let open_editor = fields.is_empty();
    if open_editor && !is_interactive() {
        anyhow::bail!("Nothing to change. Pass --number, --title or --body.");
    }

    let mut draft = fields.into_draft(&current).map_err(Error::from)?;
    if open_editor {
        draft = edit_lyrics(draft)?;
    }
    if draft == current {
        output.message("No changes.");
        return Ok(());
    }

    let saved = store
        .songbook_mut()
        .save_song(position, draft)
        .map_err(Error::from)?;
    let label = store.songs()[saved.position].label();

    publish(store, engine, UPDATE_ACTION, output)?;
    output.success(&format!("Updated song {}: {}", saved.position + 1, label));
    Ok(())
}

/// Delete a song and publish the removal
pub fn delete(
    store: &mut Store,
    id: usize,
    yes: bool,
    engine: Option<&mut SyncEngine<GitClient>>,
    output: &Output,
) -> Result<()> {
    let position = resolve(store, id)?;

    if !yes && output.should_prompt() {
        println!("Delete song: {}", store.songs()[position].label());
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed: Song = store
        .songbook_mut()
        .remove_song(position)
        .map_err(Error::from)?;

    publish(store, engine, DELETE_ACTION, output)?;
    output.success(&format!("Deleted song: {}", removed.label()));
    Ok(())
}

/// Let the user rewrite the lyrics of a validated draft
fn edit_lyrics(draft: SongDraft) -> Result<SongDraft> {
    let editor = LyricsEditor::from_env()?;
    let body = editor
        .edit(draft.number, &draft.title, &draft.body)
        .context("Failed to edit lyrics")?;
    Ok(SongDraft {
        body: body.trim_end().to_string(),
        ..draft
    })
}

/// Map a listing id (1-based) to a songbook position
fn resolve(store: &Store, id: usize) -> Result<usize> {
    match id.checked_sub(1) {
        Some(position) if position < store.songs().len() => Ok(position),
        _ => Err(Error::from(ValidationError::UnknownSong(id)).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use cancionero_core::ProjectPaths;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> (TempDir, Store) {
        let temp_dir = TempDir::new().unwrap();
        let paths = ProjectPaths::new(temp_dir.path());
        fs::create_dir_all(&paths.songs_dir).unwrap();
        fs::write(&paths.manifest_path, "[]").unwrap();
        let store = Store::open(paths).unwrap();
        (temp_dir, store)
    }

    fn fields(number: &str, title: &str, body: &str) -> SongFields {
        SongFields {
            number: Some(number.to_string()),
            title: Some(title.to_string()),
            body: Some(body.to_string()),
        }
    }

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    #[test]
    fn test_resolve_bounds() {
        let (_temp_dir, mut store) = project();
        create(&mut store, fields("1", "Gloria", "g"), None, &quiet()).unwrap();

        assert_eq!(resolve(&store, 1).unwrap(), 0);
        assert!(resolve(&store, 0).is_err());
        assert!(resolve(&store, 2).is_err());
    }

    #[test]
    fn test_create_saves_locally() {
        let (temp_dir, mut store) = project();
        create(
            &mut store,
            fields("7", "Amazing Grace", "line1\nline2"),
            None,
            &quiet(),
        )
        .unwrap();

        let path = temp_dir.path().join("songs").join("007-amazing-grace.txt");
        assert_eq!(fs::read_to_string(path).unwrap(), "line1\nline2\n");
    }

    #[test]
    fn test_create_rejects_invalid_number_without_changes() {
        let (_temp_dir, mut store) = project();
        let result = create(&mut store, fields("abc", "Gloria", ""), None, &quiet());

        assert!(result.is_err());
        assert!(store.songs().is_empty());
    }

    #[test]
    fn test_edit_keeps_unset_fields() {
        let (temp_dir, mut store) = project();
        create(&mut store, fields("1", "Old", "lyrics"), None, &quiet()).unwrap();

        let change = SongFields {
            title: Some("New".to_string()),
            ..Default::default()
        };
        edit(&mut store, 1, change, None, &quiet()).unwrap();

        let song = &store.songs()[0];
        assert_eq!(song.number, 1);
        assert_eq!(song.title, "New");
        assert_eq!(song.body, "lyrics");

        let songs_dir = temp_dir.path().join("songs");
        assert!(songs_dir.join("001-new.txt").exists());
        assert!(!songs_dir.join("001-old.txt").exists());
    }

    #[test]
    fn test_delete_with_yes() {
        let (temp_dir, mut store) = project();
        create(&mut store, fields("1", "Keep", "k"), None, &quiet()).unwrap();
        create(&mut store, fields("2", "Drop", "d"), None, &quiet()).unwrap();

        delete(&mut store, 2, true, None, &quiet()).unwrap();

        assert_eq!(store.songs().len(), 1);
        assert!(!temp_dir.path().join("songs").join("002-drop.txt").exists());
    }
}
