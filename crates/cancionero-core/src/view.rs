//! Filtered views over a songbook
//!
//! A view holds positions into one snapshot of the songbook. It is rebuilt
//! for every query rather than patched when the songbook changes.

use crate::slug::fold;
use crate::songbook::Songbook;

/// Positions of the songs matching a query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SongView {
    query: String,
    positions: Vec<usize>,
}

impl SongView {
    /// Match `query` against each song's label and body.
    ///
    /// Matching ignores case and the accents folded by the slug generator.
    /// An empty query selects every song.
    pub fn filter(book: &Songbook, query: &str) -> Self {
        let needle = fold(query.trim());
        let positions = book
            .songs()
            .iter()
            .enumerate()
            .filter(|(_, song)| {
                needle.is_empty()
                    || fold(&format!("{}\n{}", song.label(), song.body)).contains(&needle)
            })
            .map(|(i, _)| i)
            .collect();

        Self {
            query: query.trim().to_string(),
            positions,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Positions into the songbook, in songbook order
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Songbook position of the `index`-th visible row
    pub fn position_of(&self, index: usize) -> Option<usize> {
        self.positions.get(index).copied()
    }

    /// Visible row showing the song at `position`, if any
    pub fn index_of(&self, position: usize) -> Option<usize> {
        self.positions.iter().position(|&p| p == position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Song;

    fn book() -> Songbook {
        let mut grace = Song::new(1, "Amazing Grace");
        grace.body = "How sweet the sound".into();
        let mut cancion = Song::new(2, "Canción del Niño");
        cancion.body = "Duérmete ya".into();
        let mut salmo = Song::new(23, "Salmo");
        salmo.body = "El Señor es mi pastor".into();
        Songbook::new(vec![grace, cancion, salmo])
    }

    #[test]
    fn test_empty_query_selects_all() {
        let view = SongView::filter(&book(), "  ");
        assert_eq!(view.positions(), &[0, 1, 2]);
    }

    #[test]
    fn test_matches_title_and_body_ignoring_accents() {
        let book = book();
        assert_eq!(SongView::filter(&book, "cancion").positions(), &[1]);
        assert_eq!(SongView::filter(&book, "DUERMETE").positions(), &[1]);
        assert_eq!(SongView::filter(&book, "señor").positions(), &[2]);
        assert_eq!(SongView::filter(&book, "senor").positions(), &[2]);
    }

    #[test]
    fn test_matches_number_label() {
        let view = SongView::filter(&book(), "23.");
        assert_eq!(view.positions(), &[2]);
    }

    #[test]
    fn test_no_matches() {
        let view = SongView::filter(&book(), "xyz");
        assert!(view.is_empty());
        assert_eq!(view.position_of(0), None);
    }

    #[test]
    fn test_index_mapping() {
        let view = SongView::filter(&book(), "a");
        assert_eq!(view.query(), "a");
        for (index, &position) in view.positions().iter().enumerate() {
            assert_eq!(view.position_of(index), Some(position));
            assert_eq!(view.index_of(position), Some(index));
        }
    }
}
