//! Slug generation
//!
//! Turns song titles into the ASCII fragment used in song filenames.

/// Slug used when a title contains nothing usable
pub const FALLBACK_SLUG: &str = "cancion";

/// Map the accented vowels and `ñ` to their plain ASCII letter.
///
/// Expects lowercase input; anything outside the table is returned unchanged.
pub fn fold_accent(c: char) -> char {
    match c {
        'á' => 'a',
        'é' => 'e',
        'í' => 'i',
        'ó' => 'o',
        'ú' | 'ü' => 'u',
        'ñ' => 'n',
        other => other,
    }
}

/// Lowercase and fold accents, leaving every other character in place
pub fn fold(text: &str) -> String {
    text.to_lowercase().chars().map(fold_accent).collect()
}

/// Build the filename slug for a title.
///
/// Every run of characters outside `[a-z0-9]` becomes a single hyphen and
/// leading/trailing hyphens are dropped. Falls back to [`FALLBACK_SLUG`].
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in fold(title).chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}
