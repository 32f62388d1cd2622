//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use cancionero_core::{Error, Song};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single song with its lyrics
    pub fn print_song(&self, id: usize, song: &Song) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:     {}", id);
                println!("Number: {}", song.number);
                println!("Title:  {}", song.title);
                if song.has_file() {
                    println!("File:   {}", song.file);
                }
                println!();
                if song.body.is_empty() {
                    println!("(no lyrics)");
                } else {
                    println!("{}", song.body);
                }
            }
            OutputFormat::Json => {
                println!("{}", to_json(&song_json(id, song)));
            }
            OutputFormat::Quiet => {
                println!("{}", id);
            }
        }
    }

    /// Print songs at the given songbook positions
    pub fn print_songs(&self, songs: &[Song], positions: &[usize]) {
        match self.format {
            OutputFormat::Human => {
                if positions.is_empty() {
                    println!("No songs found.");
                    return;
                }
                for &pos in positions {
                    let song = &songs[pos];
                    println!(
                        "{:>4} | {} | {}",
                        pos + 1,
                        truncate(&song.label(), 45),
                        truncate_line(&song.body, 30)
                    );
                }
                println!("\n{} song(s)", positions.len());
            }
            OutputFormat::Json => {
                let json_songs: serde_json::Value = positions
                    .iter()
                    .map(|&pos| song_json(pos + 1, &songs[pos]))
                    .collect();
                println!("{}", to_json(&json_songs));
            }
            OutputFormat::Quiet => {
                for &pos in positions {
                    println!("{}", pos + 1);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Report a failed command on stderr, with a hint when one is known
    pub fn error(&self, error: &anyhow::Error) {
        let suggestion = error
            .downcast_ref::<Error>()
            .and_then(Error::recovery_suggestion);

        match self.format {
            OutputFormat::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "status": "error",
                        "message": format!("{:#}", error),
                        "suggestion": suggestion,
                    })
                );
            }
            OutputFormat::Human | OutputFormat::Quiet => {
                eprintln!("Error: {:#}", error);
                if let Some(hint) = suggestion {
                    eprintln!("Hint: {}", hint);
                }
            }
        }
    }
}

/// JSON shape of a song; `id` is the listing id, not the manifest id
fn song_json(id: usize, song: &Song) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "number": song.number,
        "title": song.title,
        "file": song.file,
        "body": song.body,
    })
}

fn to_json(value: &serde_json::Value) -> String {
    // Serializing a Value cannot fail
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}
