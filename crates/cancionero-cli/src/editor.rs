//! Lyrics editing
//!
//! Lyrics open in the user's editor as a file named like the song file
//! (`012-gloria.txt`), so the editor title shows which song is being edited.

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;

use cancionero_core::filename::base_filename;

/// Editor command from $EDITOR or $VISUAL, split into program and arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsEditor {
    program: String,
    args: Vec<String>,
}

impl LyricsEditor {
    /// Editor configured in the environment
    pub fn from_env() -> Result<Self> {
        let configured = [env::var("EDITOR").ok(), env::var("VISUAL").ok()]
            .into_iter()
            .flatten()
            .find(|value| !value.trim().is_empty());

        match configured {
            Some(command) => Self::parse(&command),
            None => bail!(
                "No editor configured. Set $EDITOR (for example `export EDITOR=nano`) \
                 or pass the lyrics with --body."
            ),
        }
    }

    /// Split a command line such as `code --wait`
    fn parse(command: &str) -> Result<Self> {
        let mut words = command.split_whitespace().map(str::to_string);
        let Some(program) = words.next() else {
            bail!("Editor command is empty");
        };
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    /// Edit the lyrics of song `number`/`title`, returning the new text
    pub fn edit(&self, number: u32, title: &str, body: &str) -> Result<String> {
        // Removed with everything in it when dropped
        let scratch = tempfile::Builder::new()
            .prefix("cancionero-")
            .tempdir()
            .context("Failed to create a scratch directory for editing")?;
        let path = scratch.path().join(base_filename(number, title));

        fs::write(&path, format!("{}\n", body.trim_end()))
            .with_context(|| format!("Failed to prepare {:?} for editing", path))?;
        self.run(&path)
    }

    fn run(&self, path: &Path) -> Result<String> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .with_context(|| format!("Failed to run editor: {}", self.program))?;

        if !status.success() {
            bail!(
                "Editor '{}' exited with {}. The song was not changed.",
                self.program,
                status
            );
        }

        fs::read_to_string(path).with_context(|| format!("Failed to read edited lyrics {:?}", path))
    }
}

/// Whether an editor can be opened: stdin and stdout are both terminals
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}

/// Ask a yes/no question; anything but "y"/"yes" is no, and so is a
/// non-terminal stdin.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
