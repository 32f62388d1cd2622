//! Status command handler

use anyhow::Result;

use cancionero_core::{Config, GitClient, Store};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &Store, config: &Config, output: &Output) -> Result<()> {
    let paths = store.paths();
    let on_disk = store.files().list()?;
    let untracked = untracked_files(store, &on_disk);
    let git = GitClient::discover(config, &paths.root).ok();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "root": paths.root,
                    "songs_dir": paths.songs_dir,
                    "manifest": paths.manifest_path,
                    "git": {
                        "program": git.as_ref().map(|g| g.program().to_path_buf()),
                        "remote": config.remote,
                        "branch": config.branch,
                    },
                    "counts": {
                        "songs": store.songs().len(),
                        "files": on_disk.len(),
                        "untracked_files": untracked,
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", paths.root.display());
        }
        OutputFormat::Human => {
            println!("Cancionero Status");
            println!("=================");
            println!();
            println!("Project:");
            println!("  Root:     {}", paths.root.display());
            println!("  Songs:    {}", paths.songs_dir.display());
            println!("  Manifest: {}", paths.manifest_path.display());
            println!();
            println!("Git:");
            match &git {
                Some(g) => println!("  Program: {}", g.program().display()),
                None => println!("  Program: (not found)"),
            }
            println!("  Remote:  {}", config.remote);
            println!("  Branch:  {}", config.branch);
            println!();
            println!("Contents:");
            println!("  Songs: {}", store.songs().len());
            println!("  Files: {}", on_disk.len());
            if !untracked.is_empty() {
                println!();
                println!("Files not in the manifest:");
                for file in &untracked {
                    println!("  {}", file);
                }
            }
        }
    }

    Ok(())
}

/// Song files on disk that no song refers to
fn untracked_files(store: &Store, on_disk: &[String]) -> Vec<String> {
    let in_use = store.songbook().files_in_use();
    on_disk
        .iter()
        .filter(|f| !in_use.contains(f.as_str()))
        .cloned()
        .collect()
}
