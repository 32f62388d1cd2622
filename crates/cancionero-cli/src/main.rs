//! Cancionero CLI
//!
//! Command-line interface for Cancionero - edit the songbook and publish it
//! to git.

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cancionero_core::{Config, GitClient, ProjectPaths, Store, SyncEngine};

mod commands;
mod editor;
mod output;

use commands::song::SongFields;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "cancionero")]
#[command(about = "Cancionero - a songbook of plain text files published with git")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Save files locally without committing or pushing
    #[arg(long, global = true)]
    local: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List songs
    #[command(alias = "ls")]
    List {
        /// Only songs whose title or lyrics contain this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Show one song with its lyrics
    Show {
        /// Song id as shown by `list`
        id: usize,
    },
    /// Create a song, save it and publish
    #[command(alias = "add")]
    New {
        #[command(flatten)]
        fields: SongFields,
    },
    /// Edit a song, save it and publish
    Edit {
        /// Song id as shown by `list`
        id: usize,
        #[command(flatten)]
        fields: SongFields,
    },
    /// Delete a song and publish
    #[command(alias = "rm")]
    Delete {
        /// Song id as shown by `list`
        id: usize,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Save every song and publish pending changes
    Sync,
    /// Show project paths, counts and git settings
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (root, remote, branch, git_path, git_timeout_secs, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

impl Commands {
    /// Commands that change the songbook and publish it
    fn publishes(&self) -> bool {
        matches!(
            self,
            Commands::New { .. } | Commands::Edit { .. } | Commands::Delete { .. } | Commands::Sync
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    match run(cli, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output.error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, output: &Output) -> Result<()> {
    let config = Config::load_with_cli_override(cli.config.as_ref())?;
    init_logging(&config);

    let command = cli.command.unwrap_or(Commands::List { filter: None });

    // Config commands work outside a project
    if let Commands::Config { command } = command {
        return match command {
            Some(ConfigCommands::Show) | None => {
                commands::config::show(cli.config.as_ref(), output)
            }
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, cli.config.as_ref(), output)
            }
        };
    }

    let paths = ProjectPaths::discover(&config)?;

    // Find git before touching anything so a missing tool fails up front
    let mut engine = if command.publishes() && !cli.local {
        let git = GitClient::discover(&config, &paths.root)?;
        Some(SyncEngine::from_config(git, &config))
    } else {
        None
    };

    let mut store = Store::open(paths)?;
    info!(songs = store.songs().len(), "store ready");

    match command {
        Commands::List { filter } => commands::song::list(&store, filter.as_deref(), output),
        Commands::Show { id } => commands::song::show(&store, id, output),
        Commands::New { fields } => {
            commands::song::create(&mut store, fields, engine.as_mut(), output)
        }
        Commands::Edit { id, fields } => {
            commands::song::edit(&mut store, id, fields, engine.as_mut(), output)
        }
        Commands::Delete { id, yes } => {
            commands::song::delete(&mut store, id, yes, engine.as_mut(), output)
        }
        Commands::Sync => commands::sync::sync(&mut store, engine.as_mut(), output),
        Commands::Status => commands::status::show(&store, &config, output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// Set up tracing, filtered by CANCIONERO_LOG (default: warn)
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_env("CANCIONERO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    // Ignore errors if already initialized
    match &config.log_file {
        Some(log_path) => {
            let log_file = match File::create(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
                    return;
                }
            };
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
