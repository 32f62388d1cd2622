//! Cancionero Core Library
//!
//! This crate provides the core functionality for Cancionero, a songbook
//! kept as plain text files in a git repository.
//!
//! # Architecture
//!
//! - **Song files**: one `NNN-slug.txt` per song under `songs/`
//! - **Manifest**: `songs/index.json`, the ordered metadata of every song
//! - **Git**: the songs directory is committed and pushed after each change
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let paths = ProjectPaths::discover(&config)?;
//! let mut store = Store::open(paths)?;
//!
//! // Edit a song
//! let draft = SongDraft::parse("12", "Amazing Grace", "line1\nline2")?;
//! store.songbook_mut().save_song(0, draft)?;
//!
//! // Persist and publish
//! let git = GitClient::discover(&config, &store.paths().root)?;
//! let mut engine = SyncEngine::from_config(git, &config);
//! engine.synchronize(&mut store, "Update song")?;
//! ```
//!
//! # Modules
//!
//! - `store`: Loads and persists a project's songbook (main entry point)
//! - `songbook`: The sorted in-memory collection
//! - `models`: Songs and validated edits
//! - `slug` / `filename`: Filename derivation
//! - `storage`: Song files and manifest on disk
//! - `sync`: Git synchronization
//! - `view`: Search over a songbook snapshot
//! - `project` / `config`: Locating the project and configuration

pub mod config;
pub mod error;
pub mod filename;
pub mod models;
pub mod project;
pub mod slug;
pub mod songbook;
pub mod storage;
pub mod store;
pub mod sync;
pub mod view;

pub use config::Config;
pub use error::{Error, FsOp, Result, SyncError, SyncStep, ValidationError};
pub use models::{Song, SongDraft};
pub use project::ProjectPaths;
pub use songbook::{SavedSong, Songbook, StaleFile};
pub use store::{PersistSummary, Store};
pub use sync::{GitClient, SyncEngine, SyncOutcome, SyncPhase, VcsError, VersionControl};
pub use view::SongView;
