//! Core library for the cancionero songbook tool.
//!
//! `chords` holds the pure text engine, `importer` turns a plain-text
//! songbook dump into stored songs, and `db` is the SQLite store the `bin`
//! target drives.
pub mod chords;
pub mod config;
pub mod db;
pub mod error;
pub mod importer;
pub mod models;

/// Persistence entry points used by `main.rs`.
pub use db::{ensure_schema, find_song_by_title_or_slug, SongKey, SongStore};

pub use config::Config;
pub use error::{ConfigError, ImportError};
pub use importer::{ImportReport, Importer};
pub use models::{NewSong, Song, SongUpdate};
