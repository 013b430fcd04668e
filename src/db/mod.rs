//! Persistence for song records, split across logical submodules.
//!
//! The importer only needs the three calls on [`SongStore`]; the free
//! functions cover what the CLI does on top of that.

mod connection;
mod songs;

use anyhow::Result;

use crate::models::{NewSong, Song, SongUpdate};

pub use connection::{default_db_path, ensure_schema, init_schema, open_in_memory};
pub use songs::{
    backfill_slugs, create_song, delete_song, fetch_all_songs, fetch_song,
    find_song_by_slug, find_song_by_title, find_song_by_title_or_slug, search_songs, update_song,
};

/// How to look a song up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongKey<'a> {
    Title(&'a str),
    Slug(&'a str),
}

/// What the importer needs from a song store.
pub trait SongStore {
    fn find_song(&self, key: SongKey<'_>) -> Result<Option<Song>>;

    fn create_song(&mut self, song: NewSong) -> Result<Song>;

    fn update_song(&mut self, id: i64, changes: SongUpdate) -> Result<Song>;

    fn slug_exists(&self, slug: &str) -> Result<bool> {
        Ok(self.find_song(SongKey::Slug(slug))?.is_some())
    }
}
