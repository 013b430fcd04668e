//! Song records as stored and passed between the importer, the store and the
//! CLI. These stay plain data holders; the chord logic lives in `chords`.

use std::fmt;

use serde::Serialize;

/// A stored song. `lyrics` is always the chord-free projection of
/// `lyrics_chords`; the store derives it on every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Song {
    /// Primary key from the SQLite store.
    pub id: i64,
    /// URL identifier. Empty for rows created before slugs existed.
    pub slug: String,
    pub title: String,
    pub artist: Option<String>,
    /// Key the chords in `lyrics_chords` are written in.
    pub original_key: String,
    pub lyrics: String,
    /// Lyrics with inline `[Chord]` markers; the source of truth.
    pub lyrics_chords: String,
    /// Optional short summary such as `"G - Em - C - D"`.
    pub chord_progression: Option<String>,
}

impl Song {
    /// `Title - Artist`, or just the title when there is no artist.
    pub fn display_title(&self) -> String {
        match self.artist.as_deref().map(str::trim) {
            Some(artist) if !artist.is_empty() => format!("{} - {}", self.title, artist),
            _ => self.title.clone(),
        }
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_title())
    }
}

/// Fields for a song that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSong {
    pub slug: String,
    pub title: String,
    pub artist: Option<String>,
    pub original_key: String,
    pub lyrics_chords: String,
    pub chord_progression: Option<String>,
}

/// A partial update. `None` leaves the stored value alone; the nested
/// options on nullable columns allow clearing them with `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongUpdate {
    pub title: Option<String>,
    pub artist: Option<Option<String>>,
    pub original_key: Option<String>,
    pub lyrics_chords: Option<String>,
    pub chord_progression: Option<Option<String>>,
}

impl SongUpdate {
    /// Apply the present fields onto `song`, re-deriving plain lyrics when
    /// the annotated text changes.
    pub fn apply_to(self, song: &mut Song) {
        if let Some(title) = self.title {
            song.title = title;
        }
        if let Some(artist) = self.artist {
            song.artist = artist;
        }
        if let Some(key) = self.original_key {
            song.original_key = key;
        }
        if let Some(lyrics_chords) = self.lyrics_chords {
            song.lyrics = crate::chords::strip_chord_markers(&lyrics_chords);
            song.lyrics_chords = lyrics_chords;
        }
        if let Some(progression) = self.chord_progression {
            song.chord_progression = progression;
        }
    }
}
