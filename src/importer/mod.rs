//! Batch import of a cancionero text dump into a [`SongStore`].
//!
//! The pipeline is strictly sequential: read the whole file, parse every
//! block, then look up and write one song at a time. Slug uniqueness is
//! probed before each insert without any locking, so two imports must never
//! run against the same store at once.

pub mod classify;
pub mod merge;
pub mod parser;
pub mod slug;

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::db::{SongKey, SongStore};
use crate::error::ImportError;
use crate::models::{NewSong, SongUpdate};

pub use classify::{HeuristicClassifier, LineClassifier, DEFAULT_SECTION_LABELS};
pub use merge::merge_chord_line;
pub use parser::{
    parse_block, parse_content, parse_songbook, Block, ImportSettings, ParsedSong, Songbook,
};
pub use slug::{slugify, unique_slug};

/// A song that could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFailure {
    pub title: String,
    pub error: String,
}

/// Tally of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub updated: usize,
    /// Titles skipped because the source has no lyrics for them.
    pub skipped: Vec<String>,
    /// Blocks without a `TITULO:` line.
    pub untitled: usize,
    pub failures: Vec<ImportFailure>,
    /// Songs parsed from the file, whatever their outcome.
    pub total: usize,
}

impl ImportReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Imported: {}", self.imported)?;
        writeln!(f, "Updated:  {}", self.updated)?;
        writeln!(f, "Skipped:  {}", self.skipped.len())?;
        writeln!(f, "Failed:   {}", self.failed())?;
        write!(f, "Total:    {}", self.total)
    }
}

enum Outcome {
    Imported { slug: String },
    Updated,
}

/// Drives parsed songs into a store, inserting new titles and updating the
/// ones already present.
pub struct Importer<'s, S: SongStore + ?Sized, C: LineClassifier = HeuristicClassifier> {
    store: &'s mut S,
    settings: ImportSettings,
    classifier: C,
}

impl<'s, S: SongStore + ?Sized> Importer<'s, S, HeuristicClassifier> {
    /// Importer using the heuristic classifier with the configured labels.
    pub fn new(store: &'s mut S, settings: ImportSettings) -> Self {
        let classifier = HeuristicClassifier::with_labels(&settings.section_labels);
        Self {
            store,
            settings,
            classifier,
        }
    }
}

impl<'s, S: SongStore + ?Sized, C: LineClassifier> Importer<'s, S, C> {
    pub fn with_classifier(store: &'s mut S, settings: ImportSettings, classifier: C) -> Self {
        Self {
            store,
            settings,
            classifier,
        }
    }

    /// Read `path` and import every song in it. Only an unreadable file is
    /// an error; per-song failures end up in the report.
    pub fn import_file(&mut self, path: &Path) -> Result<ImportReport, ImportError> {
        let text = fs::read_to_string(path).map_err(|source| ImportError::Input {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "starting song import");
        Ok(self.import_text(&text))
    }

    pub fn import_text(&mut self, text: &str) -> ImportReport {
        let book = parse_songbook(text, &self.settings);
        info!(songs = book.songs.len(), "parsed songbook");

        for title in &book.no_lyrics {
            debug!(%title, "skipping song without lyrics");
        }
        if book.untitled > 0 {
            debug!(blocks = book.untitled, "skipping blocks without a title");
        }

        let mut report = ImportReport {
            skipped: book.no_lyrics,
            untitled: book.untitled,
            total: book.songs.len(),
            ..Default::default()
        };

        for song in &book.songs {
            match self.import_song(song) {
                Ok(Outcome::Imported { slug }) => {
                    info!(title = %song.title, %slug, "imported song");
                    report.imported += 1;
                }
                Ok(Outcome::Updated) => {
                    info!(title = %song.title, "updated song");
                    report.updated += 1;
                }
                Err(err) => {
                    let error = format!("{err:#}");
                    warn!(title = %song.title, %error, "failed to import song");
                    report.failures.push(ImportFailure {
                        title: song.title.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            imported = report.imported,
            updated = report.updated,
            skipped = report.skipped.len(),
            failed = report.failed(),
            "import finished"
        );
        report
    }

    fn import_song(&mut self, song: &ParsedSong) -> Result<Outcome> {
        let lyrics_chords = parse_content(&song.content, &self.classifier);

        if let Some(existing) = self.store.find_song(SongKey::Title(&song.title))? {
            self.store.update_song(
                existing.id,
                SongUpdate {
                    artist: Some(song.artist.clone()),
                    original_key: Some(song.original_key.clone()),
                    lyrics_chords: Some(lyrics_chords),
                    ..Default::default()
                },
            )?;
            return Ok(Outcome::Updated);
        }

        let store = &*self.store;
        let slug = unique_slug(&song.title, |candidate| {
            let taken = store.slug_exists(candidate)?;
            if taken {
                debug!(%candidate, "slug already taken");
            }
            Ok(taken)
        })?;

        self.store.create_song(NewSong {
            slug: slug.clone(),
            title: song.title.clone(),
            artist: song.artist.clone(),
            original_key: song.original_key.clone(),
            lyrics_chords,
            chord_progression: None,
        })?;
        Ok(Outcome::Imported { slug })
    }
}
