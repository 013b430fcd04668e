//! Song queries. Every function takes a borrowed connection so the CLI and
//! the importer can share one handle, and every rusqlite call carries a
//! `failed to ...` context so a failing statement is identifiable from the
//! error chain alone.
//!
//! Writes go through [`create_song`] and [`update_song`], which both derive
//! the plain `lyrics` column from `lyrics_chords`. Nothing else writes those
//! two columns.

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::chords::strip_chord_markers;
use crate::importer::slug::unique_slug;
use crate::models::{NewSong, Song, SongUpdate};

use super::{SongKey, SongStore};

/// Column list shared by every query that hydrates a [`Song`].
const SONG_COLUMNS: &str = "id, COALESCE(slug, ''), title, artist, original_key, lyrics, \
                            lyrics_chords, chord_progression";

fn song_from_row(row: &Row<'_>) -> rusqlite::Result<Song> {
    Ok(Song {
        id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get(2)?,
        artist: row.get(3)?,
        original_key: row.get(4)?,
        lyrics: row.get(5)?,
        lyrics_chords: row.get(6)?,
        chord_progression: row.get(7)?,
    })
}

/// Fetch every song, ordered case-insensitively by title.
pub fn fetch_all_songs(conn: &Connection) -> Result<Vec<Song>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SONG_COLUMNS} FROM songs ORDER BY title COLLATE NOCASE, artist COLLATE NOCASE"
        ))
        .context("failed to prepare all songs query")?;

    let songs = stmt
        .query_map([], song_from_row)
        .context("failed to iterate songs")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect songs")?;

    Ok(songs)
}

/// Songs whose title or artist contains `query`, ignoring ASCII case.
pub fn search_songs(conn: &Connection, query: &str) -> Result<Vec<Song>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SONG_COLUMNS} FROM songs
             WHERE title LIKE '%' || ?1 || '%' OR artist LIKE '%' || ?1 || '%'
             ORDER BY title COLLATE NOCASE, artist COLLATE NOCASE"
        ))
        .context("failed to prepare song search query")?;

    let songs = stmt
        .query_map([query.trim()], song_from_row)
        .context("failed to iterate song search results")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect song search results")?;

    Ok(songs)
}

/// Load a single song by primary key.
pub fn fetch_song(conn: &Connection, id: i64) -> Result<Option<Song>> {
    conn.query_row(
        &format!("SELECT {SONG_COLUMNS} FROM songs WHERE id = ?1"),
        [id],
        song_from_row,
    )
    .optional()
    .context("failed to load song")
}

/// First song with exactly this title.
pub fn find_song_by_title(conn: &Connection, title: &str) -> Result<Option<Song>> {
    conn.query_row(
        &format!("SELECT {SONG_COLUMNS} FROM songs WHERE title = ?1 ORDER BY id LIMIT 1"),
        [title],
        song_from_row,
    )
    .optional()
    .context("failed to look up song by title")
}

/// Song with this exact slug. Slugs are unique, so there is at most one.
pub fn find_song_by_slug(conn: &Connection, slug: &str) -> Result<Option<Song>> {
    conn.query_row(
        &format!("SELECT {SONG_COLUMNS} FROM songs WHERE slug = ?1"),
        [slug],
        song_from_row,
    )
    .optional()
    .context("failed to look up song by slug")
}

/// Resolve a user-supplied key, trying the slug first and then the title.
pub fn find_song_by_title_or_slug(conn: &Connection, key: &str) -> Result<Option<Song>> {
    let key = key.trim();
    match find_song_by_slug(conn, key)? {
        Some(song) => Ok(Some(song)),
        None => find_song_by_title(conn, key),
    }
}

/// Insert a brand new song. Plain lyrics are derived from the annotated text
/// here so the two columns can never disagree.
pub fn create_song(conn: &Connection, song: &NewSong) -> Result<Song> {
    let lyrics = strip_chord_markers(&song.lyrics_chords);
    conn.execute(
        "INSERT INTO songs
             (slug, title, artist, original_key, lyrics, lyrics_chords, chord_progression)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            song.slug,
            song.title,
            song.artist,
            song.original_key,
            lyrics,
            song.lyrics_chords,
            song.chord_progression,
        ],
    )
    .context("failed to insert song")?;

    let id = conn.last_insert_rowid();
    Ok(Song {
        id,
        slug: song.slug.clone(),
        title: song.title.clone(),
        artist: song.artist.clone(),
        original_key: song.original_key.clone(),
        lyrics,
        lyrics_chords: song.lyrics_chords.clone(),
        chord_progression: song.chord_progression.clone(),
    })
}

/// Apply a partial update and return the stored result. The slug is never
/// touched here.
pub fn update_song(conn: &Connection, id: i64, changes: SongUpdate) -> Result<Song> {
    let mut song = fetch_song(conn, id)?.ok_or_else(|| anyhow!("Song not found"))?;
    changes.apply_to(&mut song);

    let updated = conn
        .execute(
            "UPDATE songs
             SET title = ?1, artist = ?2, original_key = ?3, lyrics = ?4,
                 lyrics_chords = ?5, chord_progression = ?6, updated_at = datetime('now')
             WHERE id = ?7",
            params![
                song.title,
                song.artist,
                song.original_key,
                song.lyrics,
                song.lyrics_chords,
                song.chord_progression,
                id,
            ],
        )
        .context("failed to update song")?;

    if updated == 0 {
        Err(anyhow!("Song not found"))
    } else {
        Ok(song)
    }
}

/// Permanently delete a song.
pub fn delete_song(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM songs WHERE id = ?1", params![id])
        .context("failed to delete song")?;

    if deleted == 0 {
        Err(anyhow!("Song not found"))
    } else {
        Ok(())
    }
}

/// Give every song without a slug a unique one derived from its title.
/// Returns `(title, slug)` for each song that changed.
///
/// Runs sequentially; do not run alongside an import.
pub fn backfill_slugs(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn
        .prepare("SELECT id, title FROM songs WHERE slug IS NULL OR slug = '' ORDER BY id")
        .context("failed to prepare missing slug query")?;
    let pending = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
        .context("failed to iterate songs without slug")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect songs without slug")?;

    debug!(count = pending.len(), "songs without slug");

    let mut assigned = Vec::with_capacity(pending.len());
    for (id, title) in pending {
        let slug = unique_slug(&title, |candidate| {
            Ok(find_song_by_slug(conn, candidate)?.is_some())
        })?;
        conn.execute(
            "UPDATE songs SET slug = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![slug, id],
        )
        .context("failed to assign slug")?;
        info!(%title, %slug, "assigned slug");
        assigned.push((title, slug));
    }

    Ok(assigned)
}

impl SongStore for Connection {
    fn find_song(&self, key: SongKey<'_>) -> Result<Option<Song>> {
        match key {
            SongKey::Title(title) => find_song_by_title(self, title),
            SongKey::Slug(slug) => find_song_by_slug(self, slug),
        }
    }

    fn create_song(&mut self, song: NewSong) -> Result<Song> {
        create_song(self, &song)
    }

    fn update_song(&mut self, id: i64, changes: SongUpdate) -> Result<Song> {
        update_song(self, id, changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn new_song(slug: &str, title: &str, lyrics_chords: &str) -> NewSong {
        NewSong {
            slug: slug.to_string(),
            title: title.to_string(),
            artist: Some("AVIVA Worship".to_string()),
            original_key: "G".to_string(),
            lyrics_chords: lyrics_chords.to_string(),
            chord_progression: None,
        }
    }

    #[test]
    fn create_derives_plain_lyrics() {
        let conn = open_in_memory().unwrap();
        let song =
            create_song(&conn, &new_song("digno", "Digno", "[G]Digno es el [C]Cordero")).unwrap();
        assert_eq!(song.lyrics, "Digno es el Cordero");

        let stored = fetch_song(&conn, song.id).unwrap().unwrap();
        assert_eq!(stored, song);
    }

    #[test]
    fn update_keeps_slug_and_rederives_lyrics() {
        let conn = open_in_memory().unwrap();
        let song = create_song(&conn, &new_song("digno", "Digno", "[G]Digno")).unwrap();

        let updated = update_song(
            &conn,
            song.id,
            SongUpdate {
                original_key: Some("A".to_string()),
                lyrics_chords: Some("[A]Santo, [D]santo".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(updated.slug, "digno");
        assert_eq!(updated.lyrics, "Santo, santo");
        assert_eq!(fetch_song(&conn, song.id).unwrap().unwrap(), updated);
    }

    #[test]
    fn update_and_delete_report_missing_rows() {
        let conn = open_in_memory().unwrap();
        assert!(update_song(&conn, 42, SongUpdate::default()).is_err());
        assert!(delete_song(&conn, 42).is_err());
    }

    #[test]
    fn lookups_by_title_slug_and_search() {
        let conn = open_in_memory().unwrap();
        create_song(&conn, &new_song("nos-amas", "Nos Amas", "")).unwrap();
        create_song(&conn, &new_song("digno", "Digno", "")).unwrap();

        let by_slug = find_song_by_title_or_slug(&conn, "nos-amas").unwrap().unwrap();
        assert_eq!(by_slug.title, "Nos Amas");
        let by_title = find_song_by_title_or_slug(&conn, " Digno ").unwrap().unwrap();
        assert_eq!(by_title.slug, "digno");
        assert!(find_song_by_title_or_slug(&conn, "otra").unwrap().is_none());

        let hits = search_songs(&conn, "amas").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(search_songs(&conn, "aviva").unwrap().len(), 2);

        let titles: Vec<String> = fetch_all_songs(&conn)
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["Digno", "Nos Amas"]);
    }

    #[test]
    fn backfill_assigns_unique_slugs() {
        let conn = open_in_memory().unwrap();
        create_song(&conn, &new_song("digno", "Digno", "")).unwrap();
        conn.execute("INSERT INTO songs (title) VALUES ('Digno')", []).unwrap();
        conn.execute("INSERT INTO songs (slug, title) VALUES ('', 'Él Reina')", []).unwrap();

        let assigned = backfill_slugs(&conn).unwrap();
        assert_eq!(
            assigned,
            vec![
                ("Digno".to_string(), "digno-1".to_string()),
                ("Él Reina".to_string(), "el-reina".to_string()),
            ]
        );
        assert!(backfill_slugs(&conn).unwrap().is_empty());
    }
}
