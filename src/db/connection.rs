use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use rusqlite::Connection;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".cancionero";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "songs.sqlite";

/// Open (creating if needed) the database at `path` and make sure the schema
/// exists. Missing parent directories are created first so a fresh install
/// can point `database.path` anywhere writable. Re-running against an
/// existing file is a no-op thanks to `IF NOT EXISTS`.
pub fn ensure_schema(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Create the tables on an already open connection. Used directly for
/// in-memory databases.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            slug TEXT UNIQUE,
            title TEXT NOT NULL,
            artist TEXT,
            original_key TEXT NOT NULL DEFAULT 'C',
            lyrics TEXT NOT NULL DEFAULT '',
            lyrics_chords TEXT NOT NULL DEFAULT '',
            chord_progression TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )
    .context("failed to create songs table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_songs_title ON songs(title)",
        [],
    )
    .context("failed to create songs title index")?;

    Ok(())
}

/// Fresh in-memory database with the schema applied.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Default database location inside the user's home directory.
pub fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_created_on_disk_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("songs.sqlite");

        let conn = ensure_schema(&path).unwrap();
        conn.execute("INSERT INTO songs (title) VALUES ('Uno')", []).unwrap();
        drop(conn);

        let conn = ensure_schema(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
