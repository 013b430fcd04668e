//! Binary entry point: load configuration, bring up logging and the SQLite
//! store, then run one subcommand against it.
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rusqlite::Connection;
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cancionero::chords::{
    all_keys, extract_chords, format_for_wrapping, format_inline, note_index, render_chord_sheet,
    semitones_between, strip_chord_markers, transpose_lyrics, ChordDiagram, Fret, Segment, Spelling,
};
use cancionero::db::{backfill_slugs, delete_song, fetch_all_songs, search_songs};
use cancionero::{ensure_schema, find_song_by_title_or_slug, Config, Importer, Song};

/// Cancionero - import, transpose and print chord songbooks
#[derive(Parser, Debug)]
#[command(name = "cancionero", version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of ./cancionero.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database path, overriding config and environment
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a cancionero text dump
    Import { file: PathBuf },

    /// List stored songs
    List {
        /// Only songs whose title or artist contains this text
        #[arg(long, short)]
        query: Option<String>,
    },

    /// Print a song, optionally in another key
    Show {
        /// Slug or exact title
        song: String,
        /// Target key, e.g. D or Bb
        #[arg(long, short)]
        key: Option<String>,
        /// Spell accidentals with flats
        #[arg(long)]
        flats: bool,
        #[arg(long, value_enum, default_value_t = Layout::Inline)]
        layout: Layout,
        /// Print plain lyrics only
        #[arg(long)]
        no_chords: bool,
    },

    /// List the distinct chords of a song with their shapes
    Chords {
        song: String,
        #[arg(long, short)]
        key: Option<String>,
        #[arg(long)]
        flats: bool,
    },

    /// Show the guitar diagram for a chord
    Diagram { chord: String },

    /// Print the twelve keys
    Keys,

    /// Assign slugs to songs that have none
    BackfillSlugs,

    /// Delete a song
    Remove { song: String },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Layout {
    /// Annotated text with `[Chord]` markers
    Inline,
    /// Chord row above each lyric row
    Sheet,
    /// Chords stacked over the word they start on
    Wrapped,
    /// Segments as JSON
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(db) = cli.db.clone() {
        config.database_path = db;
    }
    init_tracing(&config.log_level);
    debug!(
        files = ?config.sources.files,
        env = ?config.sources.env_overrides,
        "configuration loaded"
    );

    run(cli.command, &config)
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Keys => println!("{}", all_keys().join(" ")),
        Command::Diagram { chord } => {
            let table = config.diagram_table();
            match table.lookup(&chord) {
                Some(diagram) => print_diagram(diagram),
                None => println!("No diagram available for {}", chord.trim()),
            }
        }
        Command::Import { file } => {
            let mut conn = open_store(config)?;
            let report = Importer::new(&mut conn, config.import.clone()).import_file(&file)?;
            println!("{report}");
            if !report.skipped.is_empty() {
                println!("\nWithout lyrics:");
                for title in &report.skipped {
                    println!("  {title}");
                }
            }
            for failure in &report.failures {
                eprintln!("failed: {}: {}", failure.title, failure.error);
            }
        }
        Command::List { query } => {
            let conn = open_store(config)?;
            let songs = match query {
                Some(query) => search_songs(&conn, &query)?,
                None => fetch_all_songs(&conn)?,
            };
            for song in &songs {
                println!("{:<32} {:<4} {}", song.slug, song.original_key, song.display_title());
            }
        }
        Command::Show {
            song,
            key,
            flats,
            layout,
            no_chords,
        } => {
            let conn = open_store(config)?;
            let song = load_song(&conn, &song)?;
            let (text, key) = transposed(&song, key.as_deref(), flats)?;
            if no_chords {
                println!("{}", strip_chord_markers(&text));
                return Ok(());
            }
            match layout {
                Layout::Json => {
                    let document = json!({
                        "slug": song.slug,
                        "title": song.title,
                        "artist": song.artist,
                        "original_key": song.original_key,
                        "key": key,
                        "lines": format_inline(&text),
                    });
                    println!("{}", serde_json::to_string_pretty(&document)?);
                }
                Layout::Inline => {
                    print_header(&song, &key);
                    for line in format_inline(&text) {
                        let rendered: String = line.iter().map(Segment::render).collect();
                        println!("{rendered}");
                    }
                }
                Layout::Sheet => {
                    print_header(&song, &key);
                    println!("{}", render_chord_sheet(&text));
                }
                Layout::Wrapped => {
                    print_header(&song, &key);
                    print_wrapped(&text);
                }
            }
        }
        Command::Chords { song, key, flats } => {
            let conn = open_store(config)?;
            let song = load_song(&conn, &song)?;
            let (text, _) = transposed(&song, key.as_deref(), flats)?;
            let table = config.diagram_table();
            for chord in extract_chords(&text) {
                match table.lookup(&chord) {
                    Some(diagram) => println!("{chord:<8} {}", fret_string(diagram)),
                    None => println!("{chord:<8} -"),
                }
            }
        }
        Command::BackfillSlugs => {
            let conn = open_store(config)?;
            let assigned = backfill_slugs(&conn)?;
            for (title, slug) in &assigned {
                println!("{title} -> {slug}");
            }
            println!("Assigned {} slug(s)", assigned.len());
        }
        Command::Remove { song } => {
            let conn = open_store(config)?;
            let song = load_song(&conn, &song)?;
            delete_song(&conn, song.id)?;
            println!("Removed {}", song.display_title());
        }
    }

    Ok(())
}

fn open_store(config: &Config) -> Result<Connection> {
    info!(path = %config.database_path.display(), "opening database");
    ensure_schema(&config.database_path)
}

fn load_song(conn: &Connection, key: &str) -> Result<Song> {
    find_song_by_title_or_slug(conn, key)?
        .ok_or_else(|| anyhow!("Song not found: {}", key.trim()))
}

/// The song text moved to `target`, and the key it ends up in. Without a
/// target or `--flats` the stored text is returned untouched.
fn transposed(song: &Song, target: Option<&str>, flats: bool) -> Result<(String, String)> {
    let spelling = Spelling::from_flag(flats);
    let key = match target {
        Some(key) => key.trim(),
        None if flats => song.original_key.as_str(),
        None => return Ok((song.lyrics_chords.clone(), song.original_key.clone())),
    };
    if note_index(key).is_none() {
        bail!("Unknown key: {key}");
    }

    let semitones = semitones_between(&song.original_key, key);
    debug!(from = %song.original_key, to = %key, semitones, "transposing");
    let text = transpose_lyrics(&song.lyrics_chords, i32::from(semitones), spelling);
    Ok((text, key.to_string()))
}

fn print_header(song: &Song, key: &str) {
    println!("{}", song.display_title());
    println!("Key: {key}\n");
}

fn print_wrapped(text: &str) {
    for line in format_for_wrapping(text) {
        if line.is_empty_line {
            println!();
            continue;
        }

        let mut chords = String::new();
        let mut words = String::new();
        for chunk in &line.chunks {
            let chord = chunk.chord.as_deref().unwrap_or("");
            let chord_width = if chord.is_empty() { 0 } else { chord.chars().count() + 1 };
            let width = chunk.text.chars().count().max(chord_width);
            chords.push_str(&format!("{chord:<width$}"));
            words.push_str(&format!("{:<width$}", chunk.text));
        }

        if line.has_chords {
            println!("{}", chords.trim_end());
        }
        if !line.is_chord_only {
            println!("{}", words.trim_end());
        }
    }
}

/// `x32010` style shape, with two-digit frets in parentheses.
fn fret_string(diagram: &ChordDiagram) -> String {
    diagram
        .frets
        .iter()
        .map(|fret| match fret {
            Fret::Muted => "x".to_string(),
            Fret::At(n) if *n > 9 => format!("({n})"),
            Fret::At(n) => n.to_string(),
        })
        .collect()
}

fn print_diagram(diagram: &ChordDiagram) {
    println!("{}", diagram.name);
    println!("  frets:   {}", fret_string(diagram));
    let fingers: Vec<String> = diagram.fingers.iter().map(u8::to_string).collect();
    println!("  fingers: {}", fingers.join(""));
    if diagram.base_fret > 1 {
        println!("  base fret: {}", diagram.base_fret);
    }
    for barre in &diagram.barres {
        println!(
            "  barre: fret {} strings {}-{}",
            barre.fret, barre.from_string, barre.to_string
        );
    }
}

#[cfg(test)]
mod tests {
    use cancionero::config::ConfigSources;
    use cancionero::importer::ImportSettings;

    use super::*;

    fn song(key: &str, lyrics_chords: &str) -> Song {
        Song {
            id: 1,
            slug: "uno".to_string(),
            title: "Uno".to_string(),
            artist: None,
            original_key: key.to_string(),
            lyrics: strip_chord_markers(lyrics_chords),
            lyrics_chords: lyrics_chords.to_string(),
            chord_progression: None,
        }
    }

    fn config_at(database_path: PathBuf) -> Config {
        Config {
            database_path,
            log_level: "info".to_string(),
            import: ImportSettings::default(),
            diagrams: Vec::new(),
            sources: ConfigSources::default(),
        }
    }

    #[test]
    fn keys_and_diagram_never_open_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("songs.sqlite");
        let config = config_at(path.clone());

        run(Command::Keys, &config).unwrap();
        run(Command::Diagram { chord: "Am".to_string() }, &config).unwrap();
        run(Command::Diagram { chord: "H7".to_string() }, &config).unwrap();
        assert!(!path.exists());

        run(Command::List { query: None }, &config).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn cli_parses_show_with_layout() {
        let cli = Cli::try_parse_from([
            "cancionero",
            "show",
            "nos-amas",
            "--key",
            "D",
            "--layout",
            "sheet",
            "--db",
            "/tmp/x.sqlite",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.sqlite")));
        match cli.command {
            Command::Show { song, key, layout, .. } => {
                assert_eq!(song, "nos-amas");
                assert_eq!(key.as_deref(), Some("D"));
                assert_eq!(layout, Layout::Sheet);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn transposed_moves_to_target_key() {
        let (text, key) = transposed(&song("C", "[C]Hola [G]mundo"), Some("D"), false).unwrap();
        assert_eq!(text, "[D]Hola [A]mundo");
        assert_eq!(key, "D");

        let (text, key) = transposed(&song("C", "[A#]x"), None, false).unwrap();
        assert_eq!((text.as_str(), key.as_str()), ("[A#]x", "C"));

        let (text, _) = transposed(&song("C", "[A#]x"), None, true).unwrap();
        assert_eq!(text, "[Bb]x");

        assert!(transposed(&song("C", ""), Some("H"), false).is_err());
    }

    #[test]
    fn fret_string_marks_muted_and_high_frets() {
        let diagram = ChordDiagram {
            name: "Test".to_string(),
            frets: [Fret::Muted, Fret::At(3), Fret::At(2), Fret::At(0), Fret::At(10), Fret::At(0)],
            fingers: [0; 6],
            barres: Vec::new(),
            base_fret: 1,
        };
        assert_eq!(fret_string(&diagram), "x320(10)0");
    }
}
