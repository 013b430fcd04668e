use std::fs;
use std::path::Path;

use cancionero::chords::{
    extract_chords, render_chord_sheet, semitones_between, strip_chord_markers, transpose_lyrics,
    Spelling,
};
use cancionero::db::{fetch_all_songs, open_in_memory};
use cancionero::importer::ImportSettings;
use cancionero::{ensure_schema, ImportError, Importer, SongKey, SongStore};

const SONGBOOK: &str = "===
TITULO: Nos Amas
ARTISTA: AVIVA Worship
TONALIDAD: C

Verso 1:
C         G
Nos amas sin medida
Am        F
Nos buscas sin cesar
Coro
F    G
Digno eres
===
TITULO: Sin Letra
(Sin letra disponible)
===
ARTISTA: Nadie
solo texto
===
";

#[test]
fn imports_a_songbook_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("cancionero.txt");
    fs::write(&input, SONGBOOK.replace('\n', "\r\n")).unwrap();

    let mut conn = ensure_schema(&dir.path().join("songs.sqlite")).unwrap();
    let report = Importer::new(&mut conn, ImportSettings::default())
        .import_file(&input)
        .unwrap();

    assert_eq!(report.imported, 1);
    assert_eq!(report.updated, 0);
    assert_eq!(report.skipped, vec!["Sin Letra".to_string()]);
    assert_eq!(report.untitled, 1);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.total, 1);

    let song = conn.find_song(SongKey::Slug("nos-amas")).unwrap().unwrap();
    assert_eq!(song.title, "Nos Amas");
    assert_eq!(song.artist.as_deref(), Some("AVIVA Worship"));
    assert_eq!(song.original_key, "C");
    assert_eq!(
        song.lyrics_chords,
        "Verso 1:\n[C]Nos amas s[G]in medida\n[Am]Nos buscas[F] sin cesar\n\nCoro\n[F]Digno[G] eres"
    );
    assert_eq!(song.lyrics, strip_chord_markers(&song.lyrics_chords));
    assert_eq!(extract_chords(&song.lyrics_chords), vec!["C", "G", "Am", "F"]);
}

#[test]
fn reimport_updates_in_place_and_keeps_the_slug() {
    let mut conn = open_in_memory().unwrap();
    Importer::new(&mut conn, ImportSettings::default()).import_text(SONGBOOK);

    let changed = SONGBOOK
        .replace("ARTISTA: AVIVA Worship", "ARTISTA: Otro")
        .replace("TONALIDAD: C", "TONALIDAD: D");
    let report = Importer::new(&mut conn, ImportSettings::default()).import_text(&changed);
    assert_eq!(report.imported, 0);
    assert_eq!(report.updated, 1);

    let songs = fetch_all_songs(&conn).unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].slug, "nos-amas");
    assert_eq!(songs[0].artist.as_deref(), Some("Otro"));
    assert_eq!(songs[0].original_key, "D");
}

#[test]
fn colliding_titles_get_numbered_slugs() {
    let mut conn = open_in_memory().unwrap();
    let text = "TITULO: Él Reina\nletra uno\n\
                ===\nTITULO: El Reina\nletra dos\n\
                ===\nTITULO: ¡El reina!\nletra tres";
    let report = Importer::new(&mut conn, ImportSettings::default()).import_text(text);
    assert_eq!(report.imported, 3);

    let mut slugs: Vec<String> = fetch_all_songs(&conn)
        .unwrap()
        .into_iter()
        .map(|song| song.slug)
        .collect();
    slugs.sort();
    assert_eq!(slugs, vec!["el-reina", "el-reina-1", "el-reina-2"]);
}

#[test]
fn blank_artist_header_is_stored_as_none() {
    let mut conn = open_in_memory().unwrap();
    Importer::new(&mut conn, ImportSettings::default()).import_text("TITULO: Uno\nARTISTA:\nla la");
    let song = conn.find_song(SongKey::Title("Uno")).unwrap().unwrap();
    assert_eq!(song.artist, None);
    assert_eq!(song.original_key, "C");
}

#[test]
fn unreadable_input_is_an_import_error() {
    let mut conn = open_in_memory().unwrap();
    let result = Importer::new(&mut conn, ImportSettings::default())
        .import_file(Path::new("/definitely/not/a/songbook.txt"));
    assert!(matches!(result, Err(ImportError::Input { .. })));
    assert!(fetch_all_songs(&conn).unwrap().is_empty());
}

#[test]
fn imported_song_transposes_and_renders() {
    let mut conn = open_in_memory().unwrap();
    Importer::new(&mut conn, ImportSettings::default()).import_text(SONGBOOK);
    let song = conn.find_song(SongKey::Title("Nos Amas")).unwrap().unwrap();

    let semitones = semitones_between(&song.original_key, "D");
    assert_eq!(semitones, 2);
    let in_d = transpose_lyrics(&song.lyrics_chords, i32::from(semitones), Spelling::Sharps);
    assert!(in_d.starts_with("Verso 1:\n[D]Nos amas s[A]in medida\n[Bm]Nos buscas[G] sin cesar"));
    assert_eq!(strip_chord_markers(&in_d), song.lyrics);

    let back = transpose_lyrics(&in_d, -2, Spelling::Sharps);
    assert_eq!(back, song.lyrics_chords);

    let sheet = render_chord_sheet("[F]Digno[G] eres");
    assert_eq!(sheet, "F    G\nDigno eres");
}
