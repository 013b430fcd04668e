//! Turning the raw cancionero dump into song records with inline chords.

use serde::Deserialize;

use super::classify::{LineClassifier, DEFAULT_SECTION_LABELS};
use super::merge::merge_chord_line;

const BLOCK_DELIMITER: &str = "===";
const TITLE_PREFIX: &str = "TITULO:";
const ARTIST_PREFIX: &str = "ARTISTA:";
const KEY_PREFIX: &str = "TONALIDAD:";

/// Defaults applied while parsing a songbook. Loaded from the `[import]`
/// section of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Artist used when a block has no `ARTISTA:` line.
    pub default_artist: String,
    /// Key used when a block has no `TONALIDAD:` line.
    pub default_key: String,
    /// Blocks whose body contains this text are skipped.
    pub no_lyrics_marker: String,
    /// Section label vocabulary for the body classifier.
    pub section_labels: Vec<String>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            default_artist: "AVIVA Worship".to_string(),
            default_key: "C".to_string(),
            no_lyrics_marker: "(Sin letra disponible".to_string(),
            section_labels: DEFAULT_SECTION_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// One song as read from the dump, body still in chord-over-lyric layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSong {
    pub title: String,
    pub artist: Option<String>,
    pub original_key: String,
    pub content: String,
}

/// What a single `===` block turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Song(ParsedSong),
    /// The block is marked as having no lyrics in the source.
    NoLyrics { title: String },
    /// No `TITULO:` line was found.
    Untitled,
}

/// All blocks of a dump, sorted by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Songbook {
    pub songs: Vec<ParsedSong>,
    /// Titles of blocks skipped for having no lyrics.
    pub no_lyrics: Vec<String>,
    pub untitled: usize,
}

/// Split a dump on `===` and parse every non-blank block.
pub fn parse_songbook(text: &str, settings: &ImportSettings) -> Songbook {
    let text = text.replace("\r\n", "\n");
    let mut book = Songbook::default();

    for block in text.split(BLOCK_DELIMITER).filter(|b| !b.trim().is_empty()) {
        match parse_block(block, settings) {
            Block::Song(song) => book.songs.push(song),
            Block::NoLyrics { title } => book.no_lyrics.push(title),
            Block::Untitled => book.untitled += 1,
        }
    }
    book
}

/// Read the metadata header of one block and cut out its body.
///
/// Header lines may come in any order. The body starts after the last header
/// line; the scan stops at the first non-header line once a title is known.
pub fn parse_block(block: &str, settings: &ImportSettings) -> Block {
    let lines: Vec<&str> = block.trim().split('\n').collect();

    let mut title = String::new();
    let mut artist = Some(settings.default_artist.clone());
    let mut original_key = settings.default_key.clone();
    let mut content_start = 0;

    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if let Some(value) = line.strip_prefix(TITLE_PREFIX) {
            title = value.trim().to_string();
            content_start = i + 1;
        } else if let Some(value) = line.strip_prefix(ARTIST_PREFIX) {
            let value = value.trim();
            artist = (!value.is_empty()).then(|| value.to_string());
            content_start = i + 1;
        } else if let Some(value) = line.strip_prefix(KEY_PREFIX) {
            original_key = value.trim().to_string();
            content_start = i + 1;
        } else if !title.is_empty() {
            break;
        }
    }

    if title.is_empty() {
        return Block::Untitled;
    }

    let content = lines[content_start..].join("\n").trim().to_string();
    if !settings.no_lyrics_marker.is_empty() && content.contains(&settings.no_lyrics_marker) {
        return Block::NoLyrics { title };
    }

    Block::Song(ParsedSong {
        title,
        artist,
        original_key,
        content,
    })
}

/// Convert a chord-over-lyric body into annotated `[Chord]` lyrics.
///
/// Section labels get a blank line before them. A chord line directly above
/// a lyric line is merged into it by column; a chord line followed by another
/// chord line, a label or a blank line (an intro or instrumental run) is kept
/// as written.
pub fn parse_content<C>(content: &str, classifier: &C) -> String
where
    C: LineClassifier + ?Sized,
{
    let lines: Vec<&str> = content.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if classifier.is_section_label(line) {
            out.push(String::new());
            out.push(line.trim().to_string());
            i += 1;
            continue;
        }

        if classifier.is_chord_line(line) {
            if let Some(next) = lines.get(i + 1) {
                let standalone = next.trim().is_empty()
                    || classifier.is_chord_line(next)
                    || classifier.is_section_label(next);
                if standalone {
                    out.push(line.to_string());
                    i += 1;
                } else {
                    out.push(merge_chord_line(line, next));
                    i += 2;
                }
                continue;
            }
        }

        out.push(line.to_string());
        i += 1;
    }

    out.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::classify::HeuristicClassifier;

    const NOS_AMAS: &str = "TITULO: Nos Amas\nARTISTA: AVIVA Worship\nTONALIDAD: C\n\n\
                            Verso 1:\n\
                            C         G\n\
                            Nos amas sin medida\n\
                            Am        F\n\
                            Nos buscas sin cesar";

    #[test]
    fn header_fields_are_read_in_any_order() {
        let block = "TONALIDAD: G\nTITULO: Digno\nARTISTA: Otro\nletra";
        let Block::Song(song) = parse_block(block, &ImportSettings::default()) else {
            panic!("expected a song");
        };
        assert_eq!(song.title, "Digno");
        assert_eq!(song.artist.as_deref(), Some("Otro"));
        assert_eq!(song.original_key, "G");
        assert_eq!(song.content, "letra");
    }

    #[test]
    fn missing_headers_use_defaults() {
        let settings = ImportSettings::default();
        let Block::Song(song) = parse_block("TITULO: Solo\n\nletra", &settings) else {
            panic!("expected a song");
        };
        assert_eq!(song.artist.as_deref(), Some("AVIVA Worship"));
        assert_eq!(song.original_key, "C");

        let Block::Song(song) = parse_block("TITULO: Anon\nARTISTA:\nletra", &settings) else {
            panic!("expected a song");
        };
        assert_eq!(song.artist, None);
    }

    #[test]
    fn untitled_and_no_lyrics_blocks_are_reported() {
        let settings = ImportSettings::default();
        assert_eq!(parse_block("ARTISTA: X\nletra", &settings), Block::Untitled);
        assert_eq!(
            parse_block("TITULO: Vacia\n(Sin letra disponible en el cancionero)", &settings),
            Block::NoLyrics {
                title: "Vacia".to_string()
            }
        );
    }

    #[test]
    fn songbook_splits_on_delimiters_and_crlf() {
        let text = "===\r\nTITULO: Uno\r\nla\r\n===\r\n\r\n\
                    ===\r\nTITULO: Dos\r\n(Sin letra disponible)\r\n\
                    ===\r\nsin titulo\r\n===";
        let book = parse_songbook(text, &ImportSettings::default());
        assert_eq!(book.songs.len(), 1);
        assert_eq!(book.songs[0].title, "Uno");
        assert_eq!(book.songs[0].content, "la");
        assert_eq!(book.no_lyrics, vec!["Dos".to_string()]);
        assert_eq!(book.untitled, 1);
    }

    #[test]
    fn body_merges_chords_and_keeps_labels() {
        let Block::Song(song) = parse_block(NOS_AMAS, &ImportSettings::default()) else {
            panic!("expected a song");
        };
        let body = parse_content(&song.content, &HeuristicClassifier::default());
        assert_eq!(
            body,
            "Verso 1:\n[C]Nos amas s[G]in medida\n[Am]Nos buscas[F] sin cesar"
        );
    }

    #[test]
    fn labels_get_a_blank_line_before_them() {
        let body = parse_content("linea uno\nCoro\nlinea dos", &HeuristicClassifier::default());
        assert_eq!(body, "linea uno\n\nCoro\nlinea dos");
    }

    #[test]
    fn standalone_chord_lines_are_kept() {
        let classifier = HeuristicClassifier::default();
        let body = parse_content(
            "Intro\nG  D  Em  C\n\nG  D\nCoro\nEm    C\nTu amor",
            &classifier,
        );
        assert_eq!(
            body,
            "Intro\nG  D  Em  C\n\nG  D\n\nCoro\n[Em]Tu amo[C]r"
        );
    }

    #[test]
    fn trailing_chord_line_is_left_as_is() {
        let body = parse_content("letra\nG  C", &HeuristicClassifier::default());
        assert_eq!(body, "letra\nG  C");
    }
}
