use std::collections::HashSet;

use serde::Serialize;

use super::{ANY_MARKER, CHORD_MARKER};

/// One piece of an inline-formatted line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum Segment {
    Chord(String),
    Text(String),
}

impl Segment {
    pub fn content(&self) -> &str {
        match self {
            Segment::Chord(chord) => chord,
            Segment::Text(text) => text,
        }
    }

    pub fn is_chord(&self) -> bool {
        matches!(self, Segment::Chord(_))
    }

    /// Back to the wire form: chords in brackets, text verbatim.
    pub fn render(&self) -> String {
        match self {
            Segment::Chord(chord) => format!("[{chord}]"),
            Segment::Text(text) => text.clone(),
        }
    }
}

/// A chord stacked over the word it precedes. Renderers treat each chunk as a
/// unit that is never split across a soft line wrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub chord: Option<String>,
    pub text: String,
}

/// A line prepared for chord-above-syllable rendering with wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrappedLine {
    pub chunks: Vec<Chunk>,
    /// At least one chunk carries a chord, so a chord row is needed.
    pub has_chords: bool,
    /// Chords with no lyric underneath (intros, instrumentals).
    pub is_chord_only: bool,
    /// Blank line kept for vertical spacing.
    pub is_empty_line: bool,
}

/// Split an annotated document into per-line chord and text segments.
///
/// A line without markers becomes a single text segment, which is empty for
/// blank lines.
pub fn format_inline(lyrics: &str) -> Vec<Vec<Segment>> {
    lyrics.split('\n').map(format_line).collect()
}

fn format_line(line: &str) -> Vec<Segment> {
    let mut parts = Vec::new();
    let mut last = 0;

    for caps in CHORD_MARKER.captures_iter(line) {
        let (Some(whole), Some(chord)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            parts.push(Segment::Text(line[last..whole.start()].to_string()));
        }
        parts.push(Segment::Chord(chord.as_str().to_string()));
        last = whole.end();
    }

    if last < line.len() {
        parts.push(Segment::Text(line[last..].to_string()));
    }
    if parts.is_empty() {
        parts.push(Segment::Text(String::new()));
    }
    parts
}

/// Group each chord with the word that follows it for wrap-friendly layout.
pub fn format_for_wrapping(lyrics: &str) -> Vec<WrappedLine> {
    lyrics.split('\n').map(wrap_line).collect()
}

fn wrap_line(line: &str) -> WrappedLine {
    if line.trim().is_empty() {
        return WrappedLine {
            chunks: vec![Chunk {
                chord: None,
                text: line.to_string(),
            }],
            has_chords: false,
            is_chord_only: false,
            is_empty_line: true,
        };
    }

    let mut chunks = Vec::new();
    let mut pending: Option<String> = None;

    for segment in format_line(line) {
        match segment {
            Segment::Chord(chord) => {
                // Two chords in a row: the first one gets an empty slot.
                if let Some(previous) = pending.replace(chord) {
                    chunks.push(Chunk {
                        chord: Some(previous),
                        text: String::new(),
                    });
                }
            }
            Segment::Text(text) => {
                for (i, word) in split_words(&text).into_iter().enumerate() {
                    let chord = if i == 0 { pending.take() } else { None };
                    chunks.push(Chunk {
                        chord,
                        text: word.to_string(),
                    });
                }
            }
        }
    }
    if let Some(chord) = pending {
        chunks.push(Chunk {
            chord: Some(chord),
            text: String::new(),
        });
    }

    let has_chords = chunks.iter().any(|chunk| chunk.chord.is_some());
    let is_chord_only = has_chords && chunks.iter().all(|chunk| chunk.text.trim().is_empty());

    WrappedLine {
        chunks,
        has_chords,
        is_chord_only,
        is_empty_line: false,
    }
}

/// Break text into word-plus-trailing-whitespace pieces. Leading whitespace
/// becomes its own piece.
fn split_words(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_space = false;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            in_space = true;
        } else if in_space {
            pieces.push(&text[start..i]);
            start = i;
            in_space = false;
        }
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// Unique chord symbols in order of first appearance, for a chord legend.
pub fn extract_chords(lyrics: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    CHORD_MARKER
        .captures_iter(lyrics)
        .filter_map(|caps| caps.get(1))
        .map(|chord| chord.as_str())
        .filter(|chord| seen.insert(*chord))
        .map(str::to_string)
        .collect()
}

/// Plain lyrics: every bracketed span removed.
pub fn strip_chord_markers(lyrics: &str) -> String {
    ANY_MARKER.replace_all(lyrics, "").into_owned()
}

/// Render annotated lyrics as a classic chord sheet, each chord on its own
/// row above the syllable it precedes.
///
/// Chords that would collide are pushed right with one space between them.
/// Lines without chords are copied through; chord-only lines produce just the
/// chord row.
pub fn render_chord_sheet(lyrics: &str) -> String {
    format_inline(lyrics)
        .iter()
        .map(|segments| sheet_line(segments))
        .collect::<Vec<_>>()
        .join("\n")
}

fn sheet_line(segments: &[Segment]) -> String {
    if !segments.iter().any(Segment::is_chord) {
        return segments.iter().map(Segment::content).collect();
    }

    let mut chords = String::new();
    let mut chord_width = 0;
    let mut lyric = String::new();
    let mut lyric_width = 0;

    for segment in segments {
        match segment {
            Segment::Chord(chord) => {
                let column = if chord_width == 0 {
                    lyric_width
                } else {
                    lyric_width.max(chord_width + 1)
                };
                chords.push_str(&" ".repeat(column - chord_width));
                chords.push_str(chord);
                chord_width = column + chord.chars().count();
            }
            Segment::Text(text) => {
                lyric.push_str(text);
                lyric_width += text.chars().count();
            }
        }
    }

    if lyric.trim().is_empty() {
        chords
    } else {
        format!("{chords}\n{lyric}")
    }
}
