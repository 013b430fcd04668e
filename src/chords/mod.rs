//! Chord and lyrics text processing: note spellings, transposition,
//! formatting of `[Chord]`-annotated lyrics and guitar diagram lookup.
//!
//! Everything here is a pure string transform. Malformed chord text is passed
//! through rather than rejected because the source material is hand-typed.

use once_cell::sync::Lazy;
use regex::Regex;

pub mod diagrams;
pub mod format;
pub mod notes;
pub mod transpose;

pub use diagrams::{Barre, ChordDiagram, DiagramTable, Fret};
pub use format::{
    extract_chords, format_for_wrapping, format_inline, render_chord_sheet, strip_chord_markers,
    Chunk, Segment, WrappedLine,
};
pub use notes::{all_keys, note_index, step_key, Note, Spelling};
pub use transpose::{
    semitones_between, transpose_chord, transpose_chord_with_bass, transpose_lyrics,
};

/// An inline chord marker: `[` root, optional accidental, any non-bracket
/// suffix, `]`. Group 1 is the chord symbol.
pub(crate) static CHORD_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([A-G][#b]?[^\[\]]*)\]").expect("chord marker pattern"));

/// Any bracketed span, chord or not. Used when deriving plain lyrics.
pub(crate) static ANY_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("marker pattern"));
