//! Root-only chord transposition.

use std::borrow::Cow;

use regex::Captures;

use super::notes::{Note, Spelling};
use super::CHORD_MARKER;

/// Split a chord symbol into its root note and the untouched remainder.
///
/// The root is the leading `[A-G][#b]?`; everything after it, slash bass
/// included, is the suffix.
pub fn split_root(chord: &str) -> Option<(Note, &str)> {
    let mut chars = chord.char_indices();
    let (_, letter) = chars.next()?;
    if !('A'..='G').contains(&letter) {
        return None;
    }
    let root_len = match chars.next() {
        Some((_, '#' | 'b')) => 2,
        _ => 1,
    };
    let note = Note::parse(&chord[..root_len])?;
    Some((note, &chord[root_len..]))
}

/// Shift a chord's root by `semitones`, carrying the suffix through as-is.
///
/// Symbols whose root cannot be read come back unchanged. A zero shift still
/// re-spells the root in the requested `spelling` (`Db` becomes `C#` under
/// sharps).
pub fn transpose_chord(chord: &str, semitones: i32, spelling: Spelling) -> String {
    match split_root(chord) {
        Some((root, suffix)) => format!("{}{}", root.transpose(semitones).name(spelling), suffix),
        None => chord.to_string(),
    }
}

/// Like [`transpose_chord`], but a trailing `/X` bass note is shifted too
/// when `X` is a plain note name.
pub fn transpose_chord_with_bass(chord: &str, semitones: i32, spelling: Spelling) -> String {
    let Some((root, suffix)) = split_root(chord) else {
        return chord.to_string();
    };
    let root = root.transpose(semitones).name(spelling);

    if let Some((quality, bass)) = suffix.rsplit_once('/') {
        if let Some(bass) = Note::parse(bass) {
            return format!(
                "{root}{quality}/{}",
                bass.transpose(semitones).name(spelling)
            );
        }
    }
    format!("{root}{suffix}")
}

/// Transpose every `[Chord]` marker in an annotated lyrics document. Text
/// outside the markers, alignment whitespace included, is copied verbatim.
pub fn transpose_lyrics(lyrics: &str, semitones: i32, spelling: Spelling) -> String {
    let replaced: Cow<'_, str> = CHORD_MARKER.replace_all(lyrics, |caps: &Captures<'_>| {
        format!("[{}]", transpose_chord(&caps[1], semitones, spelling))
    });
    replaced.into_owned()
}

/// Semitones to move from `from_key` up to `to_key`, in `0..12`.
///
/// Downward moves come out as the equivalent upward shift (C to Bb is 10,
/// not -2). If either key is unknown the answer is 0.
pub fn semitones_between(from_key: &str, to_key: &str) -> u8 {
    match (Note::parse(from_key), Note::parse(to_key)) {
        (Some(from), Some(to)) => (to.index() + 12 - from.index()) % 12,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chords::notes::all_keys;

    #[test]
    fn keeps_quality_and_bass_suffix() {
        assert_eq!(transpose_chord("Am7", 2, Spelling::Sharps), "Bm7");
        assert_eq!(transpose_chord("G/B", 2, Spelling::Sharps), "A/B");
        assert_eq!(transpose_chord("Csus4", 1, Spelling::Flats), "Dbsus4");
    }

    #[test]
    fn unknown_roots_pass_through() {
        assert_eq!(transpose_chord("N.C.", 3, Spelling::Sharps), "N.C.");
        assert_eq!(transpose_chord("", 3, Spelling::Sharps), "");
        assert_eq!(transpose_chord("x4", 3, Spelling::Sharps), "x4");
    }

    #[test]
    fn negative_and_large_shifts_wrap() {
        assert_eq!(transpose_chord("C", -1, Spelling::Sharps), "B");
        assert_eq!(transpose_chord("C", -14, Spelling::Flats), "Bb");
        assert_eq!(transpose_chord("E", 26, Spelling::Sharps), "F#");
    }

    #[test]
    fn zero_shift_only_respells() {
        assert_eq!(transpose_chord("Db", 0, Spelling::Sharps), "C#");
        assert_eq!(transpose_chord("Db", 0, Spelling::Flats), "Db");
        assert_eq!(transpose_chord("E#m", 0, Spelling::Sharps), "Fm");
        for key in all_keys() {
            let respelled = transpose_chord(key, 0, Spelling::Flats);
            assert_eq!(Note::parse(key), Note::parse(&respelled));
        }
    }

    #[test]
    fn shifting_back_restores_the_pitch_class() {
        for key in all_keys() {
            for shift in -15..=15 {
                let there = transpose_chord(key, shift, Spelling::Flats);
                let back = transpose_chord(&there, -shift, Spelling::Sharps);
                assert_eq!(back, key, "{key} by {shift}");
            }
        }
    }

    #[test]
    fn extreme_shifts_do_not_overflow() {
        // i32::MAX is 7 mod 12, i32::MIN is 4 mod 12.
        assert_eq!(transpose_chord("B", i32::MAX, Spelling::Sharps), "F#");
        assert_eq!(transpose_chord("C", i32::MIN, Spelling::Sharps), "E");
        assert_eq!(transpose_chord_with_bass("G/B", i32::MAX, Spelling::Flats), "D/Gb");
        assert_eq!(transpose_lyrics("[C]la [Am]le", i32::MIN, Spelling::Sharps), "[E]la [C#m]le");
        assert_eq!(transpose_lyrics("[C]la", i32::MAX, Spelling::Flats), "[G]la");
    }

    #[test]
    fn bass_variant_moves_the_slash_note() {
        assert_eq!(transpose_chord_with_bass("C/E", 2, Spelling::Sharps), "D/F#");
        assert_eq!(transpose_chord_with_bass("Am7/G", -2, Spelling::Flats), "Gm7/F");
        assert_eq!(transpose_chord_with_bass("D/x", 2, Spelling::Sharps), "E/x");
        assert_eq!(transpose_chord_with_bass("Dm", 2, Spelling::Sharps), "Em");
    }

    #[test]
    fn c_to_d_moves_markers_and_nothing_else() {
        let doc = "Verso 1:\n[C]Nos amas [G]sin medida\nC G fuera de corchetes\n  [Am7]  ";
        let moved = transpose_lyrics(doc, semitones_between("C", "D") as i32, Spelling::Sharps);
        assert_eq!(
            moved,
            "Verso 1:\n[D]Nos amas [A]sin medida\nC G fuera de corchetes\n  [Bm7]  "
        );
    }

    #[test]
    fn brackets_without_a_root_are_left_alone() {
        let doc = "[x2] [(coro)] [C]la";
        assert_eq!(transpose_lyrics(doc, 5, Spelling::Sharps), "[x2] [(coro)] [F]la");
    }

    #[test]
    fn semitones_are_always_upward() {
        for key in all_keys() {
            assert_eq!(semitones_between(key, key), 0);
            for other in all_keys() {
                assert!(semitones_between(key, other) < 12);
            }
        }
        assert_eq!(semitones_between("C", "Bb"), 10);
        assert_eq!(semitones_between("G", "C"), 5);
        assert_eq!(semitones_between("Db", "C#"), 0);
        assert_eq!(semitones_between("C", "Z"), 0);
    }
}
