use std::fmt;

/// Sharp spellings in chromatic order, starting at C.
const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
/// Flat spellings in chromatic order, starting at C.
const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Which accidental to use when a pitch class has two common spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Spelling {
    #[default]
    Sharps,
    Flats,
}

impl Spelling {
    /// Sharps unless `use_flats` is set. Mirrors the on/off toggle the
    /// renderer exposes.
    pub fn from_flag(use_flats: bool) -> Self {
        if use_flats {
            Spelling::Flats
        } else {
            Spelling::Sharps
        }
    }

    fn names(self) -> &'static [&'static str; 12] {
        match self {
            Spelling::Sharps => &SHARP_NAMES,
            Spelling::Flats => &FLAT_NAMES,
        }
    }
}

/// One of the twelve pitch classes. The wrapped index is always in `0..12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Note(u8);

impl Note {
    /// Parse a note spelling such as `C`, `F#`, `Bb` or the theoretical `E#`.
    ///
    /// Returns `None` for anything that is not a single letter `A`–`G`
    /// optionally followed by one `#` or `b`.
    pub fn parse(name: &str) -> Option<Self> {
        let index = match name {
            "C" | "B#" => 0,
            "C#" | "Db" => 1,
            "D" => 2,
            "D#" | "Eb" => 3,
            "E" | "Fb" => 4,
            "F" | "E#" => 5,
            "F#" | "Gb" => 6,
            "G" => 7,
            "G#" | "Ab" => 8,
            "A" => 9,
            "A#" | "Bb" => 10,
            "B" | "Cb" => 11,
            _ => return None,
        };
        Some(Note(index))
    }

    /// Build a note from any integer, wrapping into the chromatic octave.
    pub fn from_index(index: i32) -> Self {
        Note(index.rem_euclid(12) as u8)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Display spelling for this pitch class.
    pub fn name(self, spelling: Spelling) -> &'static str {
        spelling.names()[self.0 as usize]
    }

    /// Shift by `semitones`, which may be any `i32`. The shift is reduced
    /// to `0..12` first so the addition cannot overflow.
    pub fn transpose(self, semitones: i32) -> Self {
        Note::from_index(i32::from(self.0) + semitones.rem_euclid(12))
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name(Spelling::Sharps))
    }
}

/// Chromatic index for a note spelling, if it is one.
pub fn note_index(name: &str) -> Option<u8> {
    Note::parse(name).map(Note::index)
}

/// The twelve keys offered by key pickers: sharp spellings from C upwards.
pub fn all_keys() -> [&'static str; 12] {
    SHARP_NAMES
}

/// Move `delta` steps around the key picker. A key that does not parse is
/// treated as C so the controls always land somewhere sensible.
pub fn step_key(current: &str, delta: i32) -> &'static str {
    let start = Note::parse(current.trim()).unwrap_or(Note(0));
    start.transpose(delta).name(Spelling::Sharps)
}
