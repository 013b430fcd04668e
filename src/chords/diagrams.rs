use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Position of one string in a chord shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FretValue", into = "FretValue")]
pub enum Fret {
    /// String is not played.
    Muted,
    /// Fret number; `At(0)` is an open string.
    At(u8),
}

/// TOML/JSON spelling of a fret: a number, or `"x"` for a muted string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum FretValue {
    Number(u8),
    Text(String),
}

impl TryFrom<FretValue> for Fret {
    type Error = String;

    fn try_from(value: FretValue) -> Result<Self, Self::Error> {
        match value {
            FretValue::Number(fret) => Ok(Fret::At(fret)),
            FretValue::Text(text) if text.eq_ignore_ascii_case("x") => Ok(Fret::Muted),
            FretValue::Text(text) => Err(format!(
                "invalid fret {text:?}, expected a number or \"x\""
            )),
        }
    }
}

impl From<Fret> for FretValue {
    fn from(fret: Fret) -> Self {
        match fret {
            Fret::Muted => FretValue::Text("x".to_string()),
            Fret::At(n) => FretValue::Number(n),
        }
    }
}

/// One finger laid across several strings. Strings are numbered 6 (low E)
/// to 1 (high E).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barre {
    pub fret: u8,
    pub from_string: u8,
    pub to_string: u8,
}

/// A six-string guitar chord shape, low E first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordDiagram {
    pub name: String,
    pub frets: [Fret; 6],
    pub fingers: [u8; 6],
    #[serde(default)]
    pub barres: Vec<Barre>,
    #[serde(default = "default_base_fret")]
    pub base_fret: u8,
}

fn default_base_fret() -> u8 {
    1
}

/// Lookup table from chord name (`C`, `F#m`, `Am7`) to diagram.
///
/// Lookups strip whitespace and then match exactly; there is no enharmonic or
/// fuzzy fallback. A miss is the ordinary "no diagram available" case.
#[derive(Debug, Clone, Default)]
pub struct DiagramTable {
    diagrams: HashMap<String, ChordDiagram>,
}

impl DiagramTable {
    /// Table built from the given diagrams, keyed by their names.
    pub fn from_diagrams(diagrams: impl IntoIterator<Item = ChordDiagram>) -> Self {
        let mut table = Self::default();
        table.extend(diagrams);
        table
    }

    /// The built-in open and barre shapes.
    pub fn standard() -> Self {
        Self::from_diagrams(STANDARD.iter().map(Shape::to_diagram))
    }

    /// Add or replace diagrams. Names are keyed the same way lookups are,
    /// so `"C 9"` and `"C9"` land in one slot.
    pub fn extend(&mut self, diagrams: impl IntoIterator<Item = ChordDiagram>) {
        for diagram in diagrams {
            self.diagrams.insert(lookup_key(&diagram.name), diagram);
        }
    }

    pub fn lookup(&self, chord: &str) -> Option<&ChordDiagram> {
        self.diagrams.get(&lookup_key(chord))
    }

    pub fn len(&self) -> usize {
        self.diagrams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagrams.is_empty()
    }
}

fn lookup_key(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Compact form of the built-in table. `-1` marks a muted string; a barre is
/// `(fret, from_string, to_string)`.
struct Shape {
    name: &'static str,
    frets: [i8; 6],
    fingers: [u8; 6],
    barre: Option<(u8, u8, u8)>,
}

impl Shape {
    fn to_diagram(&self) -> ChordDiagram {
        ChordDiagram {
            name: self.name.to_string(),
            frets: self
                .frets
                .map(|fret| if fret < 0 { Fret::Muted } else { Fret::At(fret as u8) }),
            fingers: self.fingers,
            barres: self
                .barre
                .map(|(fret, from_string, to_string)| Barre {
                    fret,
                    from_string,
                    to_string,
                })
                .into_iter()
                .collect(),
            base_fret: 1,
        }
    }
}

const X: i8 = -1;

const fn shape(name: &'static str, frets: [i8; 6], fingers: [u8; 6]) -> Shape {
    Shape {
        name,
        frets,
        fingers,
        barre: None,
    }
}

const fn barre(
    name: &'static str,
    frets: [i8; 6],
    fingers: [u8; 6],
    bar: (u8, u8, u8),
) -> Shape {
    Shape {
        name,
        frets,
        fingers,
        barre: Some(bar),
    }
}

#[rustfmt::skip]
const STANDARD: &[Shape] = &[
    // major
    shape("C", [X, 3, 2, 0, 1, 0], [0, 3, 2, 0, 1, 0]),
    shape("D", [X, X, 0, 2, 3, 2], [0, 0, 0, 1, 3, 2]),
    shape("E", [0, 2, 2, 1, 0, 0], [0, 2, 3, 1, 0, 0]),
    barre("F", [1, 3, 3, 2, 1, 1], [1, 3, 4, 2, 1, 1], (1, 6, 1)),
    shape("G", [3, 2, 0, 0, 0, 3], [2, 1, 0, 0, 0, 3]),
    shape("A", [X, 0, 2, 2, 2, 0], [0, 0, 1, 2, 3, 0]),
    barre("B", [X, 2, 4, 4, 4, 2], [0, 1, 2, 3, 4, 1], (2, 5, 1)),
    // minor
    barre("Cm", [X, 3, 5, 5, 4, 3], [0, 1, 3, 4, 2, 1], (3, 5, 1)),
    shape("Dm", [X, X, 0, 2, 3, 1], [0, 0, 0, 2, 3, 1]),
    shape("Em", [0, 2, 2, 0, 0, 0], [0, 2, 3, 0, 0, 0]),
    barre("Fm", [1, 3, 3, 1, 1, 1], [1, 3, 4, 1, 1, 1], (1, 6, 1)),
    barre("Gm", [3, 5, 5, 3, 3, 3], [1, 3, 4, 1, 1, 1], (3, 6, 1)),
    shape("Am", [X, 0, 2, 2, 1, 0], [0, 0, 2, 3, 1, 0]),
    barre("Bm", [X, 2, 4, 4, 3, 2], [0, 1, 3, 4, 2, 1], (2, 5, 1)),
    // sharp major
    barre("C#", [X, 4, 6, 6, 6, 4], [0, 1, 2, 3, 4, 1], (4, 5, 1)),
    shape("D#", [X, X, 1, 3, 4, 3], [0, 0, 1, 2, 4, 3]),
    barre("F#", [2, 4, 4, 3, 2, 2], [1, 3, 4, 2, 1, 1], (2, 6, 1)),
    barre("G#", [4, 6, 6, 5, 4, 4], [1, 3, 4, 2, 1, 1], (4, 6, 1)),
    barre("A#", [X, 1, 3, 3, 3, 1], [0, 1, 2, 3, 4, 1], (1, 5, 1)),
    // sharp minor
    barre("C#m", [X, 4, 6, 6, 5, 4], [0, 1, 3, 4, 2, 1], (4, 5, 1)),
    shape("D#m", [X, X, 1, 3, 4, 2], [0, 0, 1, 3, 4, 2]),
    barre("F#m", [2, 4, 4, 2, 2, 2], [1, 3, 4, 1, 1, 1], (2, 6, 1)),
    barre("G#m", [4, 6, 6, 4, 4, 4], [1, 3, 4, 1, 1, 1], (4, 6, 1)),
    barre("A#m", [X, 1, 3, 3, 2, 1], [0, 1, 3, 4, 2, 1], (1, 5, 1)),
    // flat major
    barre("Db", [X, 4, 6, 6, 6, 4], [0, 1, 2, 3, 4, 1], (4, 5, 1)),
    shape("Eb", [X, X, 1, 3, 4, 3], [0, 0, 1, 2, 4, 3]),
    barre("Gb", [2, 4, 4, 3, 2, 2], [1, 3, 4, 2, 1, 1], (2, 6, 1)),
    barre("Ab", [4, 6, 6, 5, 4, 4], [1, 3, 4, 2, 1, 1], (4, 6, 1)),
    barre("Bb", [X, 1, 3, 3, 3, 1], [0, 1, 2, 3, 4, 1], (1, 5, 1)),
    // flat minor
    barre("Dbm", [X, 4, 6, 6, 5, 4], [0, 1, 3, 4, 2, 1], (4, 5, 1)),
    shape("Ebm", [X, X, 1, 3, 4, 2], [0, 0, 1, 3, 4, 2]),
    barre("Gbm", [2, 4, 4, 2, 2, 2], [1, 3, 4, 1, 1, 1], (2, 6, 1)),
    barre("Abm", [4, 6, 6, 4, 4, 4], [1, 3, 4, 1, 1, 1], (4, 6, 1)),
    barre("Bbm", [X, 1, 3, 3, 2, 1], [0, 1, 3, 4, 2, 1], (1, 5, 1)),
    // dominant seventh
    shape("C7", [X, 3, 2, 3, 1, 0], [0, 3, 2, 4, 1, 0]),
    shape("D7", [X, X, 0, 2, 1, 2], [0, 0, 0, 2, 1, 3]),
    shape("E7", [0, 2, 0, 1, 0, 0], [0, 2, 0, 1, 0, 0]),
    barre("F7", [1, 3, 1, 2, 1, 1], [1, 3, 1, 2, 1, 1], (1, 6, 1)),
    shape("G7", [3, 2, 0, 0, 0, 1], [3, 2, 0, 0, 0, 1]),
    shape("A7", [X, 0, 2, 0, 2, 0], [0, 0, 2, 0, 3, 0]),
    shape("B7", [X, 2, 1, 2, 0, 2], [0, 2, 1, 3, 0, 4]),
    // sus2
    shape("Csus2", [X, 3, 0, 0, 1, 0], [0, 3, 0, 0, 1, 0]),
    shape("Dsus2", [X, X, 0, 2, 3, 0], [0, 0, 0, 1, 2, 0]),
    shape("Esus2", [0, 2, 4, 4, 0, 0], [0, 1, 3, 4, 0, 0]),
    shape("Gsus2", [3, 0, 0, 0, 3, 3], [1, 0, 0, 0, 3, 4]),
    shape("Asus2", [X, 0, 2, 2, 0, 0], [0, 0, 1, 2, 0, 0]),
    // sus4
    shape("Csus4", [X, 3, 3, 0, 1, 1], [0, 3, 4, 0, 1, 1]),
    shape("Dsus4", [X, X, 0, 2, 3, 3], [0, 0, 0, 1, 2, 3]),
    shape("Esus4", [0, 2, 2, 2, 0, 0], [0, 2, 3, 4, 0, 0]),
    shape("Gsus4", [3, 3, 0, 0, 1, 3], [2, 3, 0, 0, 1, 4]),
    shape("Asus4", [X, 0, 2, 2, 3, 0], [0, 0, 1, 2, 3, 0]),
    // add9
    shape("Cadd9", [X, 3, 2, 0, 3, 0], [0, 2, 1, 0, 3, 0]),
    shape("Dadd9", [X, X, 0, 2, 3, 0], [0, 0, 0, 1, 2, 0]),
    shape("Eadd9", [0, 2, 2, 1, 0, 2], [0, 2, 3, 1, 0, 4]),
    shape("Gadd9", [3, 0, 0, 2, 0, 3], [2, 0, 0, 1, 0, 3]),
    // maj7
    shape("Cmaj7", [X, 3, 2, 0, 0, 0], [0, 3, 2, 0, 0, 0]),
    shape("Dmaj7", [X, X, 0, 2, 2, 2], [0, 0, 0, 1, 2, 3]),
    shape("Emaj7", [0, 2, 1, 1, 0, 0], [0, 3, 1, 2, 0, 0]),
    shape("Fmaj7", [1, X, 2, 2, 1, 0], [1, 0, 3, 4, 2, 0]),
    shape("Gmaj7", [3, 2, 0, 0, 0, 2], [2, 1, 0, 0, 0, 3]),
    shape("Amaj7", [X, 0, 2, 1, 2, 0], [0, 0, 2, 1, 3, 0]),
    barre("Bmaj7", [X, 2, 4, 3, 4, 2], [0, 1, 3, 2, 4, 1], (2, 5, 1)),
    // minor seventh
    barre("Cm7", [X, 3, 5, 3, 4, 3], [0, 1, 3, 1, 2, 1], (3, 5, 1)),
    shape("Dm7", [X, X, 0, 2, 1, 1], [0, 0, 0, 2, 1, 1]),
    shape("Em7", [0, 2, 0, 0, 0, 0], [0, 1, 0, 0, 0, 0]),
    barre("Fm7", [1, 3, 1, 1, 1, 1], [1, 3, 1, 1, 1, 1], (1, 6, 1)),
    barre("Gm7", [3, 5, 3, 3, 3, 3], [1, 3, 1, 1, 1, 1], (3, 6, 1)),
    shape("Am7", [X, 0, 2, 0, 1, 0], [0, 0, 2, 0, 1, 0]),
    barre("Bm7", [X, 2, 4, 2, 3, 2], [0, 1, 3, 1, 2, 1], (2, 5, 1)),
];
