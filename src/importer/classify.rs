//! Line classification for the songbook body: is a line a chord line, a
//! section label, or plain text?

use once_cell::sync::Lazy;
use regex::Regex;

/// Decides how the importer treats a body line. The shipped implementation
/// is a heuristic; a stricter parser can be dropped in behind this trait.
pub trait LineClassifier {
    fn is_chord_line(&self, line: &str) -> bool;
    fn is_section_label(&self, line: &str) -> bool;
}

/// Section labels recognized by default, compared upper-cased.
pub const DEFAULT_SECTION_LABELS: &[&str] = &[
    "INTRO",
    "ESTROFA",
    "VERSO",
    "PRE CORO",
    "PRECORO",
    "PRE-CORO",
    "CORO",
    "PUENTE",
    "BRIDGE",
    "OUTRO",
    "FINAL",
    "INSTRUMENTAL",
    "INTERLUDIO",
    "TAG",
    "PASAJE",
    "2DA ESTROFA",
    "ESTROFA FINAL",
    "VERSO 1",
    "VERSO 2",
    "VERSO 3",
    "CORO 1",
    "CORO 2",
];

/// Root, any run of quality tokens, optional slash bass. Applied to cleaned
/// tokens, so digits have already been stripped by the time it runs.
static CHORD_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-G][#b]?(m|maj|min|dim|aug|sus|add|5|6|7|9|11|13)*(/[A-G][#b]?)?$")
        .expect("chord token pattern")
});

/// Token-ratio chord detector plus an upper-cased section label vocabulary.
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    section_labels: Vec<String>,
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self::with_labels(DEFAULT_SECTION_LABELS.iter().copied())
    }
}

impl HeuristicClassifier {
    pub fn with_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            section_labels: labels
                .into_iter()
                .map(|label| label.as_ref().trim().to_uppercase())
                .filter(|label| !label.is_empty())
                .collect(),
        }
    }

    fn matches_label(line: &str, label: &str) -> bool {
        if line == label {
            return true;
        }
        let Some(rest) = line.strip_prefix(label) else {
            return false;
        };
        if rest.starts_with(' ') {
            return true;
        }
        // "CORO(x2)" style parenthetical with no space.
        let rest = rest.trim_start();
        rest.starts_with('(') && rest.ends_with(')')
    }
}

impl LineClassifier for HeuristicClassifier {
    /// A line is a chord line when at least one piece looks like a chord and
    /// chord pieces make up at least half of the whitespace tokens.
    ///
    /// Repeat and ornament marks (`x4`, `(D# D)`, commas, hyphens) and all
    /// digits are removed from each token before matching, and `/` splits a
    /// token into pieces that are counted separately.
    fn is_chord_line(&self, line: &str) -> bool {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return false;
        }

        let mut chords = 0;
        for token in &tokens {
            let cleaned: String = token
                .chars()
                .filter(|c| !matches!(c, '(' | ')' | 'x' | ',' | '-' | '0'..='9'))
                .collect();
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                continue;
            }
            chords += cleaned
                .split(['-', '/'])
                .filter(|piece| !piece.is_empty() && CHORD_TOKEN.is_match(piece))
                .count();
        }

        chords > 0 && chords * 2 >= tokens.len()
    }

    fn is_section_label(&self, line: &str) -> bool {
        let upper = line.trim().to_uppercase();
        self.section_labels
            .iter()
            .any(|label| Self::matches_label(&upper, label))
    }
}
