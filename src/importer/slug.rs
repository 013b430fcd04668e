use anyhow::Result;
use unicode_normalization::UnicodeNormalization;

/// Used when a title has no characters that survive slugging.
const FALLBACK_SLUG: &str = "cancion";

/// URL-safe slug for a song title: `"Así Es Tu Amor"` becomes
/// `"asi-es-tu-amor"`.
pub fn slugify(title: &str) -> String {
    let folded: String = title
        .to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .map(|c| if c == 'ñ' { 'n' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();

    let mut slug = String::with_capacity(folded.len());
    for c in folded.trim().chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// Slug for `title` that `taken` reports as free, trying `base`, `base-1`,
/// `base-2`, … in order.
///
/// The probe and the later insert are separate steps, so callers must not
/// run this concurrently against the same store.
pub fn unique_slug<F>(title: &str, mut taken: F) -> Result<String>
where
    F: FnMut(&str) -> Result<bool>,
{
    let base = slugify(title);
    let mut slug = base.clone();
    let mut counter = 1;

    while taken(&slug)? {
        slug = format!("{base}-{counter}");
        counter += 1;
    }
    Ok(slug)
}
