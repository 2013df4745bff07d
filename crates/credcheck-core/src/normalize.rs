//! Free-text canonicalisation applied before any field comparison.

/// Honorifics stripped from the front of a name when more text follows.
const HONORIFICS: &[&str] = &["mr", "mr.", "ms", "ms.", "dr", "dr."];

/// Generational suffixes stripped from the end of a name when preceded by
/// more text.
const SUFFIXES: &[&str] = &["jr", "jr.", "sr", "sr.", "ii", "iii"];

/// Canonicalise a free-text field for comparison.
///
/// Lower-cases, collapses whitespace runs to single spaces, trims, then
/// strips one leading honorific and one trailing generational suffix.
/// A lone "dr." survives: stripping only happens when other text remains.
/// Empty input yields an empty string.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut tokens: Vec<&str> = lowered.split_whitespace().collect();

    if tokens.len() > 1 && HONORIFICS.contains(&tokens[0]) {
        tokens.remove(0);
    }
    if tokens.len() > 1 && matches!(tokens.last(), Some(last) if SUFFIXES.contains(last)) {
        tokens.pop();
    }

    tokens.join(" ")
}
