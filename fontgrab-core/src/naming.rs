//! Slug/name normalization and category inference
//!
//! The google/fonts repository files families under lowercase directory
//! slugs ("opensans"), while every other surface uses display names
//! ("Open Sans"). The general transform handles most families; a static
//! exception table covers names that do not decompose cleanly. These are
//! the fallbacks used whenever external metadata is unavailable, so they
//! must stay pure and deterministic.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Known irregular family names that the general transform gets wrong.
static NAME_EXCEPTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("opensans", "Open Sans"),
        ("sourcecodepro", "Source Code Pro"),
        ("sourcesanspro", "Source Sans Pro"),
        ("sourceserifpro", "Source Serif Pro"),
        ("robotocondensed", "Roboto Condensed"),
        ("robotoslab", "Roboto Slab"),
        ("playfairdisplay", "Playfair Display"),
        ("crimsontext", "Crimson Text"),
        ("faunaone", "Fauna One"),
        ("jetbrainsmono", "JetBrains Mono"),
        ("dmsans", "DM Sans"),
        ("dmseriftext", "DM Serif Text"),
        ("worksans", "Work Sans"),
        ("notosans", "Noto Sans"),
        ("notoserif", "Noto Serif"),
        ("firasans", "Fira Sans"),
        ("firamono", "Fira Mono"),
    ])
});

static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid regex"));
static DIGIT_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9])([a-z])").expect("valid regex"));

/// Convert a directory slug to a display family name.
///
/// Checks the exception table first (case-folded), then inserts word
/// boundaries between a lowercase letter and an uppercase letter and
/// between a digit and a lowercase letter, and capitalizes each word.
pub fn slug_to_name(slug: &str) -> String {
    let folded = slug.to_ascii_lowercase();
    if let Some(name) = NAME_EXCEPTIONS.get(folded.as_str()) {
        return (*name).to_string();
    }

    let spaced = CAMEL_BOUNDARY.replace_all(slug, "$1 $2");
    let spaced = DIGIT_BOUNDARY.replace_all(&spaced, "$1 $2");

    spaced
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Convert a display name to a lookup slug.
///
/// Lossy and many-to-one by design: strips everything but case-folded
/// ASCII letters and digits. Used only for lookups, never for redisplay.
pub fn name_to_slug(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

const MONO_INDICATORS: [&str; 6] = ["mono", "code", "inconsolata", "courier", "source code", "jetbrains"];
const SERIF_INDICATORS: [&str; 7] = [
    "serif",
    "times",
    "georgia",
    "crimson",
    "merriweather",
    "playfair",
    "lora",
];
const DISPLAY_INDICATORS: [&str; 5] = ["display", "impact", "lobster", "dancing", "pacifico"];

/// Guess a font category from its slug when explicit metadata is unavailable.
///
/// Priority order matters: monospace indicators are checked before serif
/// ones, so a slug containing both resolves to "monospace".
pub fn infer_category(slug: &str) -> &'static str {
    let folded = slug.to_ascii_lowercase();

    if MONO_INDICATORS.iter().any(|m| folded.contains(m)) {
        "monospace"
    } else if SERIF_INDICATORS.iter().any(|s| folded.contains(s)) {
        "serif"
    } else if DISPLAY_INDICATORS.iter().any(|d| folded.contains(d)) {
        "display"
    } else {
        "sans-serif"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exception_table_hits() {
        assert_eq!(slug_to_name("opensans"), "Open Sans");
        assert_eq!(slug_to_name("jetbrainsmono"), "JetBrains Mono");
        assert_eq!(slug_to_name("dmsans"), "DM Sans");
    }

    #[test]
    fn test_exception_table_ignores_casing() {
        assert_eq!(slug_to_name("OpenSans"), "Open Sans");
        assert_eq!(slug_to_name("OPENSANS"), "Open Sans");
        assert_eq!(slug_to_name("JetBrainsMono"), "JetBrains Mono");
    }

    #[test]
    fn test_general_transform() {
        assert_eq!(slug_to_name("roboto"), "Roboto");
        assert_eq!(slug_to_name("abeezee"), "Abeezee");
        // Digit-to-lowercase boundary
        assert_eq!(slug_to_name("42dot"), "42 Dot");
    }

    #[test]
    fn test_name_to_slug_is_lossy() {
        assert_eq!(name_to_slug("Open Sans"), "opensans");
        assert_eq!(name_to_slug("Source Code Pro"), "sourcecodepro");
        assert_eq!(name_to_slug("M PLUS 1p"), "mplus1p");
        // Round trip is not expected to restore the original slug exactly,
        // but must be stable for lookups.
        assert_eq!(name_to_slug(&slug_to_name("opensans")), "opensans");
    }

    #[test]
    fn test_category_inference() {
        assert_eq!(infer_category("jetbrainsmono"), "monospace");
        assert_eq!(infer_category("crimsontext"), "serif");
        assert_eq!(infer_category("lobstertwo"), "display");
        assert_eq!(infer_category("roboto"), "sans-serif");
    }

    #[test]
    fn test_category_priority_mono_beats_serif() {
        // A slug containing both indicators must resolve to monospace.
        assert_eq!(infer_category("serifmono"), "monospace");
        assert_eq!(infer_category("crimsoncode"), "monospace");
    }
}
