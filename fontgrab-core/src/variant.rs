//! Variant vocabulary mapping
//!
//! Three equivalent vocabularies describe a font variant and must be
//! inter-convertible without loss: CSS (style, weight) pairs, catalog
//! tokens like "700italic", and the weight-400 special cases "regular"
//! and "italic".

use std::collections::HashSet;

/// The nine standard CSS weights queried from the stylesheet endpoint.
pub const STANDARD_WEIGHTS: [u16; 9] = [100, 200, 300, 400, 500, 600, 700, 800, 900];

/// Font style axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Normal,
    Italic,
}

impl Style {
    /// CSS `font-style` value.
    pub fn as_css(&self) -> &'static str {
        match self {
            Style::Normal => "normal",
            Style::Italic => "italic",
        }
    }

    /// Parse a CSS `font-style` value.
    pub fn from_css(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(Style::Normal),
            "italic" => Some(Style::Italic),
            _ => None,
        }
    }
}

/// A single servable variant file observed in a stylesheet response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantFile {
    pub style: Style,
    pub weight: u16,
    pub url: String,
}

impl VariantFile {
    /// Catalog token for this variant.
    pub fn token(&self) -> String {
        token_for(self.style, self.weight)
    }
}

/// Convert a (style, weight) pair to a catalog token.
///
/// Weight 400 maps to "regular"/"italic", never to the literal "400".
pub fn token_for(style: Style, weight: u16) -> String {
    match (style, weight) {
        (Style::Normal, 400) => "regular".to_string(),
        (Style::Italic, 400) => "italic".to_string(),
        (Style::Normal, w) => w.to_string(),
        (Style::Italic, w) => format!("{w}italic"),
    }
}

/// Parse a catalog token back to a (style, weight) pair.
///
/// Inverse of [`token_for`] for every weight it can emit.
pub fn parse_token(token: &str) -> Option<(Style, u16)> {
    match token {
        "regular" => Some((Style::Normal, 400)),
        "italic" => Some((Style::Italic, 400)),
        _ => {
            if let Some(weight) = token.strip_suffix("italic") {
                weight.parse().ok().map(|w| (Style::Italic, w))
            } else {
                token.parse().ok().map(|w| (Style::Normal, w))
            }
        }
    }
}

/// Sort variant tokens by (length, lexical), the order the catalog uses.
pub fn sort_tokens(tokens: &mut [String]) {
    tokens.sort_by(|a, b| (a.len(), a.as_str()).cmp(&(b.len(), b.as_str())));
}

/// Deduplicate variant files by (style, weight), keeping the first URL seen.
pub fn dedup_variant_files(files: Vec<VariantFile>) -> Vec<VariantFile> {
    let mut seen: HashSet<(Style, u16)> = HashSet::new();
    files
        .into_iter()
        .filter(|f| seen.insert((f.style, f.weight)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_400_special_cases() {
        assert_eq!(token_for(Style::Normal, 400), "regular");
        assert_eq!(token_for(Style::Italic, 400), "italic");
        assert_eq!(parse_token("regular"), Some((Style::Normal, 400)));
        assert_eq!(parse_token("italic"), Some((Style::Italic, 400)));
    }

    #[test]
    fn test_round_trip_all_standard_weights() {
        for weight in STANDARD_WEIGHTS {
            for style in [Style::Normal, Style::Italic] {
                let token = token_for(style, weight);
                assert_eq!(
                    parse_token(&token),
                    Some((style, weight)),
                    "round trip failed for {token}"
                );
            }
        }
    }

    #[test]
    fn test_numeric_tokens_never_use_400_literal() {
        assert_eq!(token_for(Style::Normal, 700), "700");
        assert_eq!(token_for(Style::Italic, 700), "700italic");
        assert_ne!(token_for(Style::Normal, 400), "400");
        assert_ne!(token_for(Style::Italic, 400), "400italic");
    }

    #[test]
    fn test_parse_token_rejects_garbage() {
        assert_eq!(parse_token("bold"), None);
        assert_eq!(parse_token(""), None);
        assert_eq!(parse_token("italicc"), None);
    }

    #[test]
    fn test_dedup_first_seen_wins() {
        let files = vec![
            VariantFile {
                style: Style::Normal,
                weight: 400,
                url: "urlA".to_string(),
            },
            VariantFile {
                style: Style::Normal,
                weight: 400,
                url: "urlB".to_string(),
            },
            VariantFile {
                style: Style::Italic,
                weight: 700,
                url: "urlC".to_string(),
            },
        ];

        let resolved = dedup_variant_files(files);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].token(), "regular");
        assert_eq!(resolved[0].url, "urlA");
        assert_eq!(resolved[1].token(), "700italic");
        assert_eq!(resolved[1].url, "urlC");
    }

    #[test]
    fn test_token_sort_order() {
        let mut tokens = vec![
            "regular".to_string(),
            "100".to_string(),
            "700italic".to_string(),
            "700".to_string(),
            "italic".to_string(),
        ];
        sort_tokens(&mut tokens);
        assert_eq!(tokens, vec!["100", "700", "italic", "regular", "700italic"]);
    }
}
