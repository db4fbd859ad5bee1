//! METADATA.pb descriptor parsing
//!
//! The per-family descriptor is a flat `key: "value"` text format. Its
//! full grammar is not otherwise used, so fields are extracted by
//! independent pattern search: a malformed or partially corrupt
//! descriptor still yields partial results instead of failing whole.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::naming;

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"name:\s*"([^"]+)""#).expect("valid regex"));
static CATEGORY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"category:\s*"([^"]+)""#).expect("valid regex"));
static SUBSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"subset:\s*"([^"]+)""#).expect("valid regex"));
static DESIGNER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"designer:\s*"([^"]+)""#).expect("valid regex"));

/// Metadata record for one font family, with every field defaulted
/// independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyMetadata {
    pub name: String,
    pub category: String,
    pub subsets: Vec<String>,
    pub designer: String,
    pub license: String,
}

impl FamilyMetadata {
    /// Parse a descriptor text. Each field falls back on its own when the
    /// pattern is absent: name to the slug, category to "sans-serif",
    /// subsets to ["latin"], designer to empty.
    pub fn parse(text: &str, license: &str, slug: &str) -> Self {
        let name = NAME_RE
            .captures(text)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| slug.to_string());

        let category = CATEGORY_RE
            .captures(text)
            .map(|c| c[1].to_ascii_lowercase().replace('_', "-"))
            .unwrap_or_else(|| "sans-serif".to_string());

        let subsets: Vec<String> = SUBSET_RE
            .captures_iter(text)
            .map(|c| c[1].to_string())
            .collect();
        let subsets = if subsets.is_empty() {
            vec!["latin".to_string()]
        } else {
            subsets
        };

        let designer = DESIGNER_RE
            .captures(text)
            .map(|c| c[1].to_string())
            .unwrap_or_default();

        Self {
            name,
            category,
            subsets,
            designer,
            license: license.to_string(),
        }
    }

    /// Fully defaulted record derived purely from the slug, used when the
    /// descriptor cannot be fetched at all.
    pub fn fallback_for_slug(license: &str, slug: &str) -> Self {
        Self {
            name: naming::slug_to_name(slug),
            category: naming::infer_category(slug).to_string(),
            subsets: vec!["latin".to_string()],
            designer: String::new(),
            license: license.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
name: "Crimson Text"
designer: "Sebastian Kosch"
license: "OFL"
category: "SERIF"
date_added: "2010-08-11"
subsets: "menu"
subset: "latin"
subset: "latin-ext"
fonts {
  name: "Crimson Text"
  style: "normal"
  weight: 400
  filename: "CrimsonText-Regular.ttf"
}
"#;

    #[test]
    fn test_parse_full_descriptor() {
        let meta = FamilyMetadata::parse(SAMPLE, "ofl", "crimsontext");
        assert_eq!(meta.name, "Crimson Text");
        assert_eq!(meta.category, "serif");
        assert_eq!(meta.subsets, vec!["latin", "latin-ext"]);
        assert_eq!(meta.designer, "Sebastian Kosch");
        assert_eq!(meta.license, "ofl");
    }

    #[test]
    fn test_category_underscores_become_dashes() {
        let meta = FamilyMetadata::parse(r#"category: "SANS_SERIF""#, "ofl", "x");
        assert_eq!(meta.category, "sans-serif");
    }

    #[test]
    fn test_partial_corruption_defaults_per_field() {
        // Name line mangled, the rest intact: only the name defaults.
        let text = r#"
nxme: "Broken"
category: "MONOSPACE"
subset: "latin"
"#;
        let meta = FamilyMetadata::parse(text, "apache", "somefont");
        assert_eq!(meta.name, "somefont");
        assert_eq!(meta.category, "monospace");
        assert_eq!(meta.subsets, vec!["latin"]);
        assert_eq!(meta.designer, "");
    }

    #[test]
    fn test_empty_descriptor_fully_defaults() {
        let meta = FamilyMetadata::parse("", "ufl", "ubuntumono");
        assert_eq!(meta.name, "ubuntumono");
        assert_eq!(meta.category, "sans-serif");
        assert_eq!(meta.subsets, vec!["latin"]);
    }

    #[test]
    fn test_fallback_uses_slug_heuristics() {
        let meta = FamilyMetadata::fallback_for_slug("ofl", "jetbrainsmono");
        assert_eq!(meta.name, "JetBrains Mono");
        assert_eq!(meta.category, "monospace");
        assert_eq!(meta.subsets, vec!["latin"]);
        assert_eq!(meta.license, "ofl");
    }
}
