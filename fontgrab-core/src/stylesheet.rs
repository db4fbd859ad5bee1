//! SCSS snippet generation for installed families.
//!
//! Snippets assume the asset layout written by the installer: fonts under
//! `assets/fonts/<Family>/` and snippets under `assets/scss/`, so the
//! relative `../fonts/` source paths resolve when the snippet is
//! imported from the scss directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::variant::{parse_token, Style};

/// One downloaded variant file, as recorded by the installer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedVariant {
    pub style: Style,
    pub weight: u16,
    pub file_name: String,
}

fn face_block(family: &str, style: Style, weight: u16, src: &str) -> String {
    format!(
        "@font-face {{\n  font-family: '{family}';\n  font-style: {};\n  font-weight: {weight};\n  font-display: swap;\n  src: {src};\n}}\n",
        style.as_css()
    )
}

fn usage_footer(family: &str) -> String {
    format!("\n// Usage:\n// body {{ font-family: '{family}', sans-serif; }}\n")
}

/// Render the snippet for a family from its downloaded variant files.
///
/// Each woff2 variant gets its own `@font-face` block; when a repository
/// TTF was saved it is appended as a `truetype` fallback source to every
/// block. With no woff2 files at all, a single weight-400 block serves
/// the TTF directly.
pub fn scss_snippet(family: &str, variants: &[SavedVariant], ttf_fallback: Option<&str>) -> String {
    let mut out = format!("// {family}\n// Generated by fontgrab\n\n");

    if variants.is_empty() {
        if let Some(ttf) = ttf_fallback {
            let src = format!("url('../fonts/{family}/{ttf}') format('truetype')");
            out.push_str(&face_block(family, Style::Normal, 400, &src));
        }
        out.push_str(&usage_footer(family));
        return out;
    }

    for variant in variants {
        let mut src = format!(
            "url('../fonts/{family}/{}') format('woff2')",
            variant.file_name
        );
        if let Some(ttf) = ttf_fallback {
            src.push_str(&format!(
                ",\n       url('../fonts/{family}/{ttf}') format('truetype')"
            ));
        }
        out.push_str(&face_block(family, variant.style, variant.weight, &src));
        out.push('\n');
    }

    out.push_str(&usage_footer(family));
    out
}

/// Render a snippet from catalog variant tokens alone, with no local
/// files. Useful for previewing what an install would declare.
pub fn scss_snippet_from_tokens(family: &str, tokens: &[String]) -> String {
    let variants: Vec<SavedVariant> = tokens
        .iter()
        .filter_map(|token| parse_token(token))
        .map(|(style, weight)| SavedVariant {
            style,
            weight,
            file_name: variant_file_name(family, style, weight, "woff2"),
        })
        .collect();
    scss_snippet(family, &variants, None)
}

/// `Open Sans` -> `Open_Sans.scss`
pub fn scss_file_name(family: &str) -> String {
    format!("{}.scss", family.replace(' ', "_"))
}

/// `Open Sans`, italic, 700 -> `OpenSans-700-italic.woff2`
pub fn variant_file_name(family: &str, style: Style, weight: u16, extension: &str) -> String {
    format!(
        "{}-{weight}-{}.{extension}",
        family.replace(' ', ""),
        style.as_css()
    )
}

pub fn write_snippet(scss_dir: &Path, family: &str, snippet: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(scss_dir)
        .with_context(|| format!("Failed to create {}", scss_dir.display()))?;
    let path = scss_dir.join(scss_file_name(family));
    std::fs::write(&path, snippet)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn saved(style: Style, weight: u16, file_name: &str) -> SavedVariant {
        SavedVariant {
            style,
            weight,
            file_name: file_name.to_string(),
        }
    }

    #[test]
    fn test_snippet_block_per_variant() {
        let snippet = scss_snippet(
            "Lora",
            &[
                saved(Style::Normal, 400, "Lora-400-normal.woff2"),
                saved(Style::Italic, 700, "Lora-700-italic.woff2"),
            ],
            None,
        );
        assert_eq!(snippet.matches("@font-face").count(), 2);
        assert!(snippet.contains("font-style: italic;"));
        assert!(snippet.contains("font-weight: 700;"));
        assert!(snippet.contains("url('../fonts/Lora/Lora-400-normal.woff2') format('woff2')"));
        assert!(snippet.contains("// Usage:"));
    }

    #[test]
    fn test_ttf_fallback_appended_to_each_block() {
        let snippet = scss_snippet(
            "Cabin",
            &[saved(Style::Normal, 400, "Cabin-400-normal.woff2")],
            Some("Cabin-Regular.ttf"),
        );
        assert!(snippet.contains("format('woff2')"));
        assert!(snippet.contains("url('../fonts/Cabin/Cabin-Regular.ttf') format('truetype')"));
    }

    #[test]
    fn test_ttf_only_yields_single_regular_block() {
        let snippet = scss_snippet("Cabin", &[], Some("Cabin-Regular.ttf"));
        assert_eq!(snippet.matches("@font-face").count(), 1);
        assert!(snippet.contains("font-weight: 400;"));
        assert!(snippet.contains("format('truetype')"));
    }

    #[test]
    fn test_snippet_from_tokens_skips_unparseable() {
        let snippet = scss_snippet_from_tokens(
            "Open Sans",
            &["regular".to_string(), "700italic".to_string(), "wide".to_string()],
        );
        assert_eq!(snippet.matches("@font-face").count(), 2);
        assert!(snippet.contains("url('../fonts/Open Sans/OpenSans-400-normal.woff2')"));
        assert!(snippet.contains("url('../fonts/Open Sans/OpenSans-700-italic.woff2')"));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(scss_file_name("Playfair Display"), "Playfair_Display.scss");
        assert_eq!(
            variant_file_name("Open Sans", Style::Italic, 700, "woff2"),
            "OpenSans-700-italic.woff2"
        );
    }

    #[test]
    fn test_write_snippet() {
        let dir = tempfile::tempdir().unwrap();
        let scss_dir = dir.path().join("assets").join("scss");
        let path = write_snippet(&scss_dir, "Lora", "// Lora\n").unwrap();
        assert!(path.ends_with("Lora.scss"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "// Lora\n");
    }
}
