//! Structural and statistical checks for a catalog document.
//!
//! Validation works on raw JSON rather than the typed document so that
//! missing keys are reported instead of silently filled by defaults.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

use crate::catalog::VALID_CATEGORIES;

/// Families that any complete catalog is expected to carry. Used only
/// for a coverage warning, never an error.
const POPULAR_FAMILIES: [&str; 10] = [
    "Roboto",
    "Open Sans",
    "Lato",
    "Montserrat",
    "Oswald",
    "Source Sans Pro",
    "Raleway",
    "Inter",
    "Merriweather",
    "Playfair Display",
];

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub family_count: usize,
    pub variant_count: usize,
}

impl ValidationReport {
    /// In strict mode warnings fail validation too.
    pub fn passed(&self, strict: bool) -> bool {
        self.errors.is_empty() && (!strict || self.warnings.is_empty())
    }
}

pub struct CatalogValidator {
    document: Value,
}

impl CatalogValidator {
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        let document: Value = serde_json::from_str(&content)
            .with_context(|| format!("Catalog is not valid JSON: {}", path.display()))?;
        Ok(Self::new(document))
    }

    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        let Some(root) = self.document.as_object() else {
            report.errors.push("Catalog root is not a JSON object".to_string());
            return report;
        };

        let Some(items) = root.get("items") else {
            report.errors.push("Missing top-level key: items".to_string());
            return report;
        };
        let Some(items) = items.as_array() else {
            report.errors.push("Top-level items is not a list".to_string());
            return report;
        };
        if items.is_empty() {
            report.errors.push("Catalog contains no families".to_string());
        }

        match root.get("meta").and_then(Value::as_object) {
            Some(meta) => {
                for key in ["generated", "total_families", "generator"] {
                    if !meta.contains_key(key) {
                        report.warnings.push(format!("Meta is missing key: {key}"));
                    }
                }
            }
            None => report.warnings.push("Missing top-level key: meta".to_string()),
        }

        let mut seen_families: HashSet<String> = HashSet::new();
        for (index, item) in items.iter().enumerate() {
            self.check_item(index, item, &mut seen_families, &mut report);
        }
        report.family_count = seen_families.len();

        self.check_thresholds(&seen_families, &mut report);
        report
    }

    fn check_item(
        &self,
        index: usize,
        item: &Value,
        seen_families: &mut HashSet<String>,
        report: &mut ValidationReport,
    ) {
        let Some(item) = item.as_object() else {
            report.errors.push(format!("Item {index} is not an object"));
            return;
        };

        for key in ["family", "variants", "category"] {
            if !item.contains_key(key) {
                report.errors.push(format!("Item {index} is missing key: {key}"));
            }
        }

        let family = item.get("family").and_then(Value::as_str).unwrap_or("");
        if item.contains_key("family") && family.is_empty() {
            report.errors.push(format!("Item {index} has an empty family name"));
        }
        if !family.is_empty() && !seen_families.insert(family.to_string()) {
            report.errors.push(format!("Duplicate family: {family}"));
        }

        if let Some(variants) = item.get("variants").and_then(Value::as_array) {
            if variants.is_empty() {
                report.errors.push(format!("Family '{family}' has no variants"));
            }
            let mut seen_variants = HashSet::new();
            for variant in variants {
                let token = variant.as_str().unwrap_or("");
                if !seen_variants.insert(token.to_string()) {
                    report
                        .warnings
                        .push(format!("Family '{family}' has duplicate variant: {token}"));
                }
                report.variant_count += 1;
            }
        }

        if let Some(category) = item.get("category").and_then(Value::as_str) {
            if !VALID_CATEGORIES.contains(&category) {
                report
                    .warnings
                    .push(format!("Family '{family}' has unknown category: {category}"));
            }
        }
    }

    fn check_thresholds(&self, families: &HashSet<String>, report: &mut ValidationReport) {
        if !families.is_empty() && families.len() < 100 {
            report.warnings.push(format!(
                "Catalog has only {} families, a full build carries over a thousand",
                families.len()
            ));
        }
        if report.variant_count > 0 && report.variant_count < 1000 {
            report.warnings.push(format!(
                "Catalog has only {} variants in total",
                report.variant_count
            ));
        }

        let covered = POPULAR_FAMILIES
            .iter()
            .filter(|name| families.contains(**name))
            .count();
        if !families.is_empty() && covered * 100 < POPULAR_FAMILIES.len() * 80 {
            report.warnings.push(format!(
                "Only {covered}/{} well-known families are present",
                POPULAR_FAMILIES.len()
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn big_valid_document() -> Value {
        let mut items: Vec<Value> = POPULAR_FAMILIES
            .iter()
            .map(|name| {
                json!({"family": name, "variants": ["regular", "700"], "category": "sans-serif"})
            })
            .collect();
        for n in 0..120 {
            items.push(json!({
                "family": format!("Filler {n}"),
                "variants": (0..10).map(|w| format!("{}", 100 * (w + 1))).collect::<Vec<_>>(),
                "category": "serif"
            }));
        }
        json!({
            "items": items,
            "meta": {"generated": "2025-01-01T00:00:00Z", "total_families": 130, "generator": "test"}
        })
    }

    #[test]
    fn test_valid_catalog_passes_strict() {
        let report = CatalogValidator::new(big_valid_document()).validate();
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert!(report.passed(true));
    }

    #[test]
    fn test_missing_items_is_error() {
        let report = CatalogValidator::new(json!({"meta": {}})).validate();
        assert!(!report.passed(false));
        assert!(report.errors[0].contains("items"));
    }

    #[test]
    fn test_empty_items_is_error() {
        let report = CatalogValidator::new(json!({"items": [], "meta": {}})).validate();
        assert!(!report.passed(false));
    }

    #[test]
    fn test_missing_meta_keys_warn() {
        let report = CatalogValidator::new(json!({
            "items": [{"family": "Lora", "variants": ["regular"], "category": "serif"}],
            "meta": {"generated": "x"}
        }))
        .validate();
        assert!(report.errors.is_empty());
        assert!(report.warnings.iter().any(|w| w.contains("total_families")));
        assert!(report.warnings.iter().any(|w| w.contains("generator")));
        assert!(report.passed(false));
        assert!(!report.passed(true));
    }

    #[test]
    fn test_duplicate_family_is_error() {
        let report = CatalogValidator::new(json!({
            "items": [
                {"family": "Lora", "variants": ["regular"], "category": "serif"},
                {"family": "Lora", "variants": ["700"], "category": "serif"}
            ],
            "meta": {"generated": "x", "total_families": 2, "generator": "test"}
        }))
        .validate();
        assert!(report.errors.iter().any(|e| e.contains("Duplicate family")));
    }

    #[test]
    fn test_empty_variants_is_error_duplicate_variant_warns() {
        let report = CatalogValidator::new(json!({
            "items": [
                {"family": "Lora", "variants": [], "category": "serif"},
                {"family": "Cabin", "variants": ["regular", "regular"], "category": "sans-serif"}
            ],
            "meta": {"generated": "x", "total_families": 2, "generator": "test"}
        }))
        .validate();
        assert!(report.errors.iter().any(|e| e.contains("no variants")));
        assert!(report.warnings.iter().any(|w| w.contains("duplicate variant")));
    }

    #[test]
    fn test_unknown_category_warns() {
        let report = CatalogValidator::new(json!({
            "items": [{"family": "Lora", "variants": ["regular"], "category": "fancy"}],
            "meta": {"generated": "x", "total_families": 1, "generator": "test"}
        }))
        .validate();
        assert!(report.warnings.iter().any(|w| w.contains("unknown category")));
    }

    #[test]
    fn test_from_path_rejects_broken_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(CatalogValidator::from_path(&path).is_err());
    }
}
