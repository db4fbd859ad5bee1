//! Catalog document types
//!
//! Two shapes exist for one family: the full [`FamilyEntry`] accumulated
//! during a build pass, and the reduced [`CatalogItem`] the download
//! tooling consumes (family/variants/category plus an optional per-variant
//! URL map that only the live API populates). Conversion between them is
//! lossless for family, variants and category.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The category vocabulary. Unknown values are warnings, not hard errors.
pub const VALID_CATEGORIES: [&str; 5] = ["sans-serif", "serif", "monospace", "display", "handwriting"];

/// One font family as assembled during a catalog build pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyEntry {
    /// Display name, unique within a catalog.
    pub family: String,

    /// Variant tokens, non-empty and duplicate-free.
    pub variants: Vec<String>,

    /// One of [`VALID_CATEGORIES`], best effort.
    pub category: String,

    /// License category the family is filed under upstream.
    pub license: String,

    /// Filesystem/API-safe identifier.
    pub slug: String,

    /// Supported character subsets, defaulting to latin.
    pub subsets: Vec<String>,

    /// Binary filenames found in the repository directory. Informational.
    pub files: Vec<String>,

    /// Descriptive, non-authoritative.
    pub designer: String,

    /// `{license}/{slug}` path in the upstream repository.
    pub github_path: String,
}

/// One font family in the consumed catalog shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub family: String,

    #[serde(default)]
    pub variants: Vec<String>,

    #[serde(default)]
    pub category: String,

    /// Variant token to direct download URL. Populated only by the live
    /// API tier; catalog-built entries resolve files on demand instead.
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

impl From<&FamilyEntry> for CatalogItem {
    fn from(entry: &FamilyEntry) -> Self {
        Self {
            family: entry.family.clone(),
            variants: entry.variants.clone(),
            category: entry.category.clone(),
            files: BTreeMap::new(),
        }
    }
}

/// Per-source API call counters accumulated during a build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiCallCounts {
    pub github: u64,
    pub css2: u64,
    pub metadata: u64,
}

/// Aggregate metadata of a catalog document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogMeta {
    #[serde(default)]
    pub generated: String,

    #[serde(default)]
    pub generator: String,

    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub total_families: usize,

    #[serde(default)]
    pub total_variants: usize,

    #[serde(default)]
    pub license_types: usize,

    #[serde(default)]
    pub generation_time_seconds: f64,

    #[serde(default)]
    pub api_calls: ApiCallCounts,
}

/// The persisted catalog document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub items: Vec<CatalogItem>,

    #[serde(default)]
    pub meta: CatalogMeta,
}

impl Catalog {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse catalog JSON")
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize catalog")
    }

    /// Find a family by display name, case-insensitively.
    pub fn find_family(&self, name: &str) -> Option<&CatalogItem> {
        self.items
            .iter()
            .find(|item| item.family.eq_ignore_ascii_case(name))
    }

    /// Case-insensitive substring search over family names.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&CatalogItem> {
        let query = query.to_lowercase();
        self.items
            .iter()
            .filter(|item| item.family.to_lowercase().contains(&query))
            .take(limit)
            .collect()
    }

    pub fn family_count(&self) -> usize {
        self.items.len()
    }

    pub fn variant_count(&self) -> usize {
        self.items.iter().map(|item| item.variants.len()).sum()
    }
}
