//! Full catalog build pass over the upstream font repository.

use anyhow::Result;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::catalog::{
    ApiCallCounts, Catalog, CatalogItem, CatalogMeta, FamilyEntry, LICENSE_CATEGORIES,
};
use crate::config::Config;
use crate::naming::slug_to_name;
use crate::source::{Css2Source, FamilySource, GitHubSource, VariantSource};

/// Counters accumulated over one build pass.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    pub families_seen: usize,
    pub failed_families: usize,
    pub collisions: usize,
}

/// Family map preserving first-seen insertion order. On a display-name
/// collision the later entry replaces the earlier one in place, so the
/// output position reflects where the name first appeared.
struct FamilyMap {
    order: Vec<String>,
    entries: HashMap<String, FamilyEntry>,
}

impl FamilyMap {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }

    /// Returns true when the insert replaced an existing entry.
    fn insert(&mut self, entry: FamilyEntry) -> bool {
        let key = entry.family.clone();
        let replaced = self.entries.insert(key.clone(), entry).is_some();
        if !replaced {
            self.order.push(key);
        }
        replaced
    }

    fn into_entries(self) -> Vec<FamilyEntry> {
        let mut entries = self.entries;
        self.order
            .into_iter()
            .filter_map(|name| entries.remove(&name))
            .collect()
    }
}

/// Builds a complete catalog by walking every license directory of the
/// upstream repository and resolving served variants per family.
pub struct CatalogBuilder<F: FamilySource, V: VariantSource> {
    families: F,
    variants: V,
    stats: BuildStats,
    started: Instant,
}

impl CatalogBuilder<GitHubSource, Css2Source> {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::with_sources(
            GitHubSource::new(config)?,
            Css2Source::new(config)?,
        ))
    }
}

impl<F: FamilySource, V: VariantSource> CatalogBuilder<F, V> {
    pub fn with_sources(families: F, variants: V) -> Self {
        Self {
            families,
            variants,
            stats: BuildStats::default(),
            started: Instant::now(),
        }
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Walk every license category, assemble one entry per family, and
    /// finalize into a catalog document. Per-family failures are logged
    /// and skipped; only the overall shape is guaranteed.
    pub async fn build(&mut self, max_per_license: Option<usize>) -> Catalog {
        self.started = Instant::now();
        let mut map = FamilyMap::new();

        for license in LICENSE_CATEGORIES {
            let mut slugs = self.families.list_family_dirs(license).await;
            if let Some(max) = max_per_license {
                slugs.truncate(max);
            }
            info!(license, families = slugs.len(), "Scanning license directory");

            for slug in &slugs {
                self.stats.families_seen += 1;
                match self.build_entry(license, slug).await {
                    Ok(entry) => {
                        debug!(family = %entry.family, variants = entry.variants.len(), "Built entry");
                        if map.insert(entry) {
                            self.stats.collisions += 1;
                            warn!(slug, "Duplicate family name, replacing earlier entry");
                        }
                    }
                    Err(err) => {
                        self.stats.failed_families += 1;
                        warn!(license, slug, error = %err, "Skipping family");
                    }
                }
            }
        }

        self.finalize(map.into_entries())
    }

    async fn build_entry(&mut self, license: &str, slug: &str) -> Result<FamilyEntry> {
        let metadata = self.families.family_metadata(license, slug).await?;
        let files = self.families.list_font_files(license, slug).await;
        let variants = self.variants.resolve_variants(&metadata.name).await;

        Ok(FamilyEntry {
            family: if metadata.name.is_empty() {
                slug_to_name(slug)
            } else {
                metadata.name
            },
            variants,
            category: metadata.category,
            license: license.to_string(),
            slug: slug.to_string(),
            subsets: metadata.subsets,
            files,
            designer: metadata.designer,
            github_path: format!("{license}/{slug}"),
        })
    }

    fn finalize(&self, entries: Vec<FamilyEntry>) -> Catalog {
        let items: Vec<CatalogItem> = entries.iter().map(CatalogItem::from).collect();
        let total_variants = items.iter().map(|item| item.variants.len()).sum();

        let meta = CatalogMeta {
            generated: chrono::Utc::now().to_rfc3339(),
            generator: concat!("fontgrab/", env!("CARGO_PKG_VERSION")).to_string(),
            source: "google/fonts@main".to_string(),
            total_families: items.len(),
            total_variants,
            license_types: LICENSE_CATEGORIES.len(),
            generation_time_seconds: self.started.elapsed().as_secs_f64(),
            api_calls: ApiCallCounts {
                github: self.families.repo_calls(),
                css2: self.variants.calls(),
                metadata: self.families.metadata_calls(),
            },
        };

        info!(
            families = meta.total_families,
            variants = meta.total_variants,
            failed = self.stats.failed_families,
            seconds = format!("{:.1}", meta.generation_time_seconds),
            "Catalog build complete"
        );

        Catalog { items, meta }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(name: &str, license: &str) -> FamilyEntry {
        FamilyEntry {
            family: name.to_string(),
            variants: vec!["regular".to_string()],
            category: "sans-serif".to_string(),
            license: license.to_string(),
            slug: name.to_lowercase().replace(' ', ""),
            subsets: vec!["latin".to_string()],
            files: vec![],
            designer: String::new(),
            github_path: format!("{license}/{}", name.to_lowercase()),
        }
    }

    #[test]
    fn test_family_map_preserves_first_seen_order() {
        let mut map = FamilyMap::new();
        assert!(!map.insert(entry("Bravura", "ofl")));
        assert!(!map.insert(entry("Alata", "ofl")));
        assert!(!map.insert(entry("Cabin", "ofl")));

        let names: Vec<String> = map.into_entries().into_iter().map(|e| e.family).collect();
        assert_eq!(names, vec!["Bravura", "Alata", "Cabin"]);
    }

    #[test]
    fn test_family_map_collision_replaces_in_place() {
        let mut map = FamilyMap::new();
        map.insert(entry("Alata", "ofl"));
        map.insert(entry("Cabin", "ofl"));
        assert!(map.insert(entry("Alata", "apache")));

        let entries = map.into_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].family, "Alata");
        assert_eq!(entries[0].license, "apache");
        assert_eq!(entries[1].family, "Cabin");
    }
}
