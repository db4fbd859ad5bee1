//! Fallback chain behavior with a scripted remote.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::path::PathBuf;

use fontgrab_core::catalog::{Catalog, CatalogItem};
use fontgrab_core::resolver::{FontDataResolver, RemoteCatalog, Tier, UpdateOutcome};

struct ScriptedRemote {
    release: Option<Catalog>,
    live: Option<Catalog>,
    release_calls: u64,
    live_calls: u64,
}

impl ScriptedRemote {
    fn new(release: Option<Catalog>, live: Option<Catalog>) -> Self {
        Self {
            release,
            live,
            release_calls: 0,
            live_calls: 0,
        }
    }
}

#[async_trait]
impl RemoteCatalog for ScriptedRemote {
    async fn fetch_release(&mut self) -> Result<Catalog> {
        self.release_calls += 1;
        match &self.release {
            Some(catalog) => Ok(catalog.clone()),
            None => bail!("release unavailable"),
        }
    }

    async fn fetch_live(&mut self) -> Result<Catalog> {
        self.live_calls += 1;
        match &self.live {
            Some(catalog) => Ok(catalog.clone()),
            None => bail!("live API unavailable"),
        }
    }
}

fn catalog_of(count: usize) -> Catalog {
    let items = (0..count)
        .map(|n| CatalogItem {
            family: format!("Family {n}"),
            variants: vec!["regular".to_string()],
            category: "sans-serif".to_string(),
            files: Default::default(),
        })
        .collect();
    Catalog {
        items,
        meta: Default::default(),
    }
}

fn cache_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("cache").join("google_fonts.json")
}

#[tokio::test]
async fn fresh_cache_answers_without_remote_calls() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_path(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, catalog_of(20).to_json_pretty().unwrap()).unwrap();

    let mut resolver =
        FontDataResolver::with_remote(path, ScriptedRemote::new(Some(catalog_of(99)), None));
    let (catalog, tier) = resolver.resolve().await;

    assert_eq!(tier, Tier::Cache);
    assert_eq!(catalog.family_count(), 20);
}

#[tokio::test]
async fn release_tier_fills_and_caches() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_path(&dir);

    let mut resolver = FontDataResolver::with_remote(
        path.clone(),
        ScriptedRemote::new(Some(catalog_of(30)), Some(catalog_of(5))),
    );
    let (catalog, tier) = resolver.resolve().await;

    assert_eq!(tier, Tier::Release);
    assert_eq!(catalog.family_count(), 30);
    // The fetched catalog was written back to the cache file.
    let cached = Catalog::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(cached.family_count(), 30);
}

#[tokio::test]
async fn live_tier_is_tried_when_release_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut resolver = FontDataResolver::with_remote(
        cache_path(&dir),
        ScriptedRemote::new(None, Some(catalog_of(12))),
    );
    let (catalog, tier) = resolver.resolve().await;

    assert_eq!(tier, Tier::LiveApi);
    assert_eq!(catalog.family_count(), 12);
}

#[tokio::test]
async fn embedded_tier_never_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut resolver =
        FontDataResolver::with_remote(cache_path(&dir), ScriptedRemote::new(None, None));
    let (catalog, tier) = resolver.resolve().await;

    assert_eq!(tier, Tier::Embedded);
    assert!(catalog.family_count() > 0);
    assert!(catalog.find_family("Roboto").is_some());
}

#[tokio::test]
async fn empty_release_catalog_falls_through_to_live() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_path(&dir);
    let mut resolver = FontDataResolver::with_remote(
        path.clone(),
        ScriptedRemote::new(Some(catalog_of(0)), Some(catalog_of(12))),
    );
    let (catalog, tier) = resolver.resolve().await;

    assert_eq!(tier, Tier::LiveApi);
    assert_eq!(catalog.family_count(), 12);
    // The empty release result must not have been cached.
    let cached = Catalog::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(cached.family_count(), 12);
}

#[tokio::test]
async fn empty_live_catalog_falls_through_to_embedded() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_path(&dir);
    let mut resolver = FontDataResolver::with_remote(
        path.clone(),
        ScriptedRemote::new(None, Some(catalog_of(0))),
    );
    let (catalog, tier) = resolver.resolve().await;

    assert_eq!(tier, Tier::Embedded);
    assert!(catalog.family_count() > 0);
    assert!(!path.exists());
}

#[tokio::test]
async fn update_skips_an_empty_release_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let mut resolver = FontDataResolver::with_remote(
        cache_path(&dir),
        ScriptedRemote::new(Some(catalog_of(0)), Some(catalog_of(50))),
    );
    let outcome = resolver.update_catalog(true).await.unwrap();
    assert_eq!(outcome, UpdateOutcome::Updated { families: 50 });
}

#[tokio::test]
async fn corrupt_cache_is_a_miss() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_path(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{definitely not a catalog").unwrap();

    let mut resolver =
        FontDataResolver::with_remote(path, ScriptedRemote::new(Some(catalog_of(40)), None));
    let (_, tier) = resolver.resolve().await;
    assert_eq!(tier, Tier::Release);
}

#[tokio::test]
async fn update_skips_when_cache_is_recent() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_path(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, catalog_of(20).to_json_pretty().unwrap()).unwrap();

    let mut resolver = FontDataResolver::with_remote(
        path,
        ScriptedRemote::new(Some(catalog_of(99)), None),
    );
    let outcome = resolver.update_catalog(false).await.unwrap();
    assert_eq!(outcome, UpdateOutcome::AlreadyFresh);
}

#[tokio::test]
async fn forced_update_replaces_a_recent_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_path(&dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, catalog_of(20).to_json_pretty().unwrap()).unwrap();

    let mut resolver = FontDataResolver::with_remote(
        path.clone(),
        ScriptedRemote::new(Some(catalog_of(99)), None),
    );
    let outcome = resolver.update_catalog(true).await.unwrap();
    assert_eq!(outcome, UpdateOutcome::Updated { families: 99 });

    let cached = Catalog::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(cached.family_count(), 99);
}

#[tokio::test]
async fn update_rejects_a_suspiciously_small_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let mut resolver = FontDataResolver::with_remote(
        cache_path(&dir),
        ScriptedRemote::new(Some(catalog_of(3)), None),
    );
    let err = resolver.update_catalog(true).await.unwrap_err();
    assert!(err.to_string().contains("incomplete"));
}

#[tokio::test]
async fn update_fails_when_every_source_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut resolver =
        FontDataResolver::with_remote(cache_path(&dir), ScriptedRemote::new(None, None));
    assert!(resolver.update_catalog(true).await.is_err());
}
