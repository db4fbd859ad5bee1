//! Catalog acquisition with a tiered fallback chain.
//!
//! Resolution order: fresh on-disk cache, release-asset catalog, live
//! webfonts API, and finally a small embedded family list so the tool
//! keeps working fully offline.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CatalogItem, CatalogMeta};
use crate::config::Config;
use crate::source::release;

const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const UPDATE_TTL: Duration = Duration::from_secs(60 * 60);

/// Minimum family count for an update to be accepted as a real catalog.
const MIN_UPDATE_FAMILIES: usize = 10;

const WEBFONTS_API: &str = "https://www.googleapis.com/webfonts/v1/webfonts?sort=popularity";

/// Which tier of the fallback chain produced the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Cache,
    Release,
    LiveApi,
    Embedded,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tier::Cache => "local cache",
            Tier::Release => "release catalog",
            Tier::LiveApi => "live API",
            Tier::Embedded => "embedded fallback list",
        };
        write!(f, "{label}")
    }
}

/// Outcome of an explicit catalog refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Cache was recent enough that no refresh was attempted.
    AlreadyFresh,
    /// Cache was replaced with a freshly fetched catalog of this size.
    Updated { families: usize },
}

/// The two remote tiers, behind a seam so the chain is testable offline.
#[async_trait]
pub trait RemoteCatalog {
    async fn fetch_release(&mut self) -> Result<Catalog>;
    async fn fetch_live(&mut self) -> Result<Catalog>;
}

pub struct HttpRemoteCatalog {
    client: reqwest::Client,
    repo: String,
    token: Option<String>,
}

impl HttpRemoteCatalog {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fontgrab/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            repo: config.catalog_repo.clone(),
            token: config.github_token.clone(),
        })
    }
}

#[async_trait]
impl RemoteCatalog for HttpRemoteCatalog {
    async fn fetch_release(&mut self) -> Result<Catalog> {
        release::fetch_release_catalog(&self.client, &self.repo, self.token.as_deref()).await
    }

    async fn fetch_live(&mut self) -> Result<Catalog> {
        let response = self
            .client
            .get(WEBFONTS_API)
            .send()
            .await
            .context("Webfonts API request failed")?
            .error_for_status()
            .context("Webfonts API returned an error status")?;
        let body = response
            .text()
            .await
            .context("Failed to read webfonts API response")?;
        Catalog::from_json(&body)
    }
}

/// Resolves the working catalog and keeps the on-disk cache current.
pub struct FontDataResolver<R: RemoteCatalog> {
    cache_file: PathBuf,
    remote: R,
}

impl FontDataResolver<HttpRemoteCatalog> {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_remote(
            config.cache_file(),
            HttpRemoteCatalog::new(config)?,
        ))
    }
}

impl<R: RemoteCatalog> FontDataResolver<R> {
    pub fn with_remote(cache_file: PathBuf, remote: R) -> Self {
        Self { cache_file, remote }
    }

    /// Walk the fallback chain. Never fails; the embedded list is the
    /// terminal tier.
    pub async fn resolve(&mut self) -> (Catalog, Tier) {
        if let Some(catalog) = self.load_fresh_cache(CACHE_TTL) {
            return (catalog, Tier::Cache);
        }

        // A catalog with zero families is a tier failure like any other;
        // caching it would blank out every lookup until the TTL expires.
        match self.remote.fetch_release().await {
            Ok(catalog) if !catalog.items.is_empty() => {
                info!(families = catalog.family_count(), "Fetched release catalog");
                self.save_cache(&catalog);
                return (catalog, Tier::Release);
            }
            Ok(_) => warn!("Release catalog was empty, trying live API"),
            Err(err) => warn!(error = %err, "Release catalog unavailable, trying live API"),
        }

        match self.remote.fetch_live().await {
            Ok(catalog) if !catalog.items.is_empty() => {
                info!(families = catalog.family_count(), "Fetched live API catalog");
                self.save_cache(&catalog);
                return (catalog, Tier::LiveApi);
            }
            Ok(_) => warn!("Live API catalog was empty, using embedded fallback list"),
            Err(err) => warn!(error = %err, "Live API unavailable, using embedded fallback list"),
        }

        (embedded_catalog(), Tier::Embedded)
    }

    /// Refresh the cached catalog from the remote tiers. Unlike
    /// [`resolve`], a failed refresh is an error rather than a fallback.
    pub async fn update_catalog(&mut self, force: bool) -> Result<UpdateOutcome> {
        if !force && self.load_fresh_cache(UPDATE_TTL).is_some() {
            debug!("Cached catalog is recent, skipping refresh");
            return Ok(UpdateOutcome::AlreadyFresh);
        }

        let catalog = match self.remote.fetch_release().await {
            Ok(catalog) if !catalog.items.is_empty() => catalog,
            Ok(_) => {
                warn!("Release catalog was empty, trying live API");
                self.remote
                    .fetch_live()
                    .await
                    .context("All catalog sources failed")?
            }
            Err(err) => {
                warn!(error = %err, "Release catalog unavailable, trying live API");
                self.remote
                    .fetch_live()
                    .await
                    .context("All catalog sources failed")?
            }
        };

        if catalog.family_count() < MIN_UPDATE_FAMILIES {
            bail!(
                "Refusing to cache {} families, catalog seems incomplete",
                catalog.family_count()
            );
        }

        self.save_cache(&catalog);
        Ok(UpdateOutcome::Updated {
            families: catalog.family_count(),
        })
    }

    fn load_fresh_cache(&self, ttl: Duration) -> Option<Catalog> {
        let metadata = std::fs::metadata(&self.cache_file).ok()?;
        let age = metadata
            .modified()
            .ok()
            .and_then(|mtime| SystemTime::now().duration_since(mtime).ok())?;
        if age > ttl {
            debug!(path = %self.cache_file.display(), "Cached catalog is stale");
            return None;
        }

        let content = std::fs::read_to_string(&self.cache_file).ok()?;
        match Catalog::from_json(&content) {
            Ok(catalog) => {
                debug!(families = catalog.family_count(), "Loaded cached catalog");
                Some(catalog)
            }
            Err(err) => {
                warn!(error = %err, "Cached catalog is unreadable, treating as a miss");
                None
            }
        }
    }

    /// Cache writes are best effort; a failure never breaks resolution.
    fn save_cache(&self, catalog: &Catalog) {
        let result = catalog.to_json_pretty().and_then(|json| {
            if let Some(parent) = self.cache_file.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(&self.cache_file, json)
                .with_context(|| format!("Failed to write {}", self.cache_file.display()))
        });
        if let Err(err) = result {
            warn!(error = %err, "Could not update catalog cache");
        }
    }
}

/// Small curated family list used when every other tier is unreachable.
pub fn embedded_catalog() -> Catalog {
    let families: [(&str, &str, &[(&str, &str)]); 5] = [
        (
            "Inter",
            "sans-serif",
            &[
                ("regular", "https://fonts.gstatic.com/s/inter/v13/UcC73FwrK3iLTeHuS_fvQtMwCp50KnMa1ZL7.woff2"),
                ("700", "https://fonts.gstatic.com/s/inter/v13/UcC73FwrK3iLTeHuS_fvQtMwCp50KnMa1ZL7SUc.woff2"),
            ],
        ),
        (
            "Roboto",
            "sans-serif",
            &[
                ("regular", "https://fonts.gstatic.com/s/roboto/v30/KFOmCnqEu92Fr1Mu4mxK.woff2"),
                ("700", "https://fonts.gstatic.com/s/roboto/v30/KFOlCnqEu92Fr1MmWUlfBBc4.woff2"),
            ],
        ),
        (
            "Open Sans",
            "sans-serif",
            &[
                ("regular", "https://fonts.gstatic.com/s/opensans/v36/memSYaGs126MiZpBA-UvWbX2vVnXBbObj2OVZyOOSr4dVJWUgsjZ0B4gaVI.woff2"),
                ("700", "https://fonts.gstatic.com/s/opensans/v36/memSYaGs126MiZpBA-UvWbX2vVnXBbObj2OVZyOOSr4dVJWUgsg-1x4gaVI.woff2"),
            ],
        ),
        (
            "Lora",
            "serif",
            &[
                ("regular", "https://fonts.gstatic.com/s/lora/v32/0QI6MX1D_JOuGQbT0gvTJPa787weuyJG.woff2"),
                ("700", "https://fonts.gstatic.com/s/lora/v32/0QI6MX1D_JOuGQbT0gvTJPa787z5vCJG.woff2"),
            ],
        ),
        (
            "Playfair Display",
            "serif",
            &[
                ("regular", "https://fonts.gstatic.com/s/playfairdisplay/v37/nuFvD-vYSZviVYUb_rj3ij__anPXJzDwcbmjWBN2PKdFvXDXbtXK-F2qC0s.woff2"),
                ("700", "https://fonts.gstatic.com/s/playfairdisplay/v37/nuFvD-vYSZviVYUb_rj3ij__anPXJzDwcbmjWBN2PKeiukDXbtXK-F2qC0s.woff2"),
            ],
        ),
    ];

    let items = families
        .iter()
        .map(|(family, category, files)| CatalogItem {
            family: family.to_string(),
            variants: files.iter().map(|(token, _)| token.to_string()).collect(),
            category: category.to_string(),
            files: files
                .iter()
                .map(|(token, url)| (token.to_string(), url.to_string()))
                .collect(),
        })
        .collect::<Vec<_>>();

    let meta = CatalogMeta {
        generated: String::new(),
        generator: concat!("fontgrab/", env!("CARGO_PKG_VERSION")).to_string(),
        source: "embedded".to_string(),
        total_families: items.len(),
        total_variants: items.iter().map(|item| item.variants.len()).sum(),
        ..Default::default()
    };

    Catalog { items, meta }
}
