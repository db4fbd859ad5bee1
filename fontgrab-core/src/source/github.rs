//! google/fonts repository adapter
//!
//! Family directories are enumerated through the Git Trees API, which
//! returns the whole repository in one call. The Contents API serves as
//! fallback when the bulk endpoint is rate limited or oversized, and also
//! powers per-family file listings. Descriptor files come from the raw
//! file host. None of the listing operations ever raise on network
//! failure; they log and return empty.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::{FamilyMetadata, FamilySource};
use crate::config::Config;
use crate::ratelimit::RateLimiter;

const API_BASE: &str = "https://api.github.com";
const RAW_BASE: &str = "https://raw.githubusercontent.com/google/fonts/main";
const FONTS_REPO: &str = "google/fonts";

/// Extensions of font binaries tracked in the repository.
pub const FONT_BINARY_EXTENSIONS: [&str; 3] = [".ttf", ".otf", ".ttc"];

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeNode>,
}

#[derive(Debug, Deserialize)]
struct TreeNode {
    #[serde(default)]
    path: String,
    #[serde(rename = "type", default)]
    kind: String,
}

/// One entry of a Contents API directory listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentsItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl ContentsItem {
    /// Direct URL for the file's content, falling back to the raw host
    /// when the listing omits `download_url`.
    pub fn raw_url(&self) -> String {
        self.download_url
            .clone()
            .unwrap_or_else(|| format!("{RAW_BASE}/{}", self.path))
    }
}

/// Adapter over the google/fonts repository listings and descriptors.
pub struct GitHubSource {
    client: reqwest::Client,
    limiter: RateLimiter,
    token: Option<String>,
    repo_calls: u64,
    metadata_calls: u64,
}

impl GitHubSource {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fontgrab/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            limiter: RateLimiter::new(config.github_calls_per_second),
            token: config.github_token.clone(),
            repo_calls: 0,
            metadata_calls: 0,
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github.v3+json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {token}"));
        }
        request
    }

    /// List a repository directory via the Contents API. Empty on any
    /// failure; used both for family file listings and by the installer
    /// to walk into `static/` subdirectories.
    pub async fn list_dir(&mut self, path: &str) -> Vec<ContentsItem> {
        self.limiter.wait().await;
        self.repo_calls += 1;

        let url = format!("{API_BASE}/repos/{FONTS_REPO}/contents/{path}");
        let response = match self.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!("Contents request failed for {path}: {e}");
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            debug!("Contents API returned {} for {path}", response.status());
            return Vec::new();
        }

        response.json::<Vec<ContentsItem>>().await.unwrap_or_else(|e| {
            debug!("Contents response for {path} was not a directory listing: {e}");
            Vec::new()
        })
    }

    async fn list_family_dirs_via_trees(&mut self, license: &str) -> Result<Vec<String>> {
        self.limiter.wait().await;
        self.repo_calls += 1;

        let url = format!("{API_BASE}/repos/{FONTS_REPO}/git/trees/main?recursive=1");
        debug!("Fetching directories for {license} via Git Trees API");

        let response = self.get(&url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("Git Trees API returned HTTP {}", response.status());
        }

        let tree: TreeResponse = response.json().await?;
        let prefix = format!("{license}/");

        let mut directories: Vec<String> = tree
            .tree
            .iter()
            .filter(|node| node.kind == "tree" && node.path.starts_with(&prefix))
            .filter_map(|node| {
                let mut parts = node.path.split('/');
                let first = parts.next()?;
                let second = parts.next()?;
                (first == license).then(|| second.to_string())
            })
            .collect();

        directories.sort();
        directories.dedup();
        Ok(directories)
    }

    async fn list_family_dirs_via_contents(&mut self, license: &str) -> Vec<String> {
        debug!("Fetching directories for {license} via Contents API (fallback)");

        let mut directories: Vec<String> = self
            .list_dir(license)
            .await
            .into_iter()
            .filter(|item| item.kind == "dir")
            .map(|item| item.name)
            .collect();

        directories.sort();
        directories
    }

    async fn fetch_descriptor(&mut self, license: &str, slug: &str) -> Option<String> {
        self.limiter.wait().await;
        self.metadata_calls += 1;

        let url = format!("{RAW_BASE}/{license}/{slug}/METADATA.pb");
        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!("Descriptor request failed for {slug}: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!("Descriptor fetch returned {} for {slug}", response.status());
            return None;
        }

        response.text().await.ok()
    }
}

#[async_trait]
impl FamilySource for GitHubSource {
    async fn list_family_dirs(&mut self, license: &str) -> Vec<String> {
        match self.list_family_dirs_via_trees(license).await {
            Ok(directories) => {
                info!(
                    "Found {} {license} font families via Git Trees",
                    directories.len()
                );
                directories
            }
            Err(e) => {
                warn!("Git Trees API failed for {license}: {e}, trying fallback");
                let directories = self.list_family_dirs_via_contents(license).await;
                if directories.is_empty() {
                    error!("Failed to list {license} directories via both APIs");
                } else {
                    info!(
                        "Found {} {license} font families via Contents API",
                        directories.len()
                    );
                }
                directories
            }
        }
    }

    async fn family_metadata(&mut self, license: &str, slug: &str) -> Result<FamilyMetadata> {
        match self.fetch_descriptor(license, slug).await {
            Some(text) => Ok(FamilyMetadata::parse(&text, license, slug)),
            None => Ok(FamilyMetadata::fallback_for_slug(license, slug)),
        }
    }

    async fn list_font_files(&mut self, license: &str, slug: &str) -> Vec<String> {
        self.list_dir(&format!("{license}/{slug}"))
            .await
            .into_iter()
            .filter(|item| {
                item.kind == "file"
                    && FONT_BINARY_EXTENSIONS
                        .iter()
                        .any(|ext| item.name.to_ascii_lowercase().ends_with(ext))
            })
            .map(|item| item.name)
            .collect()
    }

    fn repo_calls(&self) -> u64 {
        self.repo_calls
    }

    fn metadata_calls(&self) -> u64 {
        self.metadata_calls
    }
}
