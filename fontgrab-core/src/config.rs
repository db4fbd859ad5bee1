//! Process configuration
//!
//! A single explicit `Config` value is constructed at startup and injected
//! into the builder, resolver and installer; nothing reads paths or
//! environment variables behind the caller's back after construction.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// GitHub repository that publishes pre-built catalog releases.
pub const DEFAULT_CATALOG_REPO: &str = "sanderboer/google-font-downloader";

/// Filename of the catalog asset attached to each release.
pub const CATALOG_ASSET_NAME: &str = "google_fonts_catalog.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the cached font data file.
    pub cache_dir: PathBuf,

    /// Root of the local asset tree (fonts land in `fonts/`, snippets in `scss/`).
    pub assets_dir: PathBuf,

    /// Repository slug for pre-built catalog releases.
    pub catalog_repo: String,

    /// Optional GitHub API token for higher rate limits.
    pub github_token: Option<String>,

    /// Rate limit for the tree/contents API.
    pub github_calls_per_second: f64,

    /// Rate limit for the stylesheet endpoint, which blocks automated
    /// traffic far more aggressively.
    pub css2_calls_per_second: f64,

    /// Retry budget for the stylesheet endpoint.
    pub css2_max_retries: u32,
}

impl Config {
    /// Build a configuration with the default cache location and the
    /// GitHub token picked up from `GITHUB_TOKEN` if set.
    pub fn new() -> Result<Self> {
        Ok(Self::with_cache_dir(Self::default_cache_dir()?))
    }

    /// Build a configuration around an explicit cache directory.
    pub fn with_cache_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            assets_dir: PathBuf::from("assets"),
            catalog_repo: DEFAULT_CATALOG_REPO.to_string(),
            github_token: std::env::var("GITHUB_TOKEN").ok(),
            github_calls_per_second: 10.0,
            css2_calls_per_second: 1.0,
            css2_max_retries: 3,
        }
    }

    /// Redirect the asset tree, chiefly for tests.
    pub fn with_assets_dir(mut self, assets_dir: PathBuf) -> Self {
        self.assets_dir = assets_dir;
        self
    }

    fn default_cache_dir() -> Result<PathBuf> {
        let cache_dir = directories::ProjectDirs::from("", "", "fontgrab")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .or_else(|| dirs::home_dir().map(|d| d.join(".fontgrab").join("cache")))
            .context("Could not determine cache directory")?;
        Ok(cache_dir)
    }

    /// Path of the single cached font data file. Freshness is determined
    /// by the file's modification time, not its content.
    pub fn cache_file(&self) -> PathBuf {
        self.cache_dir.join("google_fonts.json")
    }

    /// Directory fonts are installed into.
    pub fn fonts_dir(&self) -> PathBuf {
        self.assets_dir.join("fonts")
    }

    /// Directory stylesheet snippets are written into.
    pub fn scss_dir(&self) -> PathBuf {
        self.assets_dir.join("scss")
    }
}
