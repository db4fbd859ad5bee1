//! Pre-built catalog releases
//!
//! A full catalog build takes hours against rate-limited endpoints, so
//! finished catalogs are published as a JSON asset on GitHub releases.
//! This fetches the latest release of the configured repository and
//! downloads the catalog asset from it.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::catalog::Catalog;
use crate::config::CATALOG_ASSET_NAME;

#[derive(Debug, Deserialize)]
struct LatestRelease {
    #[serde(default)]
    assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Deserialize)]
struct ReleaseAsset {
    name: String,
    browser_download_url: String,
}

/// Download the catalog attached to the latest release of `repo`.
pub async fn fetch_release_catalog(
    client: &reqwest::Client,
    repo: &str,
    token: Option<&str>,
) -> Result<Catalog> {
    let url = format!("https://api.github.com/repos/{repo}/releases/latest");

    let mut request = client
        .get(&url)
        .header("Accept", "application/vnd.github.v3+json");
    if let Some(token) = token {
        request = request.header("Authorization", format!("token {token}"));
    }

    let response = request
        .send()
        .await
        .with_context(|| format!("Failed to fetch latest release of {repo}"))?;

    if !response.status().is_success() {
        anyhow::bail!(
            "Latest release request failed: HTTP {} from {repo}",
            response.status()
        );
    }

    let release: LatestRelease = response
        .json()
        .await
        .context("Failed to parse release metadata")?;

    let asset = release
        .assets
        .iter()
        .find(|a| a.name == CATALOG_ASSET_NAME)
        .with_context(|| format!("No catalog asset found in latest release of {repo}"))?;

    info!("Downloading catalog from {}", asset.browser_download_url);

    let mut request = client.get(&asset.browser_download_url);
    if let Some(token) = token {
        request = request.header("Authorization", format!("token {token}"));
    }

    let response = request
        .send()
        .await
        .context("Failed to download catalog asset")?;

    if !response.status().is_success() {
        anyhow::bail!("Catalog download failed: HTTP {}", response.status());
    }

    let body = response
        .text()
        .await
        .context("Failed to read catalog asset body")?;

    Catalog::from_json(&body).context("Release catalog is not valid JSON")
}
