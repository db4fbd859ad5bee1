//! Font installation into the local asset tree.
//!
//! An install pulls the served woff2 variants, then the repository
//! binaries (TTF/OTF plus the license text) as fallback sources, and
//! finishes by writing the family's scss snippet. Layout:
//!
//! ```text
//! assets/
//!   fonts/<Family>/   downloaded binaries + license text
//!   scss/<Family>.scss
//! ```

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, LICENSE_CATEGORIES};
use crate::config::Config;
use crate::naming::name_to_slug;
use crate::source::{Css2Source, GitHubSource, FONT_BINARY_EXTENSIONS};
use crate::stylesheet::{self, SavedVariant};
use crate::variant::VariantFile;

const LICENSE_FILE_NAMES: [&str; 3] = ["OFL.txt", "LICENSE.txt", "UFL.txt"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    AlreadyInstalled { family: String },
    Installed(InstallSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSummary {
    pub family: String,
    pub web_files: usize,
    pub repo_files: usize,
    pub scss_path: PathBuf,
}

pub struct FontInstaller {
    assets_dir: PathBuf,
    github: GitHubSource,
    css2: Css2Source,
    client: reqwest::Client,
}

impl FontInstaller {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fontgrab/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            assets_dir: config.assets_dir.clone(),
            github: GitHubSource::new(config)?,
            css2: Css2Source::new(config)?,
            client,
        })
    }

    pub fn fonts_dir(&self) -> PathBuf {
        self.assets_dir.join("fonts")
    }

    pub fn scss_dir(&self) -> PathBuf {
        self.assets_dir.join("scss")
    }

    /// Install one family from the catalog. Missing families and a
    /// download yielding no files at all are errors; individual file
    /// failures are logged and skipped.
    pub async fn install_family(
        &mut self,
        name: &str,
        catalog: &Catalog,
        force: bool,
    ) -> Result<InstallOutcome> {
        let Some(item) = catalog.find_family(name) else {
            bail!("Font family not found in catalog: {name}");
        };
        let family = item.family.clone();

        let family_dir = self.fonts_dir().join(&family);
        if !force && dir_has_files(&family_dir) {
            debug!(family, "Already installed, skipping");
            return Ok(InstallOutcome::AlreadyInstalled { family });
        }
        std::fs::create_dir_all(&family_dir)
            .with_context(|| format!("Failed to create {}", family_dir.display()))?;

        let mut web_files = self.download_web_variants(&family, &family_dir).await;
        if web_files.is_empty() && !item.files.is_empty() {
            // Live API and embedded entries carry direct URLs.
            web_files = self
                .download_listed_files(&family, &item.files, &family_dir)
                .await;
        }

        let (repo_files, ttf_fallback) = self.download_repo_files(&family, &family_dir).await;

        if web_files.is_empty() && repo_files == 0 {
            let _ = std::fs::remove_dir(&family_dir);
            bail!("No files could be downloaded for {family}");
        }

        self.ensure_license_file(&family, &family_dir)?;

        let snippet = stylesheet::scss_snippet(&family, &web_files, ttf_fallback.as_deref());
        let scss_path = stylesheet::write_snippet(&self.scss_dir(), &family, &snippet)?;

        info!(
            family,
            web = web_files.len(),
            repo = repo_files,
            "Installed font family"
        );
        Ok(InstallOutcome::Installed(InstallSummary {
            family,
            web_files: web_files.len(),
            repo_files,
            scss_path,
        }))
    }

    /// Every file currently present under the asset tree.
    pub fn installed_files(&self) -> Vec<PathBuf> {
        walkdir::WalkDir::new(&self.assets_dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect()
    }

    async fn download_web_variants(&mut self, family: &str, dir: &Path) -> Vec<SavedVariant> {
        let faces = self.css2.fetch_variant_files(family).await;
        let mut saved = Vec::new();
        for VariantFile { style, weight, url } in faces {
            let file_name =
                stylesheet::variant_file_name(family, style, weight, extension_of(&url, "woff2"));
            match self.fetch_to(&url, &dir.join(&file_name)).await {
                Ok(()) => saved.push(SavedVariant {
                    style,
                    weight,
                    file_name,
                }),
                Err(err) => warn!(family, url, error = %err, "Variant download failed"),
            }
        }
        saved
    }

    async fn download_listed_files(
        &mut self,
        family: &str,
        files: &std::collections::BTreeMap<String, String>,
        dir: &Path,
    ) -> Vec<SavedVariant> {
        let mut saved = Vec::new();
        for (token, url) in files {
            let Some((style, weight)) = crate::variant::parse_token(token) else {
                continue;
            };
            let file_name =
                stylesheet::variant_file_name(family, style, weight, extension_of(url, "woff2"));
            match self.fetch_to(url, &dir.join(&file_name)).await {
                Ok(()) => saved.push(SavedVariant {
                    style,
                    weight,
                    file_name,
                }),
                Err(err) => warn!(family, url, error = %err, "Variant download failed"),
            }
        }
        saved
    }

    /// Pull binaries and license text from the family's repository
    /// directory. Returns the file count and the name of a saved TTF
    /// usable as a truetype fallback source, if any.
    async fn download_repo_files(&mut self, family: &str, dir: &Path) -> (usize, Option<String>) {
        let slug = name_to_slug(family);
        let mut count = 0;
        let mut ttf_fallback = None;

        for license in LICENSE_CATEGORIES {
            let items = self.github.list_dir(&format!("{license}/{slug}")).await;
            if items.is_empty() {
                continue;
            }

            let mut queue = items;
            // Static instances of variable fonts live one level down.
            if let Some(static_dir) = queue
                .iter()
                .find(|item| item.kind == "dir" && item.name == "static")
            {
                let nested = self.github.list_dir(&static_dir.path).await;
                queue.extend(nested);
            }

            for item in queue {
                if item.kind != "file" {
                    continue;
                }
                let lower = item.name.to_lowercase();
                let is_binary = FONT_BINARY_EXTENSIONS
                    .iter()
                    .any(|ext| lower.ends_with(ext));
                let is_license = LICENSE_FILE_NAMES.contains(&item.name.as_str());
                if !is_binary && !is_license {
                    continue;
                }

                match self.fetch_to(&item.raw_url(), &dir.join(&item.name)).await {
                    Ok(()) => {
                        count += 1;
                        if lower.ends_with(".ttf") && ttf_fallback.is_none() {
                            ttf_fallback = Some(item.name.clone());
                        }
                    }
                    Err(err) => warn!(family, file = item.name, error = %err, "Repo download failed"),
                }
            }
            return (count, ttf_fallback);
        }

        debug!(family, slug, "No repository directory found");
        (0, None)
    }

    /// Guarantee the family ships with license text, writing an
    /// attribution note when the repository had none to offer.
    fn ensure_license_file(&self, family: &str, dir: &Path) -> Result<()> {
        if LICENSE_FILE_NAMES
            .iter()
            .any(|name| dir.join(name).exists())
        {
            return Ok(());
        }
        let path = dir.join("LICENSE.txt");
        let note = format!(
            "{family}\n\nDownloaded from Google Fonts (https://fonts.google.com).\n\
             Most Google Fonts families are licensed under the SIL Open Font\n\
             License 1.1; consult https://fonts.google.com/specimen/{}/license\n\
             for the authoritative terms.\n",
            family.replace(' ', "+")
        );
        std::fs::write(&path, note).with_context(|| format!("Failed to write {}", path.display()))
    }

    async fn fetch_to(&self, url: &str, path: &Path) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request failed: {url}"))?
            .error_for_status()
            .with_context(|| format!("Error status from {url}"))?;
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body from {url}"))?;
        std::fs::write(path, &bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(url, bytes = bytes.len(), "Downloaded file");
        Ok(())
    }
}

fn dir_has_files(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

fn extension_of<'a>(url: &'a str, default: &'a str) -> &'a str {
    url.rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(default)
}
