//! Source adapters
//!
//! Each adapter wraps one external data source and normalizes its output
//! into a common shape:
//!
//! - [`GitHubSource`] — family directory listings, per-family file
//!   listings, and metadata descriptors from the google/fonts repository.
//! - [`Css2Source`] — the set of (style, weight) variants actually served
//!   by the stylesheet-generation endpoint.
//! - [`release`] — pre-built catalog documents attached to GitHub releases.
//!
//! The catalog builder drives the adapters through the [`FamilySource`]
//! and [`VariantSource`] traits so tests can substitute in-memory fakes.

mod css2;
mod github;
mod metadata;
pub mod release;

pub use css2::{Css2Source, QueryAttempt, QueryShape};
pub use github::{GitHubSource, FONT_BINARY_EXTENSIONS};
pub use metadata::FamilyMetadata;

use anyhow::Result;
use async_trait::async_trait;

/// Adapter over the google/fonts repository.
#[async_trait]
pub trait FamilySource {
    /// Sorted, deduplicated family directory slugs under a license
    /// category. Never fails: network trouble yields an empty list.
    async fn list_family_dirs(&mut self, license: &str) -> Vec<String>;

    /// Metadata record for one family. The production adapter defaults
    /// every field it cannot obtain and practically never errors; the
    /// `Result` exists so the builder can account for a source that does.
    async fn family_metadata(&mut self, license: &str, slug: &str) -> Result<FamilyMetadata>;

    /// Font binary filenames present in the family directory.
    /// Informational only; empty on any failure.
    async fn list_font_files(&mut self, license: &str, slug: &str) -> Vec<String>;

    /// Calls issued against the tree/contents API so far.
    fn repo_calls(&self) -> u64;

    /// Calls issued against the raw descriptor endpoint so far.
    fn metadata_calls(&self) -> u64;
}

/// Adapter over the stylesheet-generation endpoint.
#[async_trait]
pub trait VariantSource {
    /// Sorted variant tokens observed as servable for a family. Never
    /// empty: exhausting every attempt falls back to `["regular", "700"]`.
    async fn resolve_variants(&mut self, family: &str) -> Vec<String>;

    /// Calls issued against the stylesheet endpoint so far.
    fn calls(&self) -> u64;
}
