//! Offline font catalog
//!
//! This module builds and validates the persisted catalog document that
//! serves as an offline substitute for live API queries.
//!
//! # Architecture
//!
//! ```text
//! google/fonts repo (trees/contents API)   css2 stylesheet endpoint
//!         │                                        │
//!         ├── family directory slugs               │
//!         ├── METADATA.pb descriptors              │
//!         └── binary file listings        servable (style, weight) pairs
//!                    │                             │
//!                    ▼                             ▼
//!              CatalogBuilder ──────────────────────
//!                    │
//!                    ▼
//!          Catalog { items, meta }  →  google_fonts_catalog.json
//! ```
//!
//! Downstream, the fallback chain resolver consumes the same document
//! shape from cache, release assets or the live API.

mod builder;
mod entry;
mod validate;

pub use builder::{BuildStats, CatalogBuilder};
pub use entry::{ApiCallCounts, Catalog, CatalogItem, CatalogMeta, FamilyEntry, VALID_CATEGORIES};
pub use validate::{CatalogValidator, ValidationReport};

/// License categories of the google/fonts repository, in the fixed order
/// a catalog build processes them.
pub const LICENSE_CATEGORIES: [&str; 3] = ["ofl", "apache", "ufl"];
