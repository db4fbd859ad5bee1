//! Offline-friendly Google Fonts tooling.
//!
//! The crate covers two workflows:
//!
//! - **Catalog building** ([`catalog::CatalogBuilder`]): walk the
//!   google/fonts repository, reconcile metadata with the variants the
//!   stylesheet endpoint actually serves, and emit a self-contained
//!   catalog document.
//! - **Font installation** ([`download::FontInstaller`]): resolve a
//!   catalog through a cache/release/live/embedded fallback chain
//!   ([`FontDataResolver`]) and install families into a local asset tree
//!   with generated scss snippets.

pub mod catalog;
pub mod config;
pub mod download;
pub mod naming;
pub mod ratelimit;
pub mod resolver;
pub mod source;
pub mod stylesheet;
pub mod variant;

pub use config::Config;
pub use resolver::{FontDataResolver, Tier};
