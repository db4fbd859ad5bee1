//! Catalog build and validation subcommands.

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;
use tracing::info;

use fontgrab_core::catalog::{CatalogBuilder, CatalogValidator};
use fontgrab_core::Config;

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// Build a catalog by scanning the google/fonts repository
    ///
    /// A full scan issues thousands of API calls and takes a while even
    /// with a token; use --max-fonts for a quick partial build.
    Build {
        /// Output path for the catalog document
        #[clap(long, default_value = "google_fonts_catalog.json")]
        output: PathBuf,

        /// Limit the scan to this many families per license category
        #[clap(long)]
        max_fonts: Option<usize>,

        /// GitHub API token (defaults to the GITHUB_TOKEN environment variable)
        #[clap(long)]
        github_token: Option<String>,
    },

    /// Validate a catalog document
    Validate {
        /// Path of the catalog to check
        catalog: PathBuf,

        /// Treat warnings as failures
        #[clap(long)]
        strict: bool,
    },
}

pub async fn run(command: CatalogCommand, config: &Config) -> Result<()> {
    match command {
        CatalogCommand::Build {
            output,
            max_fonts,
            github_token,
        } => build(config, output, max_fonts, github_token).await,
        CatalogCommand::Validate { catalog, strict } => validate(&catalog, strict),
    }
}

async fn build(
    config: &Config,
    output: PathBuf,
    max_fonts: Option<usize>,
    github_token: Option<String>,
) -> Result<()> {
    let mut config = config.clone();
    if github_token.is_some() {
        config.github_token = github_token;
    }
    if config.github_token.is_none() {
        eprintln!("Warning: no GitHub token; unauthenticated API limits will slow the build.");
    }

    let mut builder = CatalogBuilder::from_config(&config)?;
    let catalog = builder.build(max_fonts).await;

    std::fs::write(&output, catalog.to_json_pretty()?)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let stats = builder.stats();
    info!(path = %output.display(), "Catalog written");
    println!(
        "Wrote {} families ({} variants) to {}",
        catalog.meta.total_families,
        catalog.meta.total_variants,
        output.display()
    );
    println!(
        "Scanned {} directories, {} failed, {} name collisions",
        stats.families_seen, stats.failed_families, stats.collisions
    );
    println!(
        "API calls: {} repository, {} metadata, {} stylesheet",
        catalog.meta.api_calls.github, catalog.meta.api_calls.metadata, catalog.meta.api_calls.css2
    );
    Ok(())
}

fn validate(catalog: &PathBuf, strict: bool) -> Result<()> {
    let report = CatalogValidator::from_path(catalog)?.validate();

    println!(
        "{}: {} families, {} variants",
        catalog.display(),
        report.family_count,
        report.variant_count
    );

    for error in &report.errors {
        println!("  error: {error}");
    }
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }

    if report.passed(strict) {
        println!(
            "Validation passed ({} warnings)",
            report.warnings.len()
        );
        Ok(())
    } else {
        println!(
            "Validation FAILED: {} errors, {} warnings",
            report.errors.len(),
            report.warnings.len()
        );
        std::process::exit(1);
    }
}
