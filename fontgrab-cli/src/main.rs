//! fontgrab - offline-friendly Google Fonts downloader
//!
//! Main entry point: catalog resolution, search, download and scss
//! generation, plus the catalog build/validate tooling.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fontgrab_core::catalog::Catalog;
use fontgrab_core::download::{FontInstaller, InstallOutcome};
use fontgrab_core::resolver::UpdateOutcome;
use fontgrab_core::{stylesheet, Config, FontDataResolver, Tier};

mod catalog_cli;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "fontgrab",
    about = "Download Google Fonts for offline use, with scss snippets",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Log level for diagnostic output (logs go to stderr)
    #[clap(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Override the catalog cache directory
    #[clap(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Override the asset output directory (default: ./assets)
    #[clap(long, global = true)]
    assets_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the catalog for font families
    Search {
        /// Substring to match against family names
        query: String,

        /// Maximum number of results
        #[clap(long, default_value = "10")]
        limit: usize,

        /// List every variant token instead of a count
        #[clap(long)]
        details: bool,

        /// Output results as JSON
        #[clap(long)]
        json: bool,
    },

    /// Download one or more font families into the asset tree
    Download {
        /// Family names (quoted if they contain spaces)
        names: Vec<String>,

        /// Read additional family names from a file, one per line
        #[clap(long)]
        file: Option<PathBuf>,

        /// Re-download even when the family is already installed
        #[clap(long)]
        force: bool,
    },

    /// Download the most popular families from the catalog
    DownloadAll {
        /// How many families to install, in catalog order
        #[clap(long, default_value = "100")]
        limit: usize,

        /// Re-download families that are already installed
        #[clap(long)]
        force: bool,
    },

    /// Refresh the cached catalog from the release or live API
    UpdateCatalog {
        /// GitHub repository publishing catalog releases (owner/name)
        #[clap(long)]
        repo: Option<String>,

        /// Refresh even when the cache is recent
        #[clap(long)]
        force: bool,
    },

    /// Print the scss snippet for a family without downloading it
    Scss {
        /// Family name
        name: String,
    },

    /// Catalog build and validation tooling
    Catalog {
        #[clap(subcommand)]
        command: catalog_cli::CatalogCommand,
    },
}

fn initialize_tracing(log_level: &LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // logs to stderr, results to stdout
        .init();
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.cache_dir {
        Some(dir) => Config::with_cache_dir(dir.clone()),
        None => Config::new()?,
    };
    if let Some(dir) = &cli.assets_dir {
        config = config.with_assets_dir(dir.clone());
    }
    Ok(config)
}

async fn resolve_catalog(config: &Config) -> Result<(Catalog, Tier)> {
    let mut resolver = FontDataResolver::new(config)?;
    let (catalog, tier) = resolver.resolve().await;
    match tier {
        Tier::Cache => {}
        Tier::Embedded => warn!(
            "All catalog sources are unreachable; only the {} embedded families are available",
            catalog.family_count()
        ),
        _ => info!(%tier, families = catalog.family_count(), "Catalog resolved"),
    }
    Ok((catalog, tier))
}

#[derive(Tabled)]
struct SearchRow {
    #[tabled(rename = "Family")]
    family: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Variants")]
    variants: String,
}

fn search_rows(matches: &[&fontgrab_core::catalog::CatalogItem], details: bool) -> Vec<SearchRow> {
    matches
        .iter()
        .map(|item| SearchRow {
            family: item.family.clone(),
            category: item.category.clone(),
            variants: if details {
                item.variants.join(", ")
            } else {
                item.variants.len().to_string()
            },
        })
        .collect()
}

fn run_search(catalog: &Catalog, query: &str, limit: usize, details: bool, json: bool) -> Result<()> {
    let matches = catalog.search(query, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No families match '{query}'.");
        return Ok(());
    }

    let rows = search_rows(&matches, details);

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    println!("{table}");
    Ok(())
}

async fn run_download(
    config: &Config,
    catalog: &Catalog,
    names: Vec<String>,
    force: bool,
) -> Result<()> {
    if names.is_empty() {
        bail!("No font families given");
    }
    let names = dedup_names(names);

    let mut installer = FontInstaller::new(config)?;
    let mut installed = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for name in &names {
        match installer.install_family(name, catalog, force).await {
            Ok(InstallOutcome::Installed(summary)) => {
                installed += 1;
                println!(
                    "Installed {} ({} web files, {} repo files) -> {}",
                    summary.family,
                    summary.web_files,
                    summary.repo_files,
                    summary.scss_path.display()
                );
            }
            Ok(InstallOutcome::AlreadyInstalled { family }) => {
                skipped += 1;
                println!("{family} is already installed (use --force to refresh)");
            }
            Err(err) => {
                failed += 1;
                eprintln!("Failed to install {name}: {err:#}");
            }
        }
    }

    println!("\n{installed} installed, {skipped} already present, {failed} failed");
    if installed > 0 {
        println!(
            "Asset tree now holds {} files under {}",
            installer.installed_files().len(),
            config.assets_dir.display()
        );
    }
    if failed == names.len() {
        bail!("Every requested download failed");
    }
    Ok(())
}

/// Drop repeated family names, case-insensitively, keeping first-seen
/// order. Repeats are common when a name list file overlaps the
/// positional arguments.
fn dedup_names(names: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.to_lowercase()))
        .collect()
}

fn read_names_file(path: &PathBuf) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read name list: {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_level);
    let config = build_config(&cli)?;

    match cli.command {
        Command::Search {
            query,
            limit,
            details,
            json,
        } => {
            let (catalog, _) = resolve_catalog(&config).await?;
            run_search(&catalog, &query, limit, details, json)?;
        }

        Command::Download { names, file, force } => {
            let mut names = names;
            if let Some(path) = &file {
                names.extend(read_names_file(path)?);
            }
            let (catalog, _) = resolve_catalog(&config).await?;
            run_download(&config, &catalog, names, force).await?;
        }

        Command::DownloadAll { limit, force } => {
            let (catalog, _) = resolve_catalog(&config).await?;
            let names: Vec<String> = catalog
                .items
                .iter()
                .take(limit)
                .map(|item| item.family.clone())
                .collect();
            run_download(&config, &catalog, names, force).await?;
        }

        Command::UpdateCatalog { repo, force } => {
            let mut config = config;
            if let Some(repo) = repo {
                config.catalog_repo = repo;
            }
            let mut resolver = FontDataResolver::new(&config)?;
            match resolver.update_catalog(force).await? {
                UpdateOutcome::AlreadyFresh => {
                    println!("Cached catalog is less than an hour old; use --force to refresh.");
                }
                UpdateOutcome::Updated { families } => {
                    println!("Catalog updated: {families} families cached.");
                }
            }
        }

        Command::Scss { name } => {
            let (catalog, _) = resolve_catalog(&config).await?;
            let Some(item) = catalog.find_family(&name) else {
                bail!("Font family not found in catalog: {name}");
            };
            print!(
                "{}",
                stylesheet::scss_snippet_from_tokens(&item.family, &item.variants)
            );
        }

        Command::Catalog { command } => {
            catalog_cli::run(command, &config).await?;
        }
    }

    Ok(())
}
