//! Reclaims orphaned document entries, owner directories and expired archives.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use doclife::{DocumentConfig, DocumentManager, JsonOwnerStore, OwnerScope, ReclaimOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "reclaim-documents")]
#[command(about = "Clean up orphaned student and teacher documents")]
struct Cli {
    /// Storage root holding `documents/` and `archives/`
    #[arg(long, env = "DOCLIFE_ROOT", default_value = "storage")]
    root: PathBuf,
    /// Directory holding `eleve.json` / `enseignant.json` owner records (default: <root>/owners)
    #[arg(long, env = "DOCLIFE_OWNERS")]
    owners: Option<PathBuf>,
    /// JSON configuration overriding limits, catalog and retention
    #[arg(long, env = "DOCLIFE_CONFIG")]
    config: Option<PathBuf>,
    /// Owner kind to scan: eleve, enseignant or all
    #[arg(long = "type", default_value = "all")]
    scope: OwnerScope,
    /// Report what would be removed without changing anything
    #[arg(long)]
    dry_run: bool,
    /// Re-hash stored files and report checksum mismatches
    #[arg(long)]
    validate_integrity: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("doclife=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DocumentConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => DocumentConfig::default(),
    };
    let owners_dir = cli.owners.clone().unwrap_or_else(|| cli.root.join("owners"));

    let manager = DocumentManager::builder()
        .root(&cli.root)
        .with_config(config)
        .build()
        .context("building document manager")?;
    let owners = JsonOwnerStore::new(owners_dir);

    let options = ReclaimOptions {
        scope: cli.scope,
        dry_run: cli.dry_run,
        validate_integrity: cli.validate_integrity,
    };
    let report = manager.reclaim(&owners, options).await;

    let prefix = if cli.dry_run { "[dry-run] " } else { "" };
    for finding in &report.findings {
        println!("{prefix}{}", serde_json::to_string(finding)?);
    }
    println!(
        "{prefix}cleaned: {}, invalid: {}, failures: {}",
        report.cleaned, report.invalid, report.failures
    );

    Ok(())
}
