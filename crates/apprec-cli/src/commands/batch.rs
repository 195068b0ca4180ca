//! Batch processing command for a directory of receipt files.
//!
//! Each file is an independent unit of work: a parse or reconciliation
//! failure is logged and counted, never aborts the run. Receipts already in
//! the database (by order id) are skipped, so re-running over the same
//! mailbox export is idempotent.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use apprec_core::models::config::ApprecConfig;
use apprec_core::receipt_from_html;

use crate::store::ReceiptStore;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// SQLite database file (overrides config)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Directory to archive raw documents into (overrides config)
    #[arg(short, long)]
    archive_dir: Option<PathBuf>,
}

enum Ingest {
    Inserted,
    AlreadySeen,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::process::load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "html" | "htm")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} receipt files",
        style("ℹ").blue(),
        files.len()
    );

    let database = args
        .database
        .unwrap_or_else(|| config.storage.database_path.clone());
    let mut store = ReceiptStore::open(&database)?;

    let archive_dir = args.archive_dir.or_else(|| config.storage.archive_dir.clone());
    if let Some(dir) = &archive_dir {
        fs::create_dir_all(dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut inserted = 0usize;
    let mut skipped = 0usize;
    let mut failures: Vec<(PathBuf, String)> = Vec::new();

    for path in &files {
        match ingest_file(path, &mut store, archive_dir.as_deref(), &config) {
            Ok(Ingest::Inserted) => inserted += 1,
            Ok(Ingest::AlreadySeen) => {
                debug!("already ingested: {}", path.display());
                skipped += 1;
            }
            Err(e) => {
                warn!("failed to process {}: {e:#}", path.display());
                failures.push((path.clone(), format!("{e:#}")));
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        files.len(),
        start.elapsed()
    );
    println!(
        "   {} inserted, {} already seen, {} failed",
        style(inserted).green(),
        style(skipped).yellow(),
        style(failures.len()).red()
    );

    if !failures.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for (path, error) in &failures {
            println!("  - {}: {}", path.display(), error);
        }
    }

    Ok(())
}

fn ingest_file(
    path: &Path,
    store: &mut ReceiptStore,
    archive_dir: Option<&Path>,
    config: &ApprecConfig,
) -> anyhow::Result<Ingest> {
    let html = fs::read_to_string(path)?;
    let receipt = receipt_from_html(&html, &config.tax)?;

    if store.find(&receipt.order_id)?.is_some() {
        return Ok(Ingest::AlreadySeen);
    }

    let archived = match archive_dir {
        Some(dir) => {
            let dest = dir.join(receipt.archive_file_name());
            fs::copy(path, &dest)?;
            Some(dest)
        }
        None => None,
    };

    store.insert(&receipt, archived.as_deref().and_then(Path::to_str))?;
    debug!(
        order_id = %receipt.order_id,
        items = receipt.items.len(),
        "ingested receipt"
    );

    Ok(Ingest::Inserted)
}
