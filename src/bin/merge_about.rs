//! One-time merge of the legacy per-locale about export into multi-locale items
//!
//! Usage:
//!   cargo run --bin merge-about -- data/about_export.json                 # Print merged JSON
//!   cargo run --bin merge-about -- data/about_export.json --out out.json  # Write merged JSON
//!   cargo run --bin merge-about -- data/about_export.json --apply         # Insert into database
//!
//! Required environment variables (only with --apply):
//! - DATABASE_URL

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};
use marine_site::{db::Database, migration};

struct Args {
    export: PathBuf,
    out: Option<PathBuf>,
    apply: bool,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut export = None;
    let mut out = None;
    let mut apply = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--apply" => apply = true,
            "--out" => {
                let path = iter.next().context("--out requires a path")?;
                out = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => bail!("Unknown flag: {}", flag),
            path if export.is_none() => export = Some(PathBuf::from(path)),
            extra => bail!("Unexpected argument: {}", extra),
        }
    }

    Ok(Args {
        export: export.context("Usage: merge-about <export.json> [--out merged.json] [--apply]")?,
        out,
        apply,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("merge_about=info".parse()?)
                .add_directive("marine_site=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let args = parse_args(&args)?;

    let rows = migration::load_export(&args.export)?;
    info!("Loaded {} legacy rows from {}", rows.len(), args.export.display());

    let outcome = migration::merge_legacy_about(rows);
    for failure in &outcome.failures {
        warn!("Group '{}' not merged: {}", failure.key, failure.error);
    }

    match &args.out {
        Some(path) => {
            migration::write_merged(path, &outcome.merged)?;
            info!("✓ Wrote {} merged items to {}", outcome.merged.len(), path.display());
        }
        None if !args.apply => {
            let json = serde_json::to_string_pretty(&outcome.merged)?;
            println!("{json}");
        }
        None => {}
    }

    if args.apply {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
        let db = Database::new(&database_url).await?;

        let mut inserted = 0usize;
        let mut failed = 0usize;
        for item in &outcome.merged {
            match db.insert_about_item(item).await {
                Ok(id) => {
                    inserted += 1;
                    info!("Inserted about item {} (legacy id {})", id, item.id);
                }
                Err(e) => {
                    failed += 1;
                    warn!("Failed to insert legacy id {}: {:#}", item.id, e);
                }
            }
        }
        info!("✓ Inserted {} items, {} insert failures", inserted, failed);
    }

    info!(
        "Summary: {} groups, {} merged, {} failed",
        outcome.group_count(),
        outcome.merged.len(),
        outcome.failures.len()
    );

    Ok(())
}
