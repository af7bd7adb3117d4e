//! `webassets sync` — converge a target directory to match a mapping file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Deserialize;

use webassets_core::{PathMapping, Source};
use webassets_sync::{plan, sync, CacheLayout};

/// Arguments for `webassets sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Target directory to converge.
    pub dest: PathBuf,

    /// YAML mapping file: a list of `{source: <path>, target: <relative>}`
    /// entries; later entries override earlier ones for the same target.
    #[arg(long)]
    pub mappings: PathBuf,

    /// Cache directory (defaults to `<dest>/.webassets-cache`).
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Show what would change without touching the target.
    #[arg(long)]
    pub dry_run: bool,
}

/// One row of the YAML mapping file.
#[derive(Debug, Deserialize)]
struct MappingEntry {
    source: PathBuf,
    target: PathBuf,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let contents = std::fs::read_to_string(&self.mappings)
            .with_context(|| format!("cannot read mapping file {}", self.mappings.display()))?;
        let entries: Vec<MappingEntry> = serde_yaml::from_str(&contents)
            .with_context(|| format!("malformed mapping file {}", self.mappings.display()))?;

        let mappings = entries
            .into_iter()
            .map(|entry| PathMapping::new(Source::File(entry.source), entry.target))
            .collect::<Result<Vec<_>, _>>()
            .context("invalid mapping")?;

        let cache_dir = self
            .cache_dir
            .unwrap_or_else(|| self.dest.join(".webassets-cache"));
        let cache = CacheLayout::open(&cache_dir)
            .with_context(|| format!("cannot open cache at {}", cache_dir.display()))?;
        let manifest = cache.cache_path("sync", &self.dest);

        if self.dry_run {
            let planned = plan(&manifest, &mappings, &self.dest)
                .with_context(|| format!("planning sync of {} failed", self.dest.display()))?;
            if planned.is_noop() {
                println!("[dry-run] {} nothing to do", "✓".green());
            } else {
                println!(
                    "[dry-run] would copy {} and delete {} file(s)",
                    planned.copies.len(),
                    planned.deletes.len()
                );
                for target in &planned.copies {
                    println!("  ~  {}", target.display());
                }
                for target in &planned.deletes {
                    println!("  ✗  {}", target.display());
                }
            }
        } else {
            let outcome = sync(&manifest, &mappings, &self.dest)
                .with_context(|| format!("sync of {} failed", self.dest.display()))?;
            println!(
                "{} synced {} ({} written, {} deleted, {} unchanged)",
                "✓".green(),
                outcome.dest_root.display(),
                outcome.copied.len(),
                outcome.deleted.len(),
                outcome.unchanged.len(),
            );
            for target in &outcome.copied {
                println!("  ✎  {}", target.display());
            }
            for target in &outcome.deleted {
                println!("  ✗  {}", target.display());
            }
        }

        cache.close();
        Ok(())
    }
}
