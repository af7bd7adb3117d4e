//! `webassets extract` — extract asset modules into a target directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use webassets_sync::CacheLayout;
use webassets_webjars::{extract, DirNamespace, ExtractOptions, NameFilter};

/// Arguments for `webassets extract`.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Root directory containing one subdirectory per asset module.
    pub source: PathBuf,

    /// Target directory to extract into.
    pub dest: PathBuf,

    /// Module name pattern to include (`*` wildcards; repeatable).
    /// No include patterns means "all modules".
    #[arg(long)]
    pub include: Vec<String>,

    /// Module name pattern to exclude (takes precedence over include).
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Library folder name modules land under, relative to <dest>.
    #[arg(long, default_value = "lib")]
    pub lib_dir: String,

    /// Cache directory (defaults to `<dest>/.webassets-cache`).
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

impl ExtractArgs {
    pub fn run(self) -> Result<()> {
        let cache_dir = self
            .cache_dir
            .unwrap_or_else(|| self.dest.join(".webassets-cache"));
        let cache = CacheLayout::open(&cache_dir)
            .with_context(|| format!("cannot open cache at {}", cache_dir.display()))?;

        let namespace = DirNamespace::new(&self.source);
        let filter = NameFilter::new(self.include, self.exclude);
        let options = ExtractOptions {
            lib_dir: self.lib_dir,
        };

        let report = extract(&namespace, &filter, &options, &cache, &self.dest)
            .with_context(|| format!("extraction into {} failed", self.dest.display()))?;

        println!(
            "{} extracted {} module(s) into {} ({} written, {} deleted, {} unchanged)",
            "✓".green(),
            report.modules.len(),
            report.dest_root.display(),
            report.outcome.copied.len(),
            report.outcome.deleted.len(),
            report.outcome.unchanged.len(),
        );
        for module in &report.modules {
            println!("  · {module}");
        }
        for (module, err) in &report.failures {
            eprintln!("  {} {module}: {err}", "✗".red());
        }

        cache.close();
        if report.is_ok() {
            Ok(())
        } else {
            anyhow::bail!("{} module(s) failed to extract", report.failures.len())
        }
    }
}
