//! `trellis` - translation key sync and template checks for trellis projects.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use trellis::{Assembler, DiskTree, Options};

mod extract;
mod sync;

#[derive(Parser)]
#[command(name = "trellis", about = "Translation and template tooling for trellis")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Add keys used by templates (and optionally Rust sources) to a translation file
    Sync {
        /// Templates root, e.g. ./templates
        #[arg(long)]
        path: PathBuf,

        /// Target language code; the file is <path>/translations/<lang>.json
        #[arg(long)]
        lang: String,

        /// Also scan *.rs files under this directory (default: .)
        #[arg(long, num_args = 0..=1, default_missing_value = ".")]
        src: Option<PathBuf>,
    },

    /// Assemble the templates and list every view and email
    Check {
        /// Templates root, e.g. ./templates
        #[arg(long)]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Sync { path, lang, src } => cmd_sync(&path, &lang, src.as_deref()),
        Cmd::Check { path } => cmd_check(&path),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_sync(root: &Path, lang: &str, src: Option<&Path>) -> Result<()> {
    let mut keys = extract::scan_templates(root).context("scan templates")?;
    if keys.is_empty() {
        info!(path = %root.display(), "no translation calls found in templates");
    }

    if let Some(src) = src {
        keys.extend(extract::scan_sources(src).context("scan sources")?);
    }

    let file = sync::translation_file(root, lang);
    let added = sync::sync_file(&file, &keys).context("sync translation file")?;
    info!(file = %file.display(), keys = keys.len(), added, "translations synced");
    Ok(())
}

fn cmd_check(root: &Path) -> Result<()> {
    // The tree is rooted at the templates directory itself.
    let bundle = Assembler::new(Options::new().root(""))
        .assemble(DiskTree::new(root))
        .with_context(|| format!("assemble {}", root.display()))?;

    for key in bundle.view_keys() {
        println!("view  {key}");
    }
    for key in bundle.email_keys() {
        println!("email {key}");
    }
    Ok(())
}
