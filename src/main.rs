//! jackc - batch driver for the Jack-to-VM compiler.
//!
//! Discovers `.jack` compilation units, compiles each one independently
//! (and in parallel), and writes a `.vm` file beside every source that
//! compiles. A failing unit is reported and skipped; the other units
//! still complete.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use rayon::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walkdir::WalkDir;

/// jackc - compile Jack classes to Hack VM code
#[derive(Parser, Debug)]
#[command(name = "jackc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// A .jack file, or a directory to scan for .jack files
    input: PathBuf,

    /// Report each compiled unit
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let units = discover_units(&cli.input)?;
    if units.is_empty() {
        bail!("no .jack files under {}", cli.input.display());
    }
    tracing::info!(count = units.len(), "discovered compilation units");

    // Units share no mutable state, so they compile in parallel.
    let failures: usize = units
        .par_iter()
        .map(|path| match compile_file(path) {
            Ok(out_path) => {
                if cli.verbose {
                    println!("{} {}", "compiled".green(), out_path.display());
                }
                0
            }
            Err(err) => {
                eprintln!("{} {}: {}", "error:".red().bold(), path.display(), err);
                1
            }
        })
        .sum();

    if failures > 0 {
        eprintln!("{} unit(s) failed", failures);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Collects the `.jack` units named by `input`, in a stable order.
fn discover_units(input: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if input.is_dir() {
        let mut units = Vec::new();
        for entry in WalkDir::new(input) {
            let entry = entry?;
            if entry.file_type().is_file() && has_jack_extension(entry.path()) {
                units.push(entry.into_path());
            }
        }
        units.sort();
        Ok(units)
    } else if has_jack_extension(input) {
        Ok(vec![input.to_path_buf()])
    } else {
        bail!("{} is not a .jack file", input.display());
    }
}

fn has_jack_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "jack")
}

/// Compiles one unit into memory, persisting `<name>.vm` beside the source
/// only on success so a failed unit leaves no partial file behind.
fn compile_file(path: &Path) -> anyhow::Result<PathBuf> {
    let source =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let mut buffer = Vec::new();
    jackc_core::compile_unit(&source, &mut buffer)?;

    let out_path = path.with_extension("vm");
    fs::write(&out_path, buffer).with_context(|| format!("writing {}", out_path.display()))?;
    Ok(out_path)
}
