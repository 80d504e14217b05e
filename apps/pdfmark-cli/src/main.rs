//! Command-line front end for PDF bookmark import/export.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "pdfmark")]
#[command(version, about = "Export and import PDF bookmarks as tab-indented text")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a PDF's bookmarks to a text file
    Export {
        /// Source PDF
        input: PathBuf,

        /// Output text file (defaults to <input>.bookmarks.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Add bookmarks from a text file to a copy of a PDF
    Import {
        /// Source PDF
        input: PathBuf,

        /// Bookmark text file
        bookmarks: PathBuf,

        /// Output PDF (defaults to <input stem>_bookmark.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    match args.command {
        Command::Export { input, output } => export(&input, output),
        Command::Import {
            input,
            bookmarks,
            output,
        } => import(&input, &bookmarks, output),
    }
}

fn export(input: &Path, output: Option<PathBuf>) -> anyhow::Result<()> {
    let output = output.unwrap_or_else(|| input.with_extension("bookmarks.txt"));

    let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let text = pdfmark_core::export_bookmarks(&bytes)?;
    fs::write(&output, text).with_context(|| format!("writing {}", output.display()))?;

    tracing::info!(
        "Exported bookmarks from {} to {}",
        input.display(),
        output.display()
    );
    Ok(())
}

fn import(input: &Path, bookmarks: &Path, output: Option<PathBuf>) -> anyhow::Result<()> {
    let output = output.unwrap_or_else(|| default_import_output(input));

    let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let text = fs::read_to_string(bookmarks)
        .with_context(|| format!("reading {}", bookmarks.display()))?;
    let pdf = pdfmark_core::import_bookmarks(&bytes, &text)?;
    fs::write(&output, pdf).with_context(|| format!("writing {}", output.display()))?;

    tracing::info!(
        "Added bookmarks from {} to {}",
        bookmarks.display(),
        output.display()
    );
    Ok(())
}

fn default_import_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_bookmark.pdf"))
}
