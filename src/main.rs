//! Main entry point for the zipsearch CLI application.
//!
//! Thin presentation shell over the search library: collects the
//! archive location and search text, runs the engine, and renders
//! the matches and the summary report to the console.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use zipsearch::{Cli, HttpRangeReader, LocalFileReader, ReadAt, SearchEngine, SearchOutcome, ZipArchive};

/// Application entry point.
///
/// Parses command-line arguments and dispatches based on whether the
/// archive is a local file or an HTTP URL.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.is_http_url() {
        // Remote archive via HTTP Range requests
        let reader = HttpRangeReader::new(cli.archive.clone()).await?;
        let transferred_before = reader.transferred_bytes();
        let reader = Arc::new(reader);

        run(reader.clone(), &cli).await?;

        // Network transfer statistics for HTTP sources
        if !cli.is_quiet() {
            let transferred = reader.transferred_bytes() - transferred_before;
            eprintln!("\nTotal bytes transferred: {}", format_size(transferred));
        }
    } else {
        // Local archive
        let reader = Arc::new(LocalFileReader::open(Path::new(&cli.archive))?);
        run(reader, &cli).await?;
    }

    Ok(())
}

/// Open the archive and run list or search mode.
async fn run<R: ReadAt + 'static>(reader: Arc<R>, cli: &Cli) -> Result<()> {
    let archive = ZipArchive::open(reader).await?;

    // List mode: entry names only, no scan
    if cli.list {
        for entry in archive.entries() {
            println!("{}", entry.name);
        }
        return Ok(());
    }

    // `text` is required by clap unless --list was given
    let text = cli.text.as_deref().unwrap_or_default();
    let engine = SearchEngine::new(archive).with_chunk_size(cli.chunk_size);
    let outcome = engine.search(text).await?;

    render_matches(&outcome, cli);
    if !cli.is_quiet() {
        render_report(&cli.archive, &outcome);
    }

    Ok(())
}

/// Print matching lines grouped by entry, in archive order.
///
/// Very quiet mode (`-qq`) switches to a `entry:line:text` format
/// suitable for piping into other tools.
fn render_matches(outcome: &SearchOutcome, cli: &Cli) {
    if outcome.result.is_empty() {
        if !cli.is_very_quiet() {
            println!("No matches found.");
        }
        return;
    }

    for matches in outcome.result.iter() {
        if cli.is_very_quiet() {
            for line in &matches.lines {
                println!("{}:{}:{}", matches.entry_name, line.line_number, line.text);
            }
        } else {
            println!("- {}:", matches.entry_name);
            for line in &matches.lines {
                println!("  Line {}: {}", line.line_number, line.text);
            }
        }
    }
}

/// Print the summary report: archive size, entry counts, elapsed time.
fn render_report(archive_path: &str, outcome: &SearchOutcome) {
    let stats = &outcome.stats;
    println!("\nSearch Report");
    println!("  Archive:         {}", archive_path);
    println!("  Archive size:    {}", format_size(stats.archive_size));
    println!("  Entries scanned: {}", stats.entries_scanned);
    println!("  Entries matched: {}", stats.entries_matched);
    println!("  Elapsed:         {:.4} s", stats.elapsed_seconds());
}

/// Format a byte size into a human-readable string.
///
/// Automatically selects the appropriate unit (bytes, KB, MB, GB)
/// based on the size magnitude.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
