//! twinscan - find files with identical content.
//!
//! Usage:
//!   twinscan [PATH]                   Scan PATH (default: current directory)
//!   twinscan --min-size 4096 [PATH]   Ignore files smaller than 4 KiB
//!   twinscan --mode fast [PATH]       Use XXH3 instead of BLAKE3
//!   twinscan --format json [PATH]     Print the full result as JSON
//!   twinscan --help                   Show help

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use twinscan_analyze::{ProgressObserver, ScanEngine, ScanResult, ScanStatus};
use twinscan_core::{DEFAULT_BLOCK_SIZE, HashMode, ScanParams};
use twinscan_scan::ScanProgress;

#[derive(Parser)]
#[command(
    name = "twinscan",
    version,
    about = "Find files with identical content",
    long_about = "twinscan walks a directory tree and reports groups of files whose \
                  content is byte-for-byte identical.\n\n\
                  Files are only read when another file has the same size, so trees \
                  of mostly unique sizes are scanned without hashing."
)]
struct Cli {
    /// Directory to scan (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Read buffer size in bytes used while hashing
    #[arg(short, long, default_value_t = DEFAULT_BLOCK_SIZE.to_string())]
    block_size: String,

    /// Ignore files smaller than this many bytes
    #[arg(short, long, default_value = "0")]
    min_size: String,

    /// Content digest: fast (XXH3-64) or strong (BLAKE3)
    #[arg(long, default_value = "strong")]
    mode: HashMode,

    /// Reject relative paths
    #[arg(long)]
    absolute: bool,

    /// Follow symbolic links to files
    #[arg(short = 'L', long)]
    follow_symlinks: bool,

    /// Skip hidden files and directories
    #[arg(long)]
    skip_hidden: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Milliseconds between progress lines on stderr
    #[arg(long, default_value = "1000")]
    interval_ms: u64,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();
    run(cli).await
}

/// Log to stderr, filtered by `RUST_LOG` (errors only by default).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let params = ScanParams::builder()
        .root(cli.path)
        .block_size(cli.block_size)
        .min_size(cli.min_size)
        .hash_mode(cli.mode)
        .require_absolute(cli.absolute)
        .follow_symlinks(cli.follow_symlinks)
        .include_hidden(!cli.skip_hidden)
        .build()
        .wrap_err("Invalid arguments")?;
    let config = params.validate().wrap_err("Invalid scan configuration")?;
    let min_size = config.min_size();

    eprintln!("Scanning {}...", config.root().display());

    let engine = ScanEngine::new();

    let cancel = engine.cancel_flag();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling scan");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let observer = ProgressObserver::new(engine.progress())
        .with_interval(Duration::from_millis(cli.interval_ms));
    let watcher = tokio::spawn(observer.watch(print_progress));

    let result = tokio::task::spawn_blocking(move || engine.run_config(&config))
        .await
        .wrap_err("Scan task failed")?;

    interrupt.abort();
    watcher.await.wrap_err("Progress task failed")?;

    match cli.format {
        OutputFormat::Text => print_report(&result, min_size),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    match result.status {
        ScanStatus::Completed => Ok(()),
        ScanStatus::Cancelled => {
            eprintln!("Scan cancelled, results are partial.");
            Ok(())
        }
        ScanStatus::Aborted { message } => Err(eyre!(message)),
    }
}

fn print_progress(progress: &ScanProgress) {
    eprintln!(
        "Total scanned size (still counting): {}",
        format_size(progress.total_size)
    );
}

/// Print the three report sections: identical files, problems, ignored files.
fn print_report(result: &ScanResult, min_size: u64) {
    println!();
    println!("{}", "─".repeat(70));
    println!(" Duplicate File Report");
    println!("{}", "─".repeat(70));
    println!(
        " Scanned {} files ({}) in {:.2}s, hashed {} with {}",
        result.files_scanned,
        format_size(result.total_size),
        result.scan_duration.as_secs_f64(),
        result.files_hashed,
        result.hash_mode
    );
    println!();

    println!(" Identical files");
    if result.groups.is_empty() {
        println!("   No duplicate files found.");
    } else {
        println!(
            "   Found {} groups ({} files), {} wasted",
            result.groups.len(),
            result.total_duplicate_files(),
            format_size(result.total_wasted_space())
        );
        println!();
        for (i, group) in result.groups.iter().enumerate() {
            println!(
                "   Group {} ({} files, {} each, {} wasted)",
                i + 1,
                group.count(),
                format_size(group.size),
                format_size(group.wasted_bytes)
            );
            for path in &group.paths {
                println!("     {}", path.display());
            }
        }
    }
    println!();

    println!(" Problems");
    if let Some(message) = result.fatal_error() {
        println!("   {message}");
    }
    if result.errors.is_empty() && result.fatal_error().is_none() {
        println!("   None.");
    }
    for error in &result.errors {
        println!("   {}: {}", error.path.display(), error.message);
    }
    println!();

    println!(" Ignored files (smaller than {})", format_size(min_size));
    if result.ignored.is_empty() {
        println!("   None.");
    }
    for path in &result.ignored {
        println!("   {}", path.display());
    }
    println!();
}

/// Format a byte count as a human-readable size.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
