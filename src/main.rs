//! blockindex - combine block definition files into one JSON index
//!
//! Reads every `*.json` file in a source directory, re-keys each record's
//! `parameters` list by lowercase parameter name, and writes all records
//! into a single JSON object keyed by file name.
//!
//! Exit codes:
//!   0 - Success (or skipped files without --fail-on-error)
//!   1 - Runtime error (missing source directory, unwritable output, bad config)
//!   2 - Some source files were skipped and --fail-on-error is set

mod aggregate;
mod cli;
mod config;
mod error;
mod indexer;
mod models;
mod report;
mod scanner;

use aggregate::{AggregateOptions, Aggregator};
use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config(&args.root);
    }

    init_logging(&args);

    debug!("blockindex v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Indexing failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .blockindex.toml.
fn handle_init_config(root: &Path) -> Result<()> {
    let path = root.join(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            path.display()
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(&path, &content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✅ Created {} with default settings.", path.display());
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` takes precedence when set.
fn init_logging(args: &Args) {
    let level = LevelFilter::from_level(args.log_level());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete indexing workflow. Returns exit code (0 or 2).
fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.resolve_paths(&args.root);

    let options = AggregateOptions {
        scan: scanner::ScanConfig::from(&config.index),
        collisions: config.index.collisions,
        show_progress: !args.quiet,
    };

    if args.dry_run {
        return handle_dry_run(&config.paths.source_dir, &options.scan);
    }

    info!(
        "Combining {} into {} (collisions: {})",
        config.paths.source_dir.display(),
        config.paths.output.display(),
        config.index.collisions
    );

    let summary = Aggregator::new(options).run(&config.paths.source_dir, &config.paths.output)?;

    if let Some(ref summary_path) = config.output.summary {
        report::write_json_summary(&summary, summary_path)?;
        info!("Run summary written to {}", summary_path.display());
    }

    if !args.quiet {
        println!("\n{}", report::generate_text_summary(&summary));
        println!(
            "✅ Combined JSON written to {}",
            config.paths.output.display()
        );
    }

    if config.output.fail_on_error && !summary.is_clean() {
        eprintln!(
            "\n⛔ {} source file(s) skipped. Failing (exit code 2).",
            summary.failures.len()
        );
        return Ok(2);
    }

    Ok(0)
}

/// Handle --dry-run: scan files, print what would be combined, exit.
fn handle_dry_run(source_dir: &Path, scan_config: &scanner::ScanConfig) -> Result<i32> {
    println!("\n🔍 Dry run: scanning {}...\n", source_dir.display());

    let files = scanner::SourceScanner::new(source_dir.to_path_buf(), scan_config.clone()).scan()?;

    if files.is_empty() {
        println!("   No matching source files found.");
    } else {
        println!("   Found {} files that would be combined:\n", files.len());
        for file in &files {
            println!("     📄 {} -> {}", file.file_name, file.key);
        }
    }

    println!("\n✅ Dry run complete. Nothing was written.");
    Ok(0)
}

/// Load configuration from file or use defaults.
///
/// A config file that exists but can't be parsed aborts the run.
fn load_config(args: &Args) -> Result<Config> {
    match args.config {
        Some(ref path) => info!("Loading config from: {}", path.display()),
        None if args.root.join(CONFIG_FILE_NAME).exists() => {
            info!("Loading config from {}", CONFIG_FILE_NAME)
        }
        None => debug!("No config file found, using defaults"),
    }

    Config::discover(args.config.as_deref(), &args.root)
}
