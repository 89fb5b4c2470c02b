//! # Qwerty
//!
//! Opens a Python file, prints it with line numbers and syntax highlighting,
//! and optionally runs it.
//!
//! ```bash
//! # Show a file
//! cargo run -- path/to/script.py
//!
//! # Show it, then run it with the configured interpreter
//! cargo run -- path/to/script.py --run
//! ```

mod render;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crossterm::tty::IsTty;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use qwerty_core::{Config, Editor};

/// Qwerty - a small Python editor core
#[derive(Parser, Debug)]
#[command(name = "qwerty")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to open
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Run the file after printing it
    #[arg(short, long)]
    run: bool,

    /// Config file to use instead of the default location
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print without colors
    #[arg(long)]
    no_color: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    // RUST_LOG wins over -v when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_ascii_lowercase()));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(filter)
        .init();

    tracing::info!("Starting Qwerty v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load(),
    };

    let mut editor = Editor::with_config(config);
    editor
        .open_file(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;

    for warning in editor.document()?.warnings() {
        tracing::warn!("{}", warning);
    }

    let stdout = std::io::stdout();
    let color = !args.no_color && stdout.is_tty();
    render::render_document(&editor, &mut stdout.lock(), color)?;

    if args.run {
        let handle = editor.run_current()?;
        let outcome = handle.wait().await;
        if !outcome.is_success() {
            anyhow::bail!("{}: {}", args.file.display(), outcome);
        }
    }

    Ok(())
}
