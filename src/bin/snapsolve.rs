//! CLI binary for snapsolve.
//!
//! A thin shim over the library crate: `serve` runs the web endpoint,
//! `solve` recognizes and solves a local image file in one shot.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use snapsolve::{solve_request, SolveConfig};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the web endpoint on the default port
  snapsolve serve

  # Bind a specific host/port
  snapsolve serve --host 0.0.0.0 --port 8080

  # Recognize and solve a photo locally
  snapsolve solve equation.png

  # Machine-readable output
  snapsolve solve equation.png --json

  # Point at a non-standard tesseract install
  snapsolve solve equation.png --tesseract /opt/tesseract/bin/tesseract

ENVIRONMENT VARIABLES:
  SNAPSOLVE_TESSERACT   Path to the tesseract binary (skips the probe)
  RUST_LOG              Tracing filter override (e.g. snapsolve=debug)

SETUP:
  1. Install tesseract:   apt install tesseract-ocr   (or brew install tesseract)
  2. Run the server:      snapsolve serve
  3. Open:                http://127.0.0.1:5000/
"#;

/// Solve handwritten math from images.
#[derive(Parser, Debug)]
#[command(
    name = "snapsolve",
    version,
    about = "Solve handwritten math from images via OCR",
    long_about = "Recognize a handwritten or typed math expression in an image, repair the \
OCR output into a valid algebraic string, and evaluate it or solve it as an equation. \
Recognition is delegated to the tesseract binary.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to the tesseract binary (default: probe well-known paths, then PATH).
    #[arg(long, global = true, env = "SNAPSOLVE_TESSERACT")]
    tesseract: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "SNAPSOLVE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, global = true, env = "SNAPSOLVE_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web endpoint (drawing page + POST /solve).
    Serve {
        /// Address to bind.
        #[arg(long, env = "SNAPSOLVE_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to bind.
        #[arg(short, long, env = "SNAPSOLVE_PORT", default_value_t = 5000)]
        port: u16,
    },

    /// Recognize and solve a single image file, then exit.
    Solve {
        /// PNG or JPEG image containing one expression or equation.
        image: PathBuf,

        /// Print the raw {"expression", "result"} JSON payload.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Config (one-time recognizer probe) ───────────────────────────────
    let config = match &cli.tesseract {
        Some(path) => SolveConfig::builder()
            .tesseract_cmd(path.clone())
            .build()
            .context("Invalid configuration")?,
        None => SolveConfig::detect(),
    };

    match cli.command {
        Command::Serve { host, port } => {
            if !config.recognizer_available() && !cli.quiet {
                eprintln!(
                    "{} tesseract not found — /solve will answer with the install hint",
                    red("⚠")
                );
            }
            let addr: SocketAddr = format!("{host}:{port}")
                .parse()
                .with_context(|| format!("Invalid bind address {host}:{port}"))?;
            if !cli.quiet {
                eprintln!("{} http://{addr}/", bold("Serving on"));
            }
            snapsolve::run(config, addr).await.context("Server failed")?;
        }

        Command::Solve { image, json } => {
            let bytes = std::fs::read(&image)
                .with_context(|| format!("Failed to read {}", image.display()))?;
            let payload = STANDARD.encode(&bytes);

            let spinner = if !cli.quiet && !json {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::with_template("{spinner:.cyan} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar.set_message("Recognizing…");
                bar.enable_steady_tick(Duration::from_millis(80));
                Some(bar)
            } else {
                None
            };

            let reply = solve_request(&config, &payload).await;

            if let Some(bar) = spinner {
                bar.finish_and_clear();
            }

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&reply).context("Failed to serialize reply")?
                );
            } else if reply.expression.is_empty() {
                eprintln!("{} {}", red("✗"), reply.result);
                std::process::exit(1);
            } else {
                println!(
                    "{} {}  {}  {}",
                    green("✔"),
                    reply.expression,
                    dim("→"),
                    bold(&reply.result)
                );
            }
        }
    }

    Ok(())
}
