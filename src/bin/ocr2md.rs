//! CLI binary for ocr2md.
//!
//! A thin shim over the library crate that maps CLI flags to `OcrConfig` /
//! `ProcessOptions` and prints a summary of what was written.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ocr2md::{process_to_dir, Ocr2MdError, OcrConfig, OutputFormat, ProcessOptions};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion — writes document_ocr_results/document.md
  ocr2md document.pdf

  # Extract embedded images and link them from the markdown
  ocr2md --save-images document.pdf

  # Keep the raw API response alongside the markdown
  ocr2md --output-format both document.pdf

  # Raw JSON only, custom output directory
  ocr2md --output-format json -o ./out document.pdf

ENVIRONMENT VARIABLES:
  MISTRAL_API_KEY    Mistral API key (required; also read from a .env file)
  OCR2MD_MODEL       Override the OCR model ID
  OCR2MD_BASE_URL    Override the API endpoint

SETUP:
  1. Get an API key:  https://console.mistral.ai
  2. Export it:       export MISTRAL_API_KEY=...
  3. Convert:         ocr2md document.pdf
"#;

/// OCR PDF documents to Markdown using the Mistral OCR API.
#[derive(Parser, Debug)]
#[command(
    name = "ocr2md",
    version,
    about = "OCR PDF documents to Markdown using the Mistral OCR API",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file to process.
    pdf_path: PathBuf,

    /// Save images from the OCR results and link them from the markdown.
    #[arg(long)]
    save_images: bool,

    /// Which artefacts to write: markdown, json, or both.
    #[arg(long, value_enum, default_value = "markdown")]
    output_format: OutputFormatArg,

    /// Output directory (default: <stem>_ocr_results next to the working directory).
    #[arg(short, long, env = "OCR2MD_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// OCR model ID.
    #[arg(long, env = "OCR2MD_MODEL", default_value = "mistral-ocr-latest")]
    model: String,

    /// Mistral API key. Falls back to the MISTRAL_API_KEY environment variable.
    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API endpoint override.
    #[arg(long, env = "OCR2MD_BASE_URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "OCR2MD_TIMEOUT", default_value_t = 300)]
    timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "OCR2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "OCR2MD_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OutputFormatArg {
    Markdown,
    Json,
    Both,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(v: OutputFormatArg) -> Self {
        match v {
            OutputFormatArg::Markdown => OutputFormat::Markdown,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Both => OutputFormat::Both,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load a .env file when present, matching how the API key is usually kept.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner carries the user feedback; library logs stay at error
    // level unless -v is given.
    let filter = if cli.verbose { "debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    // Raised before any I/O; the error text names the variable.
    let api_key = match cli.api_key {
        Some(ref key) if !key.is_empty() => key.clone(),
        _ => {
            return Err(Ocr2MdError::MissingApiKey {
                var: ocr2md::config::API_KEY_VAR.to_string(),
            }
            .into());
        }
    };

    let mut config = OcrConfig::new(api_key)
        .with_model(&cli.model)
        .with_timeout_secs(cli.timeout);
    if let Some(ref base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }

    let options = ProcessOptions {
        save_images: cli.save_images,
        format: cli.output_format.into(),
        output_dir: cli.output_dir.clone(),
    };

    // ── Run ──────────────────────────────────────────────────────────────
    let spinner = if !cli.quiet && !cli.verbose {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(format!(
            "Running OCR on {} (this may take a while)…",
            cli.pdf_path.display()
        ));
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    } else {
        None
    };

    let outcome = process_to_dir(&cli.pdf_path, &config, &options).await;

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    let summary = outcome.context("Error processing PDF")?;

    // ── Summary ──────────────────────────────────────────────────────────
    if !cli.quiet {
        eprintln!(
            "{} {} pages processed in {:.1}s  →  {}",
            green("✔"),
            bold(&summary.page_count.to_string()),
            summary.duration_ms as f64 / 1000.0,
            bold(&summary.output_dir.display().to_string()),
        );
        if let Some(ref path) = summary.markdown_path {
            eprintln!("   markdown  {}", dim(&path.display().to_string()));
        }
        if let Some(ref path) = summary.json_path {
            eprintln!("   raw json  {}", dim(&path.display().to_string()));
        }
        if cli.save_images {
            eprintln!("   images    {}", dim(&summary.images_written.to_string()));
        }
    }

    Ok(())
}
