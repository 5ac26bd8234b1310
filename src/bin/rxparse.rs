//! CLI binary for rx-parse.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AnalysisConfig` and prints the report.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rx_parse::{analyze, analyze_to_file, extract_only, AnalysisConfig, AnalysisOutput};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyse a prescription and print the report
  rxparse prescription.pdf

  # Export the enriched record as JSON
  rxparse prescription.pdf -o prescription_analysis.json

  # Scanned image input (goes straight to OCR)
  rxparse scan.jpg

  # Only extract the text, no LLM call (no GROQ_API_KEY needed)
  rxparse --extract-only prescription.pdf

  # Skip the per-medicine pharmacology lookups
  rxparse --no-enrich prescription.pdf

  # Raw structured output including stats
  rxparse --json prescription.pdf > output.json

ENVIRONMENT VARIABLES:
  GROQ_API_KEY        Groq API key (chat completions)
  OCR_SPACE_API_KEY   OCR.Space API key (only needed when OCR runs)

PIPELINE:
  PDFs are read via their embedded text layer first; when the layer holds
  fewer than --min-text-chars characters the document is treated as a scan,
  each page is rasterised at --dpi and sent to OCR.Space. JPG/JPEG/PNG
  inputs skip straight to OCR. The text is then parsed into a structured
  record by one LLM call, and each medicine gets one pharmacology lookup.
"#;

/// Extract structured prescription data from PDFs and scans.
#[derive(Parser, Debug)]
#[command(
    name = "rxparse",
    version,
    about = "Extract structured prescription data from PDFs and scans using OCR and LLMs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Prescription document: PDF, JPG/JPEG or PNG.
    input: String,

    /// Write the enriched record to this JSON file (2-space indentation).
    #[arg(short, long, env = "RXPARSE_OUTPUT")]
    output: Option<PathBuf>,

    /// Chat-completion model identifier.
    #[arg(long, env = "RXPARSE_MODEL", default_value = rx_parse::DEFAULT_MODEL)]
    model: String,

    /// Minimum text-layer length (chars) to accept a PDF without OCR.
    #[arg(long, env = "RXPARSE_MIN_TEXT_CHARS", default_value_t = rx_parse::DEFAULT_MIN_TEXT_CHARS)]
    min_text_chars: usize,

    /// Rasterisation DPI for the OCR fallback (72–600).
    #[arg(long, env = "RXPARSE_OCR_DPI", default_value_t = rx_parse::DEFAULT_OCR_DPI,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Skip the per-medicine pharmacology lookups.
    #[arg(long, env = "RXPARSE_NO_ENRICH")]
    no_enrich: bool,

    /// Max LLM output tokens per call.
    #[arg(long, env = "RXPARSE_MAX_TOKENS", default_value_t = 2048)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "RXPARSE_TEMPERATURE", default_value_t = 0.0)]
    temperature: f32,

    /// Per-HTTP-call timeout in seconds.
    #[arg(long, env = "RXPARSE_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Print extracted text and exit; no LLM call is made.
    #[arg(long)]
    extract_only: bool,

    /// Show the extracted text before the report.
    #[arg(long, env = "RXPARSE_SHOW_TEXT")]
    show_text: bool,

    /// Output the full analysis (record, text, stats) as JSON.
    #[arg(long, env = "RXPARSE_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "RXPARSE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "RXPARSE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the report itself.
    #[arg(short, long, env = "RXPARSE_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active; the
    // spinner provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    // ── Extract-only mode ────────────────────────────────────────────────
    if cli.extract_only {
        let text = extract_only(&cli.input, &config)
            .await
            .context("Extraction failed")?;
        println!("{text}");
        return Ok(());
    }

    // ── Run analysis ─────────────────────────────────────────────────────
    let spinner = if show_progress {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_message("Analyzing prescription…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    } else {
        None
    };

    let result = if let Some(ref output_path) = cli.output {
        analyze_to_file(&cli.input, output_path, &config).await
    } else {
        analyze(&cli.input, &config).await
    };

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    let output = result.context("Analysis failed")?;

    // ── Print results ────────────────────────────────────────────────────
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
        return Ok(());
    }

    if cli.show_text {
        eprintln!("{}", dim("── Extracted text ─────────────────────────────"));
        eprintln!("{}", output.extracted_text.trim_end());
        eprintln!("{}", dim("───────────────────────────────────────────────"));
        eprintln!();
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(rx_parse::report::render_record(&output.record).as_bytes())
        .context("Failed to write to stdout")?;
    drop(handle);

    print_summary(&cli, &output);

    Ok(())
}

/// Summary and warnings on stderr, keeping stdout clean for the report.
fn print_summary(cli: &Cli, output: &AnalysisOutput) {
    if cli.quiet {
        return;
    }

    for err in &output.enrichment_errors {
        eprintln!("{} {}", yellow("⚠"), err);
    }

    let s = &output.stats;
    eprintln!(
        "{}  {} via {}  —  {}/{} medicines enriched  —  {}ms",
        if s.enrichment_failures == 0 {
            green("✔")
        } else {
            yellow("⚠")
        },
        bold(&format!("{} chars", s.extracted_chars)),
        s.text_source,
        s.medicines_enriched,
        s.medicines_found,
        s.total_duration_ms,
    );
    eprintln!(
        "   {} tokens in  /  {} tokens out",
        dim(&s.total_input_tokens.to_string()),
        dim(&s.total_output_tokens.to_string()),
    );
    if let Some(ref path) = cli.output {
        eprintln!("   exported →  {}", bold(&path.display().to_string()));
    }
}

/// Map CLI args to `AnalysisConfig`.
fn build_config(cli: &Cli) -> Result<AnalysisConfig> {
    AnalysisConfig::builder()
        .model(cli.model.clone())
        .min_text_chars(cli.min_text_chars)
        .ocr_dpi(cli.dpi)
        .skip_enrichment(cli.no_enrich)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .api_timeout_secs(cli.api_timeout)
        .build()
        .context("Invalid configuration")
}
