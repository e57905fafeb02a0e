//! CLI binary for docsift.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig`, runs one document through the pipeline and prints the
//! JSON envelope on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use docsift::{DocumentProcessor, PipelineConfig, PipelineOutcome};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Classify a PDF (pretty JSON on stdout)
  docsift resume.pdf

  # Images and office documents skip the page check
  docsift scan.png
  docsift cover_letter.docx

  # Stricter limits, different model
  docsift --max-pages 5 --max-size-mb 5 --model gpt-4o report.pdf

  # One-line JSON for scripting
  docsift --compact --quiet invoice.pdf | jq .analysis.doc_type

OUTPUT:
  {"success": true, "file_path": …, "file_size_mb": …, "content_length": …,
   "tokens_used": …, "analysis": {"doc_type": …, "lang_type": …, "summary": …}}
  or
  {"error": "…"}

  Exit status is 0 for a success envelope and 1 for an error envelope.

ENVIRONMENT VARIABLES:
  LLAMA_CLOUD_API_KEY     LlamaParse API key (required for extraction)
  GITHUB_TOKEN            LLM key for GitHub Models (default endpoint)
  OPENAI_API_KEY          LLM key fallback when GITHUB_TOKEN is unset
  DOCSIFT_LLM_BASE_URL    OpenAI-compatible endpoint
  DOCSIFT_MODEL           Model ID
  PDFIUM_LIB_PATH         pdfium shared library (file or directory)

  A .env file in the working directory is loaded first.
"#;

/// Validate, extract and classify a document.
#[derive(Parser, Debug)]
#[command(
    name = "docsift",
    version,
    about = "Validate a document, extract its text with LlamaParse and classify it with an LLM",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document to process (PDF, image or office format).
    input: PathBuf,

    /// Maximum PDF page count.
    #[arg(long, env = "DOCSIFT_MAX_PAGES", default_value_t = 10)]
    max_pages: usize,

    /// Maximum file size in MB.
    #[arg(long, env = "DOCSIFT_MAX_SIZE_MB", default_value_t = 10)]
    max_size_mb: u64,

    /// Chat-completion model ID.
    #[arg(long, env = "DOCSIFT_MODEL", default_value = docsift::config::DEFAULT_MODEL)]
    model: String,

    /// OpenAI-compatible base URL (`/chat/completions` is appended).
    #[arg(long, env = "DOCSIFT_LLM_BASE_URL", default_value = docsift::config::DEFAULT_LLM_BASE_URL)]
    llm_base_url: String,

    /// LlamaParse API base URL.
    #[arg(long, env = "DOCSIFT_PARSE_BASE_URL", default_value = docsift::config::DEFAULT_PARSE_BASE_URL)]
    parse_base_url: String,

    /// Document language hint for the parser.
    #[arg(long, env = "DOCSIFT_LANGUAGE", default_value = "en")]
    language: String,

    /// Leading characters of extracted text sent to the model.
    #[arg(long, env = "DOCSIFT_CHAR_LIMIT", default_value_t = 4000)]
    char_limit: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "DOCSIFT_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "DOCSIFT_MAX_TOKENS", default_value_t = 500)]
    max_tokens: u32,

    /// LLM request timeout in seconds.
    #[arg(long, env = "DOCSIFT_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Whole parse-job timeout in seconds.
    #[arg(long, env = "DOCSIFT_PARSE_TIMEOUT", default_value_t = 300)]
    parse_timeout: u64,

    /// LlamaParse API key.
    #[arg(long, env = "LLAMA_CLOUD_API_KEY", hide_env_values = true)]
    parse_api_key: Option<String>,

    /// Print the envelope on one line.
    #[arg(long, env = "DOCSIFT_COMPACT")]
    compact: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCSIFT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the envelope.
    #[arg(short, long, env = "DOCSIFT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
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

    // ── Build processor ──────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let processor = DocumentProcessor::new(config).context("Failed to initialise pipeline")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let spinner = (!cli.quiet).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(format!("Processing {}", cli.input.display()));
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let outcome = processor.process(&cli.input).await;

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    let json = if cli.compact {
        serde_json::to_string(&outcome)
    } else {
        serde_json::to_string_pretty(&outcome)
    }
    .context("Failed to serialise result")?;
    println!("{json}");

    if !cli.quiet {
        print_summary(&outcome);
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Map CLI args to `PipelineConfig`.
fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder()
        .max_pages(cli.max_pages)
        .max_size_mb(cli.max_size_mb)
        .model(cli.model.clone())
        .llm_base_url(cli.llm_base_url.clone())
        .parse_base_url(cli.parse_base_url.clone())
        .language(cli.language.clone())
        .analysis_char_limit(cli.char_limit)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .api_timeout_secs(cli.api_timeout)
        .parse_timeout_secs(cli.parse_timeout);

    if let Some(ref key) = cli.parse_api_key {
        builder = builder.parse_api_key(key.clone());
    }

    let config = builder.build().context("Invalid configuration")?;
    Ok(config.with_env_credentials())
}

fn print_summary(outcome: &PipelineOutcome) {
    match outcome {
        PipelineOutcome::Success(r) => eprintln!(
            "{} {} ({})  {}",
            green("✔"),
            r.analysis.doc_type,
            r.analysis.lang_type,
            dim(&format!(
                "{} chars, {:.2}MB, {} tokens",
                r.content_length, r.file_size_mb, r.tokens_used
            )),
        ),
        PipelineOutcome::Error { error } => eprintln!("{} {}", red("✘"), error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_flow_into_config() {
        let cli = Cli::parse_from([
            "docsift",
            "--max-pages",
            "7",
            "--max-size-mb",
            "3",
            "--char-limit",
            "1000",
            "--parse-api-key",
            "llx-test",
            "doc.pdf",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.max_pages, 7);
        assert_eq!(config.max_size_mb, 3);
        assert_eq!(config.analysis_char_limit, 1000);
        assert_eq!(config.parse_api_key.as_deref(), Some("llx-test"));
    }

    #[test]
    fn zero_page_limit_is_rejected() {
        let cli = Cli::parse_from(["docsift", "--max-pages", "0", "doc.pdf"]);
        assert!(build_config(&cli).is_err());
    }
}
