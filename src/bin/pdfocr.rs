//! CLI binary for pdf-ocr-parser.
//!
//! A thin shim over the library crate: `parse` maps flags to `OcrConfig` and
//! prints results, `serve` runs the HTTP service.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdf_ocr_parser::pipeline::input::sibling_path;
use pdf_ocr_parser::{
    export_images, format_bytes, parse, parse::write_atomic, results_file_name, OcrConfig,
    ParseProgressCallback, ParseResult, ParseStage, ProgressCallback,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
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
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one spinner whose prefix follows the current stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Reading");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ParseProgressCallback for CliProgressCallback {
    fn on_parse_start(&self, file_name: &str, size_bytes: usize) {
        self.bar
            .set_message(format!("{file_name} ({})", format_bytes(size_bytes as u64)));
    }

    fn on_stage_start(&self, stage: ParseStage) {
        self.bar.set_prefix(stage.label());
    }

    fn on_stage_complete(&self, stage: ParseStage) {
        self.bar
            .println(format!("  {} {}", green("✓"), dim(stage.label())));
    }

    fn on_parse_complete(&self, pages: usize, images: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages, {} images",
            green("✔"),
            bold(&pages.to_string()),
            bold(&images.to_string())
        );
    }

    fn on_parse_error(&self, error: &str) {
        self.bar.finish_and_clear();
        let msg = if error.chars().count() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };
        eprintln!("{} {}", red("✘"), red(&msg));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Parse to stdout (processed markdown, images inlined as data URLs)
  pdfocr parse invoice.pdf

  # Raw provider markdown, placeholders untouched
  pdfocr parse --raw invoice.pdf

  # Full JSON result, images written to a directory
  pdfocr parse --json --images-dir ./images paper.pdf > paper.json

  # Save the JSON result next to the input as paper_results.json
  pdfocr parse --save-results paper.pdf

  # Parse from URL
  pdfocr parse https://arxiv.org/pdf/1706.03762 -o attention.md

  # Run the HTTP service
  pdfocr serve --bind 127.0.0.1:8000

ENVIRONMENT VARIABLES:
  MISTRAL_API_KEY     Mistral API key (required)
  MISTRAL_BASE_URL    Override the API endpoint
  PDFOCR_MODEL        Override the OCR model
  RUST_LOG            tracing filter, e.g. pdf_ocr_parser=debug
"#;

/// Parse PDF files with the Mistral OCR API.
#[derive(Parser, Debug)]
#[command(
    name = "pdfocr",
    version,
    about = "Parse PDF files into Markdown and positioned images with Mistral OCR",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDFOCR_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDFOCR_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse one document and print or save the result.
    Parse(ParseArgs),
    /// Serve POST /api/parse-pdf over HTTP.
    #[cfg(feature = "server")]
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct ProviderArgs {
    /// Mistral API key.
    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API base URL.
    #[arg(long, env = "MISTRAL_BASE_URL", default_value = pdf_ocr_parser::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// OCR model ID.
    #[arg(long, env = "PDFOCR_MODEL", default_value = pdf_ocr_parser::config::DEFAULT_MODEL)]
    model: String,

    /// Maximum number of images to extract.
    #[arg(long, env = "PDFOCR_IMAGE_LIMIT", default_value_t = 50)]
    image_limit: u32,

    /// Minimum image size in pixels.
    #[arg(long, env = "PDFOCR_IMAGE_MIN_SIZE", default_value_t = 100)]
    image_min_size: u32,

    /// Do not request inline image data (placeholders stay unresolved).
    #[arg(long)]
    no_images: bool,

    /// Delete the uploaded file from the provider after OCR.
    #[arg(long, env = "PDFOCR_DELETE_UPLOAD")]
    delete_upload: bool,

    /// Per-request provider timeout in seconds.
    #[arg(long, env = "PDFOCR_TIMEOUT", default_value_t = 120)]
    timeout: u64,
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Write the output to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output the full JSON result instead of markdown.
    #[arg(long, conflicts_with = "raw")]
    json: bool,

    /// Output the provider's raw markdown (placeholders not rewritten).
    #[arg(long)]
    raw: bool,

    /// Also save the JSON result next to the input as `<name>_results.json`.
    #[arg(long)]
    save_results: bool,

    /// Decode every extracted image into this directory.
    #[arg(long)]
    images_dir: Option<PathBuf>,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, default_value_t = 120)]
    download_timeout: u64,

    /// Disable the progress spinner.
    #[arg(long, env = "PDFOCR_NO_PROGRESS")]
    no_progress: bool,

    #[command(flatten)]
    provider: ProviderArgs,
}

#[cfg(feature = "server")]
#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "PDFOCR_BIND", default_value = "0.0.0.0:8000")]
    bind: std::net::SocketAddr,

    /// Maximum upload size in megabytes.
    #[arg(long, env = "PDFOCR_MAX_UPLOAD_MB", default_value_t = 50)]
    max_upload_mb: usize,

    #[command(flatten)]
    provider: ProviderArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the spinner is active; the
    // spinner provides all the feedback that matters to the user.
    let spinner_active = match &cli.command {
        Command::Parse(args) => !cli.quiet && !args.no_progress,
        #[cfg(feature = "server")]
        Command::Serve(_) => false,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || spinner_active {
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

    match cli.command {
        Command::Parse(args) => run_parse(args, cli.quiet, spinner_active).await,
        #[cfg(feature = "server")]
        Command::Serve(args) => run_serve(args).await,
    }
}

async fn run_parse(args: ParseArgs, quiet: bool, show_progress: bool) -> Result<()> {
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ParseProgressCallback>)
    } else {
        None
    };

    let config = build_config(&args.provider, Some(args.download_timeout), progress)?;
    let result = parse(&args.input, &config).await.context("Parse failed")?;

    // ── Primary output ───────────────────────────────────────────────────
    let rendered = render_output(&result, args.json, args.raw)?;
    match args.output {
        Some(ref path) => {
            write_atomic(path, rendered.as_bytes())
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !quiet {
                eprintln!("{}  →  {}", green("✔"), bold(&path.display().to_string()));
            }
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(rendered.as_bytes())
                .context("Failed to write to stdout")?;
            // Ensure a trailing newline on stdout.
            if !rendered.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
    }

    // ── Side outputs ─────────────────────────────────────────────────────
    if args.save_results {
        let file_name = results_file_name(&display_name(&args.input));
        let path = sibling_path(&args.input, &file_name);
        let json = serde_json::to_string_pretty(&result).context("Failed to serialise result")?;
        write_atomic(&path, json.as_bytes())
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !quiet {
            eprintln!("   results  →  {}", path.display());
        }
    }

    if let Some(ref dir) = args.images_dir {
        let written = export_images(&result, dir)
            .await
            .context("Failed to export images")?;
        if !quiet {
            eprintln!("   {} images  →  {}", written.len(), dir.display());
        }
    }

    if !quiet {
        print_usage_summary(&result);
    }
    Ok(())
}

#[cfg(feature = "server")]
async fn run_serve(args: ServeArgs) -> Result<()> {
    use pdf_ocr_parser::server::{serve, AppState};
    use pdf_ocr_parser::MistralClient;

    let config = build_config(&args.provider, None, None)?;
    // Built once here and shared by every request.
    let client = MistralClient::from_config(&config).context("Cannot start server")?;
    let state = AppState::new(Arc::new(client), config);

    serve(args.bind, state, args.max_upload_mb * 1024 * 1024)
        .await
        .context("Server error")
}

/// Map CLI args to `OcrConfig`.
fn build_config(
    provider: &ProviderArgs,
    download_timeout: Option<u64>,
    progress: Option<ProgressCallback>,
) -> Result<OcrConfig> {
    let mut builder = OcrConfig::builder()
        .base_url(&provider.base_url)
        .model(&provider.model)
        .include_image_base64(!provider.no_images)
        .image_limit(provider.image_limit)
        .image_min_size(provider.image_min_size)
        .delete_uploaded_file(provider.delete_upload)
        .request_timeout_secs(provider.timeout);

    if let Some(ref key) = provider.api_key {
        builder = builder.api_key(key);
    }
    if let Some(secs) = download_timeout {
        builder = builder.download_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn render_output(result: &ParseResult, json: bool, raw: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(result).context("Failed to serialise result");
    }
    Ok(if raw {
        result.raw_text.clone()
    } else {
        result.text.clone()
    })
}

/// File name shown to the user and used for the results file.
fn display_name(input: &str) -> String {
    if pdf_ocr_parser::pipeline::input::is_url(input) {
        return pdf_ocr_parser::pipeline::input::file_name_from_url(input);
    }
    std::path::Path::new(input)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn print_usage_summary(result: &ParseResult) {
    let model = if result.model.is_empty() {
        pdf_ocr_parser::config::DEFAULT_MODEL
    } else {
        result.model.as_str()
    };
    match result.usage {
        Some(usage) => eprintln!(
            "   {}  {}  {}",
            dim(&format!("model {model}")),
            dim(&format!("{} pages processed", usage.pages_processed)),
            dim(&format!(
                "document {}",
                format_bytes(usage.doc_size_bytes.unwrap_or(0))
            )),
        ),
        None => eprintln!("   {}", dim(&format!("model {model}"))),
    }
}
