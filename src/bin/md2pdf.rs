//! CLI binary for edgequake-md2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_md2pdf::{
    check_capabilities, convert, default_output_for, BackendChoice, CapabilityReport,
    CapabilityStatus, ConversionConfig, HeadingAnchors, Md2PdfError, PageSize, ProgressCallback,
    RenderProgressCallback, DEFAULT_INPUT,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
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
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner that names the backend currently rendering and logs skips and
/// failures above itself.
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
        bar.set_prefix("Converting");
        bar.set_message("Markdown → HTML…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl RenderProgressCallback for CliProgressCallback {
    fn on_html_ready(&self, html_len: usize) {
        self.bar
            .println(format!("  {} HTML ready  {}", green("✓"), dim(&format!("{html_len} bytes"))));
    }

    fn on_backend_skipped(&self, backend: &str, reason: &str) {
        self.bar.println(format!(
            "  {} {backend} not available  {}",
            yellow("–"),
            dim(reason)
        ));
    }

    fn on_attempt_start(&self, backend: &str) {
        self.bar.set_message(format!("rendering with {backend}"));
    }

    fn on_attempt_failed(&self, backend: &str, error: &str) {
        let first_line = error.lines().next().unwrap_or(error);
        self.bar
            .println(format!("  {} {backend} failed  {}", red("✗"), dim(first_line)));
    }

    fn on_attempt_succeeded(&self, _backend: &str, _output: &Path) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert the default proposal document
  md2pdf

  # Convert a specific file, output next to it
  md2pdf notes.md

  # Choose the output path and page geometry
  md2pdf notes.md -o build/notes.pdf --page-size Letter --margin 2cm

  # Force WeasyPrint and keep the intermediate HTML
  md2pdf notes.md --backend weasyprint --emit-html build/notes.html

  # Which renderers are installed?
  md2pdf --check

BACKENDS (tried in this order with --backend auto):
  wkhtmltopdf   https://wkhtmltopdf.org/downloads.html
  weasyprint    pip install weasyprint

ENVIRONMENT VARIABLES:
  WKHTMLTOPDF_PATH   Path to the wkhtmltopdf executable (skips PATH search)
  WEASYPRINT_PATH    Path to the weasyprint executable (skips PATH search)
  RUST_LOG           Overrides the log filter (e.g. edgequake_md2pdf=debug)
"#;

/// Convert a Markdown document into a styled PDF.
#[derive(Parser, Debug)]
#[command(
    name = "md2pdf",
    version,
    about = "Convert a Markdown document into a styled PDF",
    long_about = "Convert a Markdown document (tables, fenced code, [TOC]) into a styled PDF. \
Rendering is delegated to wkhtmltopdf, falling back to WeasyPrint when wkhtmltopdf is \
missing or fails.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown source file.
    #[arg(env = "MD2PDF_INPUT", default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// PDF destination. Default: the input path with a `.pdf` extension.
    #[arg(short, long, env = "MD2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// Rendering backend(s) to use.
    #[arg(long, env = "MD2PDF_BACKEND", value_enum, ignore_case = true, default_value = "auto")]
    backend: BackendArg,

    /// Paper size.
    #[arg(long, env = "MD2PDF_PAGE_SIZE", value_enum, ignore_case = true, default_value = "a4")]
    page_size: PageSizeArg,

    /// Margin on all four edges (cm, mm, in, pt or px).
    #[arg(long, env = "MD2PDF_MARGIN", default_value = edgequake_md2pdf::config::DEFAULT_MARGIN)]
    margin: String,

    /// When headings get `id` anchors (auto: only if the document has [TOC]).
    #[arg(long, env = "MD2PDF_ANCHORS", value_enum, default_value = "auto")]
    anchors: AnchorsArg,

    /// Document title. Default: the first level-1 heading.
    #[arg(long, env = "MD2PDF_TITLE")]
    title: Option<String>,

    /// Also write the intermediate HTML document to this path.
    #[arg(long, env = "MD2PDF_EMIT_HTML")]
    emit_html: Option<PathBuf>,

    /// Emit a PDF outline (bookmarks) where the backend supports it.
    #[arg(long, env = "MD2PDF_OUTLINE")]
    outline: bool,

    /// Report which capabilities are installed and exit.
    #[arg(long)]
    check: bool,

    /// Print a JSON report instead of human-readable output.
    #[arg(long, env = "MD2PDF_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MD2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    Auto,
    Wkhtmltopdf,
    Weasyprint,
}

impl From<BackendArg> for BackendChoice {
    fn from(v: BackendArg) -> Self {
        match v {
            BackendArg::Auto => BackendChoice::Auto,
            BackendArg::Wkhtmltopdf => BackendChoice::Wkhtmltopdf,
            BackendArg::Weasyprint => BackendChoice::WeasyPrint,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PageSizeArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

impl From<PageSizeArg> for PageSize {
    fn from(v: PageSizeArg) -> Self {
        match v {
            PageSizeArg::A3 => PageSize::A3,
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::A5 => PageSize::A5,
            PageSizeArg::Letter => PageSize::Letter,
            PageSizeArg::Legal => PageSize::Legal,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum AnchorsArg {
    Auto,
    Always,
    Never,
}

impl From<AnchorsArg> for HeadingAnchors {
    fn from(v: AnchorsArg) -> Self {
        match v {
            AnchorsArg::Auto => HeadingAnchors::Auto,
            AnchorsArg::Always => HeadingAnchors::Always,
            AnchorsArg::Never => HeadingAnchors::Never,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Default to warnings only: stdout carries the user-facing messages.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            if cli.json {
                let body = serde_json::json!({ "error": format!("{e:#}") });
                println!("{body}");
            } else {
                println!("{} {e:#}", red("✗"));
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<ExitCode> {
    let config = build_config(cli, None)?;

    // ── Check-only mode ──────────────────────────────────────────────────
    if cli.check {
        let report = check_capabilities(&config);
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise report")?
            );
        } else {
            print_capabilities(&report);
        }
        return Ok(if report.is_viable() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_for(&cli.input));

    let show_progress = !cli.quiet && !cli.json;
    if show_progress {
        println!("{}", bold("Markdown to PDF Converter"));
        println!("{}", "=".repeat(50));
        println!("Input:  {}", cli.input.display());
        println!("Output: {}", output.display());
        println!();
        println!("Converting to PDF…");
    }

    let spinner = show_progress.then(CliProgressCallback::new);
    let progress: Option<ProgressCallback> = spinner
        .clone()
        .map(|cb| cb as Arc<dyn RenderProgressCallback>);
    let config = build_config(cli, progress)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let result = convert(&cli.input, &output, &config).await;
    if let Some(ref spinner) = spinner {
        spinner.bar.finish_and_clear();
    }

    let report = match result {
        Ok(report) => report,
        Err(Md2PdfError::MissingCapability { missing, guidance }) if !cli.json => {
            println!("{} Missing dependencies: {}", red("✗"), missing.join(" or "));
            println!();
            print!("{guidance}");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e).context("Conversion failed"),
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        println!(
            "{} PDF generated successfully using {}!",
            green("✓"),
            bold(&report.backend)
        );
        println!("Location: {}", report.output.display());
        println!(
            "{}",
            dim(&format!("{} bytes in {}ms", report.pdf_bytes, report.duration_ms))
        );
    }

    Ok(ExitCode::SUCCESS)
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .backend(cli.backend.into())
        .page_size(cli.page_size.into())
        .margin(cli.margin.clone())
        .anchors(cli.anchors.into())
        .outline(cli.outline);

    if let Some(ref title) = cli.title {
        builder = builder.title(title.clone());
    }
    if let Some(ref path) = cli.emit_html {
        builder = builder.emit_html(path.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_capabilities(report: &CapabilityReport) {
    println!("{}", bold("Capabilities"));
    print_status(&report.markdown);
    for backend in &report.backends {
        print_status(backend);
    }
    println!();

    if report.is_viable() {
        println!("{} Ready to convert.", green("✓"));
    } else {
        println!("{} Missing dependencies: {}", red("✗"), report.missing().join(" or "));
        println!();
        print!("{}", report.install_guidance());
    }
}

fn print_status(status: &CapabilityStatus) {
    let mark = if status.available { green("✓") } else { red("✗") };
    let detail = match (&status.location, &status.detail) {
        (Some(location), _) => {
            let version = tool_probe::version(location)
                .map(|v| format!("  {}", dim(&v)))
                .unwrap_or_default();
            format!("{}{version}", location.display())
        }
        (None, Some(detail)) => dim(detail),
        (None, None) => String::new(),
    };
    println!("  {mark} {:<12} {detail}", status.name);
}
