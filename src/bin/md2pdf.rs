//! CLI binary for edgequake-md2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_md2pdf::{
    convert, inspect, ConversionConfig, ConversionProgressCallback, EngineKind, ProgressCallback,
    Stage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
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

/// Terminal progress callback: a spinner naming the running stage plus one
/// log line per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Starting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix(stage.label());
        self.bar.set_message("…");
    }

    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} {:<10} {}",
            green("✓"),
            stage.to_string(),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
    }

    fn on_stage_error(&self, stage: Stage, error: &str) {
        // Preview failures do not fail the run; show them as warnings.
        let mark = if stage == Stage::Preview {
            yellow("⚠")
        } else {
            red("✗")
        };
        let first_line = error.lines().next().unwrap_or(error);
        self.bar
            .println(format!("  {} {:<10} {}", mark, stage.to_string(), first_line));
        if stage != Stage::Preview {
            self.bar.finish_and_clear();
        }
    }

    fn on_conversion_complete(&self, _output_path: &Path) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a GitHub file page (writes report.pdf)
  md2pdf https://github.com/owner/repo/blob/main/docs/report.md

  # Raw URL, explicit output, no viewer
  md2pdf https://raw.githubusercontent.com/owner/repo/main/README.md -o out/readme.pdf --no-preview

  # Pick the engine explicitly
  md2pdf --engine chromium https://github.com/owner/repo/blob/main/README.md

  # Show the raw URL and default output without downloading anything
  md2pdf --inspect-only https://github.com/owner/repo/blob/main/README.md

  # Machine-readable summary
  md2pdf --json --no-preview https://github.com/owner/repo/blob/main/README.md

ACCEPTED URLS:
  https://github.com/<owner>/<repo>/blob/<ref>/<path>.md
  https://raw.githubusercontent.com/<owner>/<repo>/<ref>/<path>.md

PDF ENGINES (first found is used with --engine auto):
  weasyprint    pip install weasyprint
  wkhtmltopdf   distro package or https://wkhtmltopdf.org
  chromium      chromium, chromium-browser, google-chrome, google-chrome-stable
"#;

/// Convert GitHub Markdown files to styled PDF documents.
#[derive(Parser, Debug)]
#[command(
    name = "md2pdf",
    version,
    about = "Convert GitHub Markdown files to styled PDF documents",
    long_about = "Download a Markdown file from GitHub, render it to GitHub-styled HTML \
with syntax-highlighted code, and convert it to PDF with WeasyPrint, wkhtmltopdf or \
headless Chromium.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// GitHub `blob` URL or raw.githubusercontent.com URL of a .md file.
    url: String,

    /// Write the PDF here instead of `<file stem>.pdf`.
    #[arg(short, long, env = "MD2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// HTML→PDF engine: auto, weasyprint, wkhtmltopdf, chromium.
    #[arg(long, env = "MD2PDF_ENGINE", value_enum, default_value = "auto")]
    engine: EngineArg,

    /// Path to the engine binary (requires an explicit --engine).
    #[arg(long, env = "MD2PDF_ENGINE_PATH")]
    engine_path: Option<PathBuf>,

    /// Do not open the PDF after writing it.
    #[arg(long, env = "MD2PDF_NO_PREVIEW")]
    no_preview: bool,

    /// Leave relative image paths as written instead of resolving them
    /// against the repository.
    #[arg(long, env = "MD2PDF_KEEP_RELATIVE_IMAGES")]
    keep_relative_images: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "MD2PDF_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// PDF engine timeout in seconds.
    #[arg(long, env = "MD2PDF_RENDER_TIMEOUT", default_value_t = 120)]
    render_timeout: u64,

    /// Print the resolved raw URL and default output only; no download.
    #[arg(long)]
    inspect_only: bool,

    /// Output a JSON summary instead of human-readable text.
    #[arg(long, env = "MD2PDF_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "MD2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MD2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum EngineArg {
    Auto,
    Weasyprint,
    Wkhtmltopdf,
    Chromium,
}

impl From<EngineArg> for EngineKind {
    fn from(v: EngineArg) -> Self {
        match v {
            EngineArg::Auto => EngineKind::Auto,
            EngineArg::Weasyprint => EngineKind::WeasyPrint,
            EngineArg::Wkhtmltopdf => EngineKind::Wkhtmltopdf,
            EngineArg::Chromium => EngineKind::Chromium,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner already narrates each stage; keep INFO logs out of its way.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress || cli.json {
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

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let info = inspect(&cli.url).context("Not a convertible GitHub Markdown URL")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialise source info")?
            );
        } else {
            println!("Source:       {}", info.source_url);
            println!("Raw URL:      {}", info.canonical_url);
            println!("Rewritten:    {}", info.rewritten);
            println!("Output:       {}", info.default_output_path.display());
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert(&cli.url, cli.output.as_deref(), &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        eprintln!(
            "{}  {}  {}  →  {}",
            green("✔"),
            dim(&format!("{} bytes", output.stats.pdf_bytes)),
            dim(&format!("{}ms", output.stats.total_duration_ms)),
            bold(&output.output_path.display().to_string()),
        );
        if config.preview && !output.previewed {
            eprintln!("   {}", dim("preview unavailable; open the file manually"));
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .engine_kind(cli.engine.clone().into())
        .preview(!cli.no_preview)
        .resolve_relative_images(!cli.keep_relative_images)
        .download_timeout_secs(cli.download_timeout)
        .render_timeout_secs(cli.render_timeout);

    if let Some(ref path) = cli.engine_path {
        builder = builder.engine_path(path);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
