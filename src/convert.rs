//! Conversion entry points: the orchestrator that runs every stage in order.
//!
//! [`convert`] is the library contract and returns a typed error. The
//! interactive contract, "never crash the session, just say what went
//! wrong", is [`convert_or_report`], which logs the error and hands back
//! `None` instead.

use crate::config::ConversionConfig;
use crate::error::Md2PdfError;
use crate::output::{ConversionOutput, ConversionStats, SourceInfo};
use crate::pipeline::classify::{self, Classification};
use crate::pipeline::engine::{CommandEngine, PdfEngine};
use crate::pipeline::export;
use crate::pipeline::fetch::{ContentFetcher, HttpFetcher};
use crate::pipeline::preview::{Previewer, SystemPreviewer};
use crate::pipeline::render::{self, RenderOptions};
use crate::progress::Stage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use url::Url;

/// Fallback file stem when the URL has no usable last segment.
const FALLBACK_STEM: &str = "document";

/// Convert a GitHub Markdown URL to a PDF.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `source_url` : `github.com/.../blob/...` or `raw.githubusercontent.com` URL
/// * `output_path`: where to write the PDF; `None` derives
///   `<file stem>.pdf` in the working directory (see [`default_output_path`])
/// * `config`     : conversion configuration
///
/// # Errors
/// - [`Md2PdfError::InvalidUrl`] before any network access
/// - fetch errors (`FetchFailed` carries the HTTP status)
/// - [`Md2PdfError::RenderFailed`]
/// - export errors (engine missing, failed, timed out)
///
/// Preview failures are never returned; see [`ConversionOutput::previewed`].
pub async fn convert(
    source_url: impl AsRef<str>,
    output_path: Option<&Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Md2PdfError> {
    let total_start = Instant::now();
    let source_url = source_url.as_ref();
    info!("Starting conversion: {}", source_url);

    // ── Step 1: Resolve output path ──────────────────────────────────────
    let output_path = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(source_url));

    // ── Step 2: Classify ─────────────────────────────────────────────────
    let canonical_url = run_stage(config, Stage::Classify, async {
        classify::resolve_source(source_url)
    })
    .await?
    .0;
    if canonical_url != source_url {
        info!("Rewrote to raw URL: {}", canonical_url);
    }

    // ── Step 3: Fetch ────────────────────────────────────────────────────
    let fetcher = resolve_fetcher(config)?;
    let (markdown, fetch_duration_ms) =
        run_stage(config, Stage::Fetch, fetcher.fetch(&canonical_url)).await?;

    // ── Step 4: Render ───────────────────────────────────────────────────
    info!("Converting Markdown to HTML...");
    let render_opts = RenderOptions {
        title: file_stem(source_url).unwrap_or(FALLBACK_STEM).to_string(),
        base_url: config
            .resolve_relative_images
            .then(|| canonical_url.clone()),
    };
    let (html, render_duration_ms) = run_stage(config, Stage::Render, async {
        render::render_document_with(&markdown, &render_opts)
    })
    .await?;

    // ── Step 5: Export ───────────────────────────────────────────────────
    info!("Converting HTML to PDF: {}", output_path.display());
    let engine = resolve_engine(config)?;
    let (pdf_bytes, export_duration_ms) = run_stage(
        config,
        Stage::Export,
        export::export_pdf(&html, &output_path, engine.as_ref()),
    )
    .await?;

    // ── Step 6: Preview (best effort) ────────────────────────────────────
    let previewed = if config.preview {
        preview(config, &output_path)
    } else {
        false
    };

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(&output_path);
    }

    let stats = ConversionStats {
        markdown_bytes: markdown.len(),
        html_bytes: html.len(),
        pdf_bytes,
        fetch_duration_ms,
        render_duration_ms,
        export_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} ({} bytes, {}ms total)",
        output_path.display(),
        stats.pdf_bytes,
        stats.total_duration_ms
    );

    Ok(ConversionOutput {
        source_url: source_url.to_string(),
        canonical_url,
        output_path,
        previewed,
        stats,
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally. Called from inside a tokio
/// runtime it returns [`Md2PdfError::Internal`] instead of blocking a worker.
pub fn convert_sync(
    source_url: impl AsRef<str>,
    output_path: Option<&Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Md2PdfError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(Md2PdfError::Internal(
            "convert_sync called from inside a tokio runtime; use convert().await".into(),
        ));
    }
    tokio::runtime::Runtime::new()
        .map_err(|e| Md2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(source_url, output_path, config))
}

/// Convert with default configuration, reporting instead of returning errors.
///
/// Returns the PDF path on success. On failure the error is logged and
/// printed to stderr, and `None` is returned. Inside a tokio runtime this is
/// reported the same way; use [`convert`] there.
pub fn convert_or_report(source_url: &str, output_path: Option<&Path>) -> Option<PathBuf> {
    match convert_sync(source_url, output_path, &ConversionConfig::default()) {
        Ok(output) => Some(output.output_path),
        Err(e) => {
            error!(stage = %e.stage(), "Conversion failed: {}", e);
            eprintln!("Error: {e}");
            None
        }
    }
}

/// Classify a URL and derive its default output, without network access.
pub fn inspect(source_url: &str) -> Result<SourceInfo, Md2PdfError> {
    let classification = classify::classify(source_url);
    let rewritten = matches!(classification, Classification::Rewritten(_));
    let canonical_url = classification
        .canonical_url()
        .map(str::to_string)
        .ok_or_else(|| Md2PdfError::InvalidUrl {
            url: source_url.to_string(),
        })?;

    Ok(SourceInfo {
        source_url: source_url.to_string(),
        canonical_url,
        rewritten,
        default_output_path: default_output_path(source_url),
    })
}

/// The output path used when the caller gives none: the last path segment
/// of `source_url` with its extension replaced by `.pdf`.
///
/// `https://github.com/o/r/blob/main/docs/report.md` → `report.pdf`.
pub fn default_output_path(source_url: &str) -> PathBuf {
    let stem = file_stem(source_url).unwrap_or(FALLBACK_STEM);
    PathBuf::from(format!("{stem}.pdf"))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Stem of the last path segment, if there is a non-empty one.
fn file_stem(source_url: &str) -> Option<&str> {
    let path = match Url::parse(source_url) {
        Ok(_) => {
            // Slice the raw input rather than the parsed URL so the stem
            // keeps the caller's spelling.
            let (_, rest) = source_url.split_once("://")?;
            let rest = &rest[rest.find('/')?..];
            let end = rest.find(['?', '#']).unwrap_or(rest.len());
            &rest[..end]
        }
        Err(_) => source_url,
    };
    let last = path.rsplit('/').next()?;
    let stem = Path::new(last).file_stem()?.to_str()?;
    (!stem.is_empty()).then_some(stem)
}

/// Run one stage, timing it and reporting start/complete/error events.
async fn run_stage<T, F>(
    config: &ConversionConfig,
    stage: Stage,
    fut: F,
) -> Result<(T, u64), Md2PdfError>
where
    F: std::future::Future<Output = Result<T, Md2PdfError>>,
{
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }
    let start = Instant::now();
    match fut.await {
        Ok(value) => {
            let elapsed_ms = start.elapsed().as_millis() as u64;
            if let Some(ref cb) = config.progress_callback {
                cb.on_stage_complete(stage, elapsed_ms);
            }
            Ok((value, elapsed_ms))
        }
        Err(e) => {
            if let Some(ref cb) = config.progress_callback {
                cb.on_stage_error(stage, &e.to_string());
            }
            Err(e)
        }
    }
}

fn preview(config: &ConversionConfig, output_path: &Path) -> bool {
    let previewer: Arc<dyn Previewer> = match config.previewer {
        Some(ref p) => Arc::clone(p),
        None => Arc::new(SystemPreviewer),
    };
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(Stage::Preview);
    }
    let start = Instant::now();
    match previewer.show(output_path) {
        Ok(()) => {
            if let Some(ref cb) = config.progress_callback {
                cb.on_stage_complete(Stage::Preview, start.elapsed().as_millis() as u64);
            }
            true
        }
        Err(e) => {
            warn!("Preview unavailable: {}", e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_stage_error(Stage::Preview, &e.to_string());
            }
            false
        }
    }
}

/// Injected fetcher, else an HTTP client with the configured timeout.
fn resolve_fetcher(config: &ConversionConfig) -> Result<Arc<dyn ContentFetcher>, Md2PdfError> {
    if let Some(ref fetcher) = config.fetcher {
        return Ok(Arc::clone(fetcher));
    }
    Ok(Arc::new(HttpFetcher::new(config.download_timeout_secs)?))
}

/// Resolve the PDF engine, from most-specific to least-specific:
///
/// 1. **Pre-built engine** (`config.engine`), used as-is.
/// 2. **Explicit binary** (`config.engine_path` + `config.engine_kind`).
/// 3. **Discovery** on `PATH` for `config.engine_kind` (`Auto` tries each).
fn resolve_engine(config: &ConversionConfig) -> Result<Arc<dyn PdfEngine>, Md2PdfError> {
    if let Some(ref engine) = config.engine {
        return Ok(Arc::clone(engine));
    }
    let engine = match config.engine_path {
        Some(ref path) => {
            CommandEngine::with_program(config.engine_kind, path, config.render_timeout_secs)?
        }
        None => CommandEngine::discover(config.engine_kind, config.render_timeout_secs)?,
    };
    Ok(Arc::new(engine))
}
