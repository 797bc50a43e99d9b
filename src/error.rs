//! Error types for the edgequake-md2pdf library.
//!
//! Every failure of a conversion run is a [`Md2PdfError`]. Variants are
//! grouped by the pipeline stage that raises them, and
//! [`Md2PdfError::stage`] recovers that stage so callers (and the CLI
//! progress display) can say *where* a run stopped, not just why.
//!
//! None of these errors is retried by the library. A bad URL needs a
//! corrected URL; a 404 needs a different file; an engine failure needs a
//! working engine install.

use crate::progress::Stage;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-md2pdf library.
#[derive(Debug, Error)]
pub enum Md2PdfError {
    // ── Classify errors ───────────────────────────────────────────────────
    /// The URL is not a GitHub Markdown reference (raw or `blob` form).
    #[error(
        "Invalid URL '{url}': not a GitHub Markdown file.\n\
Expected https://github.com/<owner>/<repo>/blob/<ref>/<path>.md \
or https://raw.githubusercontent.com/<owner>/<repo>/<ref>/<path>.md"
    )]
    InvalidUrl { url: String },

    // ── Fetch errors ──────────────────────────────────────────────────────
    /// The server answered, but not with `200 OK`.
    #[error("Failed to download Markdown from '{url}'. Status code: {status}")]
    FetchFailed { url: String, status: u16 },

    /// The request never produced a usable response (DNS, TLS, body decode).
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Render errors ─────────────────────────────────────────────────────
    /// The Markdown/HTML rendering step failed.
    #[error("Markdown rendering failed: {0}")]
    RenderFailed(String),

    // ── Export errors ─────────────────────────────────────────────────────
    /// No usable HTML→PDF engine was found on this machine.
    #[error("PDF engine '{engine}' is not available.\n{hint}")]
    EngineNotFound { engine: String, hint: String },

    /// The PDF engine ran but did not produce a PDF.
    #[error("PDF export with '{engine}' failed: {detail}")]
    ExportFailed { engine: String, detail: String },

    /// The PDF engine exceeded the configured render timeout.
    #[error("PDF engine '{engine}' timed out after {secs}s\nIncrease --render-timeout.")]
    ExportTimeout { engine: String, secs: u64 },

    /// Could not create the output directory or scratch HTML file.
    #[error("Failed to write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Preview errors ────────────────────────────────────────────────────
    /// The PDF could not be shown. Never fatal to a conversion run.
    #[error("Could not open preview for '{path}': {reason}")]
    PreviewFailed { path: PathBuf, reason: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Md2PdfError {
    /// The pipeline stage this error belongs to.
    ///
    /// Config and internal errors have no stage of their own and report
    /// [`Stage::Classify`], the stage a run is in before any I/O happens.
    pub fn stage(&self) -> Stage {
        match self {
            Md2PdfError::InvalidUrl { .. }
            | Md2PdfError::InvalidConfig(_)
            | Md2PdfError::Internal(_) => Stage::Classify,
            Md2PdfError::FetchFailed { .. }
            | Md2PdfError::DownloadFailed { .. }
            | Md2PdfError::DownloadTimeout { .. } => Stage::Fetch,
            Md2PdfError::RenderFailed(_) => Stage::Render,
            Md2PdfError::EngineNotFound { .. }
            | Md2PdfError::ExportFailed { .. }
            | Md2PdfError::ExportTimeout { .. }
            | Md2PdfError::OutputWriteFailed { .. } => Stage::Export,
            Md2PdfError::PreviewFailed { .. } => Stage::Preview,
        }
    }
}
