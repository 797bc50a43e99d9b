//! # edgequake-md2pdf
//!
//! Convert a Markdown file hosted on GitHub into a styled PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! GitHub URL
//!  │
//!  ├─ 1. Classify  github.com/.../blob/... → raw.githubusercontent.com/...
//!  ├─ 2. Fetch     one HTTP GET; anything but 200 is fatal
//!  ├─ 3. Render    comrak (GFM tables, fenced code) + syntect highlighting,
//!  │               wrapped in a fixed GitHub-like stylesheet
//!  ├─ 4. Export    scratch HTML file → WeasyPrint / wkhtmltopdf / Chromium → PDF
//!  └─ 5. Preview   open the PDF with the system viewer (best effort)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_md2pdf::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().preview(false).build()?;
//!     let output = convert(
//!         "https://github.com/rust-lang/rust/blob/master/README.md",
//!         None, // → README.pdf
//!         &config,
//!     )
//!     .await?;
//!     println!("wrote {}", output.output_path.display());
//!     Ok(())
//! }
//! ```
//!
//! For notebook-style use where a failure should be printed rather than
//! propagated, see [`convert_or_report`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## PDF engines
//!
//! PDF layout is delegated to an external program found on `PATH`:
//! `weasyprint`, `wkhtmltopdf`, or headless `chromium`/`google-chrome`
//! (tried in that order by default). See [`EngineKind`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, EngineKind};
pub use convert::{convert, convert_or_report, convert_sync, default_output_path, inspect};
pub use error::Md2PdfError;
pub use output::{ConversionOutput, ConversionStats, SourceInfo};
pub use pipeline::classify::{classify, resolve_source, Classification};
pub use pipeline::engine::{CommandEngine, PdfEngine};
pub use pipeline::export::export_pdf;
pub use pipeline::fetch::{ContentFetcher, HttpFetcher};
pub use pipeline::preview::{Previewer, SystemPreviewer};
pub use pipeline::render::{render_document, render_document_with, RenderOptions};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
