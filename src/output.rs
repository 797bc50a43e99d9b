//! Result types returned by the conversion entry points.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything known about a finished conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The URL exactly as the caller supplied it.
    pub source_url: String,
    /// The raw-content URL that was actually downloaded.
    pub canonical_url: String,
    /// Where the PDF was written. Owned by the caller from here on.
    pub output_path: PathBuf,
    /// Whether the preview surface opened the PDF.
    pub previewed: bool,
    pub stats: ConversionStats,
}

/// Sizes and timings for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Bytes of Markdown downloaded.
    pub markdown_bytes: usize,
    /// Bytes of the self-contained HTML document handed to the engine.
    pub html_bytes: usize,
    /// Size of the produced PDF on disk.
    pub pdf_bytes: u64,
    pub fetch_duration_ms: u64,
    pub render_duration_ms: u64,
    pub export_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// What [`crate::inspect`] learns about a URL without touching the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub source_url: String,
    pub canonical_url: String,
    /// True when a `github.com/.../blob/...` URL was rewritten to the raw host.
    pub rewritten: bool,
    /// The output path used when none is given.
    pub default_output_path: PathBuf,
}
