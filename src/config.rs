//! Configuration types for Markdown-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The visual theme of the produced PDF
//! is fixed; what *is* configurable is how the pipeline talks to the outside
//! world: timeouts, which PDF engine to run, whether to open a preview, and
//! (for tests and embedding hosts) replacement fetcher/engine/previewer
//! implementations.

use crate::error::Md2PdfError;
use crate::pipeline::engine::PdfEngine;
use crate::pipeline::fetch::ContentFetcher;
use crate::pipeline::preview::Previewer;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Configuration for a Markdown-to-PDF conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_md2pdf::{ConversionConfig, EngineKind};
///
/// let config = ConversionConfig::builder()
///     .engine_kind(EngineKind::WeasyPrint)
///     .download_timeout_secs(30)
///     .preview(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// HTTP download timeout in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Timeout for one run of the HTML→PDF engine in seconds. Default: 120.
    ///
    /// Headless browsers occasionally hang on pages with remote images that
    /// never finish loading; the engine process is killed when this expires.
    pub render_timeout_secs: u64,

    /// Which external HTML→PDF program to run. Default: [`EngineKind::Auto`].
    pub engine_kind: EngineKind,

    /// Explicit path to the engine binary. Skips `PATH` discovery.
    pub engine_path: Option<PathBuf>,

    /// Open the produced PDF with the system viewer. Default: true.
    pub preview: bool,

    /// Rewrite relative `<img src>` values against the raw-content URL.
    /// Default: true.
    ///
    /// READMEs usually reference screenshots as `docs/shot.png`; without the
    /// rewrite those resolve against the scratch HTML file and disappear from
    /// the PDF.
    pub resolve_relative_images: bool,

    /// Pre-constructed fetcher. Takes precedence over the default HTTP client.
    pub fetcher: Option<Arc<dyn ContentFetcher>>,

    /// Pre-constructed PDF engine. Takes precedence over `engine_kind`.
    pub engine: Option<Arc<dyn PdfEngine>>,

    /// Pre-constructed previewer. Takes precedence over the system viewer.
    pub previewer: Option<Arc<dyn Previewer>>,

    /// Optional per-stage progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            download_timeout_secs: 120,
            render_timeout_secs: 120,
            engine_kind: EngineKind::default(),
            engine_path: None,
            preview: true,
            resolve_relative_images: true,
            fetcher: None,
            engine: None,
            previewer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .field("engine_kind", &self.engine_kind)
            .field("engine_path", &self.engine_path)
            .field("preview", &self.preview)
            .field("resolve_relative_images", &self.resolve_relative_images)
            .field("fetcher", &self.fetcher.as_ref().map(|_| "<dyn ContentFetcher>"))
            .field("engine", &self.engine.as_ref().map(|e| e.name()))
            .field("previewer", &self.previewer.as_ref().map(|_| "<dyn Previewer>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn render_timeout_secs(mut self, secs: u64) -> Self {
        self.config.render_timeout_secs = secs;
        self
    }

    pub fn engine_kind(mut self, kind: EngineKind) -> Self {
        self.config.engine_kind = kind;
        self
    }

    pub fn engine_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.engine_path = Some(path.into());
        self
    }

    pub fn preview(mut self, v: bool) -> Self {
        self.config.preview = v;
        self
    }

    pub fn resolve_relative_images(mut self, v: bool) -> Self {
        self.config.resolve_relative_images = v;
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn ContentFetcher>) -> Self {
        self.config.fetcher = Some(fetcher);
        self
    }

    pub fn engine(mut self, engine: Arc<dyn PdfEngine>) -> Self {
        self.config.engine = Some(engine);
        self
    }

    pub fn previewer(mut self, previewer: Arc<dyn Previewer>) -> Self {
        self.config.previewer = Some(previewer);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Md2PdfError> {
        let c = &self.config;
        if c.download_timeout_secs == 0 {
            return Err(Md2PdfError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        if c.render_timeout_secs == 0 {
            return Err(Md2PdfError::InvalidConfig(
                "Render timeout must be ≥ 1 second".into(),
            ));
        }
        if let Some(ref p) = c.engine_path {
            if c.engine_kind == EngineKind::Auto {
                return Err(Md2PdfError::InvalidConfig(format!(
                    "--engine-path {} needs an explicit --engine",
                    p.display()
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// The external HTML→PDF program used by [`crate::pipeline::engine::CommandEngine`].
///
/// | Kind | Program | Notes |
/// |------|---------|-------|
/// | `WeasyPrint` | `weasyprint` | Best CSS paged-media support |
/// | `Wkhtmltopdf` | `wkhtmltopdf` | Small, widely packaged |
/// | `Chromium` | `chromium` / `google-chrome` | Headless `--print-to-pdf` |
/// | `Auto` | first found, in the order above | default |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Auto,
    WeasyPrint,
    Wkhtmltopdf,
    Chromium,
}

impl EngineKind {
    /// Concrete engines tried by `Auto`, in preference order.
    pub const PREFERENCE: [EngineKind; 3] = [
        EngineKind::WeasyPrint,
        EngineKind::Wkhtmltopdf,
        EngineKind::Chromium,
    ];

    /// Binary names searched on `PATH` for this engine.
    pub fn binaries(self) -> &'static [&'static str] {
        match self {
            EngineKind::Auto => &[],
            EngineKind::WeasyPrint => &["weasyprint"],
            EngineKind::Wkhtmltopdf => &["wkhtmltopdf"],
            EngineKind::Chromium => &[
                "chromium",
                "chromium-browser",
                "google-chrome",
                "google-chrome-stable",
            ],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EngineKind::Auto => "auto",
            EngineKind::WeasyPrint => "weasyprint",
            EngineKind::Wkhtmltopdf => "wkhtmltopdf",
            EngineKind::Chromium => "chromium",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = Md2PdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(EngineKind::Auto),
            "weasyprint" => Ok(EngineKind::WeasyPrint),
            "wkhtmltopdf" => Ok(EngineKind::Wkhtmltopdf),
            "chromium" | "chrome" => Ok(EngineKind::Chromium),
            other => Err(Md2PdfError::InvalidConfig(format!(
                "unknown PDF engine '{other}' (expected auto, weasyprint, wkhtmltopdf or chromium)"
            ))),
        }
    }
}
