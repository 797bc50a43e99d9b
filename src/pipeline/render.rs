//! Document rendering: Markdown text → complete, styled HTML document.
//!
//! Parsing is comrak's job (CommonMark + GitHub extensions); fenced code is
//! highlighted by syntect through comrak's adapter in class mode, so the
//! colours come from one embedded stylesheet rather than inline styles on
//! every span. No line numbers are emitted.

use crate::error::Md2PdfError;
use crate::pipeline::template;
use comrak::plugins::syntect::SyntectAdapter;
use comrak::{markdown_to_html_with_plugins, Options, Plugins};
use once_cell::sync::{Lazy, OnceCell};
use regex::{Captures, Regex};
use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle};
use tracing::debug;
use url::Url;

/// Theme whose class stylesheet colours highlighted code.
const HIGHLIGHT_THEME: &str = "InspiredGitHub";

/// Class-mode adapter (`None` theme → CSS classes instead of inline styles).
static HIGHLIGHTER: Lazy<SyntectAdapter> = Lazy::new(|| SyntectAdapter::new(None));

static HIGHLIGHT_CSS: OnceCell<String> = OnceCell::new();

static IMG_SRC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(<img\b[^>]*?\bsrc=")([^"]*)(")"#).unwrap());

/// Options for [`render_document_with`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Text of the `<title>` element.
    pub title: String,
    /// URL of the Markdown file; relative image sources resolve against it.
    pub base_url: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: "Document".to_string(),
            base_url: None,
        }
    }
}

/// Render `markdown` into a complete HTML document with default options.
pub fn render_document(markdown: &str) -> Result<String, Md2PdfError> {
    render_document_with(markdown, &RenderOptions::default())
}

/// Render `markdown` into a complete HTML document.
pub fn render_document_with(markdown: &str, opts: &RenderOptions) -> Result<String, Md2PdfError> {
    let mut body = render_fragment(markdown);

    if let Some(ref base) = opts.base_url {
        let base = Url::parse(base)
            .map_err(|e| Md2PdfError::RenderFailed(format!("invalid base URL '{base}': {e}")))?;
        body = resolve_relative_images(&body, &base);
    }

    let css = highlight_css()?;
    let html = template::wrap_document(&opts.title, &body, css);
    debug!("Rendered {} bytes of Markdown → {} bytes of HTML", markdown.len(), html.len());
    Ok(html)
}

/// Markdown → HTML body fragment.
fn render_fragment(markdown: &str) -> String {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options.extension.description_lists = true;
    options.extension.front_matter_delimiter = Some("---".to_string());
    options.render.unsafe_ = true;

    let mut plugins = Plugins::default();
    plugins.render.codefence_syntax_highlighter = Some(&*HIGHLIGHTER);

    markdown_to_html_with_plugins(markdown, &options, &plugins)
}

/// Class stylesheet for highlighted spans, generated once.
fn highlight_css() -> Result<&'static str, Md2PdfError> {
    HIGHLIGHT_CSS
        .get_or_try_init(|| {
            let themes = ThemeSet::load_defaults();
            let theme = themes.themes.get(HIGHLIGHT_THEME).ok_or_else(|| {
                Md2PdfError::RenderFailed(format!("highlight theme '{HIGHLIGHT_THEME}' missing"))
            })?;
            css_for_theme_with_class_style(theme, ClassStyle::Spaced)
                .map_err(|e| Md2PdfError::RenderFailed(format!("highlight stylesheet: {e}")))
        })
        .map(String::as_str)
}

/// Rewrite relative `<img src>` values to absolute URLs under `base`.
///
/// Absolute URLs, protocol-relative URLs, `data:` URIs and fragments are
/// left alone.
pub fn resolve_relative_images(html: &str, base: &Url) -> String {
    IMG_SRC_RE
        .replace_all(html, |caps: &Captures| {
            let src = &caps[2];
            let resolved = if is_relative(src) {
                base.join(src)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| src.to_string())
            } else {
                src.to_string()
            };
            format!("{}{}{}", &caps[1], resolved, &caps[3])
        })
        .into_owned()
}

fn is_relative(src: &str) -> bool {
    !src.is_empty()
        && !src.starts_with('#')
        && !src.starts_with("//")
        && matches!(Url::parse(src), Err(url::ParseError::RelativeUrlWithoutBase))
}
