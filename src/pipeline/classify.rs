//! URL classification: recognise a GitHub Markdown reference and produce the
//! raw-content URL that serves the file verbatim.
//!
//! Two shapes are accepted:
//!
//! ```text
//! https://raw.githubusercontent.com/<owner>/<repo>/<ref>/<path>.md   (kept as-is)
//! https://github.com/<owner>/<repo>/blob/<ref>/<path>.md             (rewritten)
//! ```
//!
//! Host matching is exact: the authority must be typed exactly as
//! `github.com` or `raw.githubusercontent.com`. The URL parser lowercases
//! hosts and drops default ports, so the comparison runs on the authority
//! text taken from the input string rather than on the parsed host.

use crate::error::Md2PdfError;
use url::Url;

/// Host serving file contents verbatim.
pub const RAW_HOST: &str = "raw.githubusercontent.com";

/// Host serving the rendered repository web UI.
pub const GITHUB_HOST: &str = "github.com";

/// Extension a Markdown reference must end with.
pub const MARKDOWN_EXTENSION: &str = ".md";

/// Outcome of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Already a raw-content URL; returned unchanged.
    Raw(String),
    /// A `blob` URL rewritten to the raw-content host.
    Rewritten(String),
    /// Not a GitHub Markdown reference.
    Invalid,
}

impl Classification {
    pub fn is_valid(&self) -> bool {
        !matches!(self, Classification::Invalid)
    }

    /// The URL to download, if the input was valid.
    pub fn canonical_url(&self) -> Option<&str> {
        match self {
            Classification::Raw(u) | Classification::Rewritten(u) => Some(u),
            Classification::Invalid => None,
        }
    }
}

/// Classify `url` as a raw GitHub Markdown URL, a rewritable `blob` URL, or
/// neither.
pub fn classify(url: &str) -> Classification {
    let Ok(parsed) = Url::parse(url) else {
        return Classification::Invalid;
    };
    let Some(authority) = authority(url) else {
        return Classification::Invalid;
    };

    if authority == RAW_HOST && parsed.path().ends_with(MARKDOWN_EXTENSION) {
        return Classification::Raw(url.to_string());
    }

    if authority == GITHUB_HOST {
        let segments: Vec<&str> = match parsed.path_segments() {
            Some(s) => s.collect(),
            None => return Classification::Invalid,
        };
        // owner / repo / "blob" / ref / path...
        if segments.len() >= 5
            && segments[2] == "blob"
            && segments
                .last()
                .is_some_and(|last| last.ends_with(MARKDOWN_EXTENSION))
        {
            let raw = format!(
                "https://{RAW_HOST}/{}/{}/{}",
                segments[0],
                segments[1],
                segments[3..].join("/")
            );
            return Classification::Rewritten(raw);
        }
    }

    Classification::Invalid
}

/// Classify `url` and return the canonical URL, or [`Md2PdfError::InvalidUrl`].
pub fn resolve_source(url: &str) -> Result<String, Md2PdfError> {
    classify(url)
        .canonical_url()
        .map(str::to_string)
        .ok_or_else(|| Md2PdfError::InvalidUrl {
            url: url.to_string(),
        })
}

/// The authority (`host[:port]`, possibly with userinfo) exactly as typed.
fn authority(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    Some(&rest[..end])
}
