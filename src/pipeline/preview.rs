//! Preview: show the finished PDF to whoever asked for it.
//!
//! Best effort only. The PDF already exists when this runs, so a missing
//! viewer or a headless session must never turn a successful conversion into
//! a failed one; the orchestrator logs the error and moves on.

use crate::error::Md2PdfError;
use std::path::Path;
use tracing::debug;

/// Presents a file to a human operator.
pub trait Previewer: Send + Sync {
    fn show(&self, path: &Path) -> Result<(), Md2PdfError>;
}

/// Opens the file with the operating system's default viewer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPreviewer;

impl Previewer for SystemPreviewer {
    fn show(&self, path: &Path) -> Result<(), Md2PdfError> {
        debug!("Opening {} with the system viewer", path.display());
        open::that_detached(path).map_err(|e| Md2PdfError::PreviewFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
