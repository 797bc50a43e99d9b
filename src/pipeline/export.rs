//! PDF export: materialise the HTML as a scratch file and hand it to the
//! engine.
//!
//! Every engine wants a file path, not a string. The HTML therefore lives
//! in a [`NamedTempFile`] for exactly as long as the engine runs: the handle
//! is owned by [`export_pdf`], so the file is unlinked when the function
//! returns, whether the engine succeeded, failed or timed out. Each call gets
//! its own uniquely named file, so concurrent exports never collide.
//!
//! The engine never writes to the output path directly. It renders into a
//! staging file next to the output, which is renamed over `output_path` only
//! once the engine has succeeded and the file is non-empty. A failed or
//! silent engine run therefore leaves an earlier PDF at `output_path`
//! untouched and never leaves a partial one behind.

use crate::error::Md2PdfError;
use crate::pipeline::engine::PdfEngine;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Render `html` to a PDF at `output_path` using `engine`.
///
/// Returns the size of the written PDF in bytes.
pub async fn export_pdf(
    html: &str,
    output_path: &Path,
    engine: &dyn PdfEngine,
) -> Result<u64, Md2PdfError> {
    let parent = match output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Md2PdfError::OutputWriteFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            parent
        }
        None => Path::new("."),
    };

    let scratch = write_scratch_html(html)?;
    let staged = stage_pdf(parent)?;
    debug!(
        "Scratch HTML at {}, staging PDF at {}",
        scratch.path().display(),
        staged.path().display()
    );

    // `scratch` and `staged` are dropped (and deleted) on every early return.
    engine.render(scratch.path(), staged.path()).await?;

    let size = tokio::fs::metadata(staged.path())
        .await
        .map(|m| m.len())
        .unwrap_or(0);
    if size == 0 {
        return Err(Md2PdfError::ExportFailed {
            engine: engine.name().to_string(),
            detail: format!("no PDF was written for {}", output_path.display()),
        });
    }

    staged
        .persist(output_path)
        .map_err(|e| Md2PdfError::OutputWriteFailed {
            path: output_path.to_path_buf(),
            source: e.error,
        })?;

    info!("PDF created successfully: {} ({} bytes)", output_path.display(), size);
    Ok(size)
}

/// Empty staging file for the engine's output, in the output directory so
/// the final rename stays on one filesystem.
fn stage_pdf(dir: &Path) -> Result<NamedTempFile, Md2PdfError> {
    tempfile::Builder::new()
        .prefix(".md2pdf-")
        .suffix(".pdf")
        .tempfile_in(dir)
        .map_err(|e| Md2PdfError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })
}

fn write_scratch_html(html: &str) -> Result<NamedTempFile, Md2PdfError> {
    let mut file = tempfile::Builder::new()
        .prefix("md2pdf-")
        .suffix(".html")
        .tempfile()
        .map_err(|e| Md2PdfError::OutputWriteFailed {
            path: std::env::temp_dir(),
            source: e,
        })?;
    if let Err(e) = file.write_all(html.as_bytes()).and_then(|()| file.flush()) {
        return Err(Md2PdfError::OutputWriteFailed {
            path: file.path().to_path_buf(),
            source: e,
        });
    }
    Ok(file)
}
