//! HTML→PDF engines.
//!
//! PDF layout is not done in-process: an external program that already
//! implements CSS paged media does it. [`CommandEngine`] locates one of
//! WeasyPrint, wkhtmltopdf or headless Chromium on `PATH` and runs it as a
//! child process against an HTML file on disk.

use crate::config::EngineKind;
use crate::error::Md2PdfError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};
use url::Url;

/// Renders an HTML file on disk into a PDF file.
#[async_trait]
pub trait PdfEngine: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Read `html_path`, write a PDF to `output_path`.
    async fn render(&self, html_path: &Path, output_path: &Path) -> Result<(), Md2PdfError>;
}

/// An external PDF program run as a child process.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    kind: EngineKind,
    program: PathBuf,
    timeout_secs: u64,
}

impl CommandEngine {
    /// Locate the binary for `kind` on `PATH`.
    ///
    /// [`EngineKind::Auto`] tries [`EngineKind::PREFERENCE`] in order and
    /// takes the first one installed.
    pub fn discover(kind: EngineKind, timeout_secs: u64) -> Result<Self, Md2PdfError> {
        let candidates: &[EngineKind] = if kind == EngineKind::Auto {
            &EngineKind::PREFERENCE
        } else {
            std::slice::from_ref(&kind)
        };

        for &candidate in candidates {
            for bin in candidate.binaries() {
                if let Ok(program) = which::which(bin) {
                    info!("Using PDF engine {} at {}", candidate, program.display());
                    return Ok(Self {
                        kind: candidate,
                        program,
                        timeout_secs,
                    });
                }
            }
        }

        Err(Md2PdfError::EngineNotFound {
            engine: kind.to_string(),
            hint: install_hint(kind),
        })
    }

    /// Use an explicit binary for `kind`, skipping `PATH` discovery.
    pub fn with_program(
        kind: EngineKind,
        program: impl Into<PathBuf>,
        timeout_secs: u64,
    ) -> Result<Self, Md2PdfError> {
        if kind == EngineKind::Auto {
            return Err(Md2PdfError::InvalidConfig(
                "an explicit engine binary needs a concrete engine kind".into(),
            ));
        }
        let program = program.into();
        if !program.exists() {
            return Err(Md2PdfError::EngineNotFound {
                engine: kind.to_string(),
                hint: format!("No such file: {}", program.display()),
            });
        }
        Ok(Self {
            kind,
            program,
            timeout_secs,
        })
    }

    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl PdfEngine for CommandEngine {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    async fn render(&self, html_path: &Path, output_path: &Path) -> Result<(), Md2PdfError> {
        let args = build_args(self.kind, html_path, output_path)?;
        debug!("Running {} {:?}", self.program.display(), args);

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Md2PdfError::ExportFailed {
                engine: self.name().to_string(),
                detail: format!("could not start {}: {e}", self.program.display()),
            })?;

        let output = tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| Md2PdfError::ExportTimeout {
            engine: self.name().to_string(),
            secs: self.timeout_secs,
        })?
        .map_err(|e| Md2PdfError::ExportFailed {
            engine: self.name().to_string(),
            detail: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let mut detail = format!("{}: {}", output.status, stderr_tail(&stderr));
            if self.kind == EngineKind::Chromium && stderr.contains("--no-sandbox") {
                detail.push('\n');
                detail.push_str(SANDBOX_HINT);
            }
            return Err(Md2PdfError::ExportFailed {
                engine: self.name().to_string(),
                detail,
            });
        }

        Ok(())
    }
}

/// Chromium refuses to run as root unless its sandbox is disabled.
const SANDBOX_HINT: &str = "Chromium will not start as root without --no-sandbox; run md2pdf \
as a regular user, or point --engine-path at a wrapper script that adds --no-sandbox.";

/// Command-line arguments for `kind` converting `input` into `output`.
///
/// Chromium takes its input as a `file://` URL, so `input` must be absolute.
pub fn build_args(
    kind: EngineKind,
    input: &Path,
    output: &Path,
) -> Result<Vec<OsString>, Md2PdfError> {
    let args = match kind {
        // Auto is resolved to a concrete kind before a CommandEngine exists.
        EngineKind::Auto | EngineKind::WeasyPrint => {
            vec![input.as_os_str().to_owned(), output.as_os_str().to_owned()]
        }
        EngineKind::Wkhtmltopdf => vec![
            "--quiet".into(),
            "--enable-local-file-access".into(),
            input.as_os_str().to_owned(),
            output.as_os_str().to_owned(),
        ],
        EngineKind::Chromium => {
            let mut print_to = OsString::from("--print-to-pdf=");
            print_to.push(output.as_os_str());
            let file_url = Url::from_file_path(input).map_err(|()| Md2PdfError::ExportFailed {
                engine: kind.to_string(),
                detail: format!("cannot form a file URL from {}", input.display()),
            })?;
            vec![
                "--headless".into(),
                "--disable-gpu".into(),
                "--no-pdf-header-footer".into(),
                print_to,
                OsString::from(file_url.as_str()),
            ]
        }
    };
    Ok(args)
}

fn install_hint(kind: EngineKind) -> String {
    match kind {
        EngineKind::Auto => "Install one of: weasyprint (pip install weasyprint), \
wkhtmltopdf, or Chromium/Google Chrome, or pass --engine-path."
            .to_string(),
        EngineKind::WeasyPrint => "Install it with: pip install weasyprint".to_string(),
        EngineKind::Wkhtmltopdf => {
            "Install wkhtmltopdf from your package manager or https://wkhtmltopdf.org".to_string()
        }
        EngineKind::Chromium => format!(
            "Install Chromium or Google Chrome, or pass --engine-path.\n{SANDBOX_HINT}"
        ),
    }
}

/// Last few non-empty stderr lines, enough to explain a failure.
fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(5);
    let tail = lines[start..].join(" | ");
    if tail.is_empty() {
        "no error output".to_string()
    } else {
        tail
    }
}
