//! End-to-end tests for edgequake-md2pdf.
//!
//! Most tests run the whole pipeline against a local `tiny_http` server
//! standing in for raw.githubusercontent.com, with a stub PDF engine, so
//! they need neither network nor an installed engine.
//!
//! The tests at the bottom hit GitHub and run a real engine. They are gated
//! behind the `E2E_ENABLED` environment variable:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use async_trait::async_trait;
use edgequake_md2pdf::{
    convert, ContentFetcher, ConversionConfig, ConversionProgressCallback, HttpFetcher,
    Md2PdfError, PdfEngine, Previewer, Stage,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use tiny_http::{Response, Server, StatusCode};

// ── Test helpers ─────────────────────────────────────────────────────────────

const REPORT_MD: &str = "# Home Price Report\n\n\
Prices rose in most regions.\n\n\
| Region | Median |\n\
|--------|--------|\n\
| West   | 610k   |\n\
| South  | 340k   |\n\n\
```python\nprint(\"hello\")\n```\n\n\
> Source: survey data\n";

/// Serve `REPORT_MD` at `/owner/repo/main/docs/report.md`; 404 elsewhere.
fn serve_repo() -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    thread::spawn(move || {
        for request in server.incoming_requests() {
            let response = if request.url() == "/owner/repo/main/docs/report.md" {
                Response::from_string(REPORT_MD).with_status_code(StatusCode(200))
            } else {
                Response::from_string("404: Not Found").with_status_code(StatusCode(404))
            };
            let _ = request.respond(response);
        }
    });
    format!("http://{addr}")
}

/// Real HTTP fetcher pointed at a local server instead of the raw host.
struct MirrorFetcher {
    base: String,
    inner: HttpFetcher,
    calls: AtomicUsize,
}

impl MirrorFetcher {
    fn new(base: String) -> Arc<Self> {
        Arc::new(Self {
            base,
            inner: HttpFetcher::new(5).unwrap(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ContentFetcher for MirrorFetcher {
    async fn fetch(&self, url: &str) -> Result<String, Md2PdfError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let local = url.replacen("https://raw.githubusercontent.com", &self.base, 1);
        self.inner.fetch(&local).await
    }
}

/// Writes a small fake PDF and remembers the scratch HTML it was given.
#[derive(Default)]
struct StubEngine {
    fail: bool,
    runs: Mutex<Vec<(PathBuf, String)>>,
}

#[async_trait]
impl PdfEngine for StubEngine {
    fn name(&self) -> &str {
        "stub"
    }

    async fn render(&self, html_path: &Path, output_path: &Path) -> Result<(), Md2PdfError> {
        let html = std::fs::read_to_string(html_path).unwrap();
        self.runs
            .lock()
            .unwrap()
            .push((html_path.to_path_buf(), html.clone()));
        if self.fail {
            return Err(Md2PdfError::ExportFailed {
                engine: "stub".into(),
                detail: "simulated engine crash".into(),
            });
        }
        let pdf = format!("%PDF-1.7\n% {} bytes of html\n%%EOF\n", html.len());
        std::fs::write(output_path, pdf).unwrap();
        Ok(())
    }
}

#[derive(Default)]
struct RecordingPreviewer {
    fail: bool,
    shown: Mutex<Vec<PathBuf>>,
}

impl Previewer for RecordingPreviewer {
    fn show(&self, path: &Path) -> Result<(), Md2PdfError> {
        self.shown.lock().unwrap().push(path.to_path_buf());
        if self.fail {
            return Err(Md2PdfError::PreviewFailed {
                path: path.to_path_buf(),
                reason: "no display".into(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<String>>,
}

impl ConversionProgressCallback for EventLog {
    fn on_stage_start(&self, stage: Stage) {
        self.events.lock().unwrap().push(format!("start:{stage}"));
    }
    fn on_stage_complete(&self, stage: Stage, _elapsed_ms: u64) {
        self.events.lock().unwrap().push(format!("done:{stage}"));
    }
    fn on_stage_error(&self, stage: Stage, _error: &str) {
        self.events.lock().unwrap().push(format!("error:{stage}"));
    }
    fn on_conversion_complete(&self, _output_path: &Path) {
        self.events.lock().unwrap().push("complete".into());
    }
}

fn config_with(
    fetcher: Arc<MirrorFetcher>,
    engine: Arc<StubEngine>,
    previewer: Arc<RecordingPreviewer>,
) -> ConversionConfig {
    ConversionConfig::builder()
        .fetcher(fetcher)
        .engine(engine)
        .previewer(previewer)
        .build()
        .expect("valid config")
}

const BLOB_URL: &str = "https://github.com/owner/repo/blob/main/docs/report.md";

// ── Pipeline tests (local server, stub engine) ───────────────────────────────

#[tokio::test]
async fn blob_url_converts_to_pdf_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.pdf");
    let fetcher = MirrorFetcher::new(serve_repo());
    let engine = Arc::new(StubEngine::default());
    let previewer = Arc::new(RecordingPreviewer::default());
    let config = config_with(fetcher.clone(), engine.clone(), previewer.clone());

    let output = convert(BLOB_URL, Some(&out), &config)
        .await
        .expect("conversion should succeed");

    assert_eq!(output.output_path, out);
    assert_eq!(
        output.canonical_url,
        "https://raw.githubusercontent.com/owner/repo/main/docs/report.md"
    );
    assert!(out.exists());
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
    assert_eq!(output.stats.markdown_bytes, REPORT_MD.len());
    assert!(output.stats.pdf_bytes > 0);

    // The engine saw a complete document with the rendered table and code.
    let runs = engine.runs.lock().unwrap();
    assert_eq!(runs.len(), 1);
    let (scratch, html) = &runs[0];
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<table>"));
    assert!(html.contains("<code class=\"language-python\">"));
    assert!(html.contains("<title>report</title>"));
    assert!(!scratch.exists(), "scratch HTML must not outlive the run");

    assert!(output.previewed);
    assert_eq!(*previewer.shown.lock().unwrap(), vec![out.clone()]);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn not_found_produces_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("missing.pdf");
    let fetcher = MirrorFetcher::new(serve_repo());
    let engine = Arc::new(StubEngine::default());
    let previewer = Arc::new(RecordingPreviewer::default());
    let config = config_with(fetcher, engine.clone(), previewer.clone());

    let err = convert(
        "https://github.com/owner/repo/blob/main/docs/missing.md",
        Some(&out),
        &config,
    )
    .await
    .unwrap_err();

    assert!(
        matches!(err, Md2PdfError::FetchFailed { status: 404, .. }),
        "got: {err:?}"
    );
    assert_eq!(err.stage(), Stage::Fetch);
    assert!(!out.exists(), "no PDF may be created after a failed fetch");
    assert!(engine.runs.lock().unwrap().is_empty());
    assert!(previewer.shown.lock().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_url_fails_before_network() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("x.pdf");
    let fetcher = MirrorFetcher::new(serve_repo());
    let config = config_with(
        fetcher.clone(),
        Arc::new(StubEngine::default()),
        Arc::new(RecordingPreviewer::default()),
    );

    let err = convert("https://gitlab.com/owner/repo/blob/main/a.md", Some(&out), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, Md2PdfError::InvalidUrl { .. }));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    assert!(!out.exists());
}

#[tokio::test]
async fn engine_failure_still_removes_scratch_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.pdf");
    let engine = Arc::new(StubEngine {
        fail: true,
        ..Default::default()
    });
    let config = config_with(
        MirrorFetcher::new(serve_repo()),
        engine.clone(),
        Arc::new(RecordingPreviewer::default()),
    );

    let err = convert(BLOB_URL, Some(&out), &config).await.unwrap_err();

    assert!(matches!(err, Md2PdfError::ExportFailed { .. }));
    let runs = engine.runs.lock().unwrap();
    assert_eq!(runs.len(), 1);
    assert!(!runs[0].0.exists(), "scratch HTML must be deleted on failure");
    assert!(!out.exists());
}

#[tokio::test]
async fn preview_failure_does_not_fail_conversion() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.pdf");
    let previewer = Arc::new(RecordingPreviewer {
        fail: true,
        ..Default::default()
    });
    let config = config_with(
        MirrorFetcher::new(serve_repo()),
        Arc::new(StubEngine::default()),
        previewer.clone(),
    );

    let output = convert(BLOB_URL, Some(&out), &config)
        .await
        .expect("preview failure must not fail the run");

    assert!(!output.previewed);
    assert!(out.exists());
    assert_eq!(previewer.shown.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn preview_disabled_skips_previewer() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.pdf");
    let previewer = Arc::new(RecordingPreviewer::default());
    let config = ConversionConfig::builder()
        .fetcher(MirrorFetcher::new(serve_repo()))
        .engine(Arc::new(StubEngine::default()))
        .previewer(previewer.clone())
        .preview(false)
        .build()
        .unwrap();

    let output = convert(BLOB_URL, Some(&out), &config).await.unwrap();

    assert!(!output.previewed);
    assert!(previewer.shown.lock().unwrap().is_empty());
}

#[tokio::test]
async fn progress_events_follow_stage_order() {
    let dir = tempfile::tempdir().unwrap();
    let log = Arc::new(EventLog::default());
    let config = ConversionConfig::builder()
        .fetcher(MirrorFetcher::new(serve_repo()))
        .engine(Arc::new(StubEngine::default()))
        .previewer(Arc::new(RecordingPreviewer::default()))
        .progress_callback(log.clone())
        .build()
        .unwrap();

    convert(BLOB_URL, Some(&dir.path().join("r.pdf")), &config)
        .await
        .unwrap();

    assert_eq!(
        *log.events.lock().unwrap(),
        vec![
            "start:classify",
            "done:classify",
            "start:fetch",
            "done:fetch",
            "start:render",
            "done:render",
            "start:export",
            "done:export",
            "start:preview",
            "done:preview",
            "complete",
        ]
    );
}

#[tokio::test]
async fn progress_reports_failing_stage() {
    let dir = tempfile::tempdir().unwrap();
    let log = Arc::new(EventLog::default());
    let config = ConversionConfig::builder()
        .fetcher(MirrorFetcher::new(serve_repo()))
        .engine(Arc::new(StubEngine::default()))
        .progress_callback(log.clone())
        .build()
        .unwrap();

    let _ = convert(
        "https://raw.githubusercontent.com/owner/repo/main/gone.md",
        Some(&dir.path().join("gone.pdf")),
        &config,
    )
    .await;

    assert_eq!(
        *log.events.lock().unwrap(),
        vec!["start:classify", "done:classify", "start:fetch", "error:fetch"]
    );
}

#[tokio::test]
async fn repeated_runs_both_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.pdf");
    let config = config_with(
        MirrorFetcher::new(serve_repo()),
        Arc::new(StubEngine::default()),
        Arc::new(RecordingPreviewer::default()),
    );

    for _ in 0..2 {
        let output = convert(BLOB_URL, Some(&out), &config).await.unwrap();
        assert!(std::fs::metadata(&output.output_path).unwrap().len() > 0);
    }
}

// ── Live tests (network + installed engine) ──────────────────────────────────

#[tokio::test]
async fn live_github_readme_with_installed_engine() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("README.pdf");
    let config = ConversionConfig::builder().preview(false).build().unwrap();

    let output = convert(
        "https://github.com/rust-lang/rust/blob/master/README.md",
        Some(&out),
        &config,
    )
    .await
    .expect("live conversion should succeed");

    let bytes = std::fs::read(&output.output_path).unwrap();
    assert!(bytes.starts_with(b"%PDF"), "output is not a PDF");
    println!(
        "[live] {} bytes in {}ms",
        output.stats.pdf_bytes, output.stats.total_duration_ms
    );
}

#[tokio::test]
async fn live_missing_file_is_404() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nope.pdf");
    let config = ConversionConfig::builder().preview(false).build().unwrap();

    let err = convert(
        "https://github.com/rust-lang/rust/blob/master/definitely-not-here.md",
        Some(&out),
        &config,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Md2PdfError::FetchFailed { status: 404, .. }));
    assert!(!out.exists());
}
