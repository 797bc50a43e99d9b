//! Progress-callback trait for per-stage conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to be told
//! when each pipeline stage starts, finishes or fails. The CLI uses this to
//! drive its spinner; a host application can forward the same events to a
//! log, a channel or a UI without the library knowing about any of them.
//!
//! # Example
//!
//! ```rust
//! use edgequake_md2pdf::{ConversionConfig, ConversionProgressCallback, Stage};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ConversionProgressCallback for Printer {
//!     fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
//!         eprintln!("{stage} done in {elapsed_ms}ms");
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// One step of the conversion pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Recognise the GitHub URL and derive the raw-content URL.
    Classify,
    /// Download the Markdown text.
    Fetch,
    /// Markdown → styled HTML.
    Render,
    /// HTML → PDF via the external engine.
    Export,
    /// Show the produced PDF.
    Preview,
}

impl Stage {
    /// Label used in terminal output.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Classify => "Classifying",
            Stage::Fetch => "Downloading",
            Stage::Render => "Rendering",
            Stage::Export => "Exporting",
            Stage::Preview => "Previewing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Classify => "classify",
            Stage::Fetch => "fetch",
            Stage::Render => "render",
            Stage::Export => "export",
            Stage::Preview => "preview",
        };
        f.write_str(name)
    }
}

/// Called by the conversion pipeline as it moves through each [`Stage`].
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync` because the
/// config holding them is shared with async tasks.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called when a stage begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage finishes successfully.
    ///
    /// # Arguments
    /// * `stage`     : the stage that finished
    /// * `elapsed_ms`: wall-clock duration of the stage
    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        let _ = (stage, elapsed_ms);
    }

    /// Called when a stage fails.
    ///
    /// For every stage except [`Stage::Preview`] this is the last event of
    /// the run; the error is then returned from `convert`.
    fn on_stage_error(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }

    /// Called once after the PDF has been written (and preview attempted).
    fn on_conversion_complete(&self, output_path: &Path) {
        let _ = output_path;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ConversionProgressCallback for Recorder {
        fn on_stage_start(&self, stage: Stage) {
            self.events.lock().unwrap().push(format!("start:{stage}"));
        }
        fn on_stage_error(&self, stage: Stage, error: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("error:{stage}:{error}"));
        }
    }

    #[test]
    fn default_methods_are_noops() {
        let cb = NoopProgressCallback;
        cb.on_stage_start(Stage::Fetch);
        cb.on_stage_complete(Stage::Fetch, 12);
        cb.on_stage_error(Stage::Export, "boom");
        cb.on_conversion_complete(Path::new("out.pdf"));
    }

    #[test]
    fn overridden_methods_receive_events() {
        let rec = Recorder::default();
        rec.on_stage_start(Stage::Render);
        rec.on_stage_complete(Stage::Render, 3); // default no-op
        rec.on_stage_error(Stage::Export, "engine crashed");
        let events = rec.events.lock().unwrap();
        assert_eq!(
            *events,
            vec!["start:render", "error:export:engine crashed"]
        );
    }

    #[test]
    fn stage_serialises_lowercase() {
        let json = serde_json::to_string(&Stage::Export).unwrap();
        assert_eq!(json, "\"export\"");
        assert_eq!(Stage::Fetch.label(), "Downloading");
    }
}
